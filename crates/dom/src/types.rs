//! Core type definitions for the document tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Keep attributes in source order so serialization is stable

use crate::style::StyleMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any webpage
pub type NodeId = u32;

/// Node type matching DOM specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CdataSection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            5 => Some(NodeType::EntityReference),
            6 => Some(NodeType::Entity),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            12 => Some(NodeType::Notation),
            _ => None,
        }
    }
}

/// Attribute list in source order. Most elements carry fewer than four.
pub type Attributes = SmallVec<[(String, String); 4]>;

/// The main DOM tree node structure
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - Inline style lives beside the attributes, already parsed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub backend_node_id: u32,
    pub node_type: NodeType,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    pub node_name: String,
    pub node_value: String,
    pub attributes: Attributes,

    /// Parsed `style` attribute. The serializer writes it back.
    pub style: StyleMap,
}

impl DomNode {
    /// Create a new node with required fields
    pub fn new(
        node_id: NodeId,
        backend_node_id: u32,
        node_type: NodeType,
        node_name: impl Into<String>,
    ) -> Self {
        Self {
            node_id,
            backend_node_id,
            node_type,
            node_name: node_name.into(),
            node_value: String::new(),
            attributes: SmallVec::new(),
            parent_id: None,
            children_ids: SmallVec::new(),
            style: StyleMap::new(),
        }
    }

    /// Create a text node
    pub fn text(node_id: NodeId, value: impl Into<String>) -> Self {
        let mut node = Self::new(node_id, node_id, NodeType::Text, "#text");
        node.node_value = value.into();
        node
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    /// Check if node is an element
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if node is an element with the given tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name.eq_ignore_ascii_case(tag)
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set attribute value, keeping the original position when it exists.
    ///
    /// Setting `style` also replaces the parsed style map.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name.eq_ignore_ascii_case("style") {
            self.style = StyleMap::parse(&value);
        }
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }
}

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is read verbatim up to the closing tag
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "title", "textarea"];

/// Elements whose text never counts as display text
pub const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Phrasing elements: pretty output never breaks lines around them
pub const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "font",
    "i", "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
    "strong", "sub", "sup", "textarea", "time", "u", "var", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

pub fn is_inline_element(tag: &str) -> bool {
    INLINE_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_lookup_is_case_insensitive() {
        let mut node = DomNode::new(0, 0, NodeType::Element, "td");
        node.set_attr("Class", "cell");
        assert_eq!(node.attr("class"), Some("cell"));
        assert!(node.has_tag("TD"));
    }

    #[test]
    fn test_set_style_attr_updates_style_map() {
        let mut node = DomNode::new(0, 0, NodeType::Element, "td");
        node.set_attr("style", "color: red");
        assert_eq!(node.style.get("color"), Some("red"));

        node.set_attr("style", "font-size: 15px");
        assert_eq!(node.style.get("color"), None);
        assert_eq!(node.attributes.len(), 1);
    }

    #[test]
    fn test_void_and_raw_text_tables() {
        assert!(is_void_element("BR"));
        assert!(!is_void_element("td"));
        assert!(is_raw_text_element("script"));
        assert!(is_inline_element("B"));
        assert!(!is_inline_element("td"));
    }
}
