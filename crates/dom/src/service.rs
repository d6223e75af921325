//! DOM Service - Main entry point for document operations
//!
//! This handles:
//! - Building the arena from HTML text
//! - Building the arena from a DevTools `DOM.getDocument` JSON snapshot
//! - Running the cell highlighter over the loaded document
//! - Writing the document back out as HTML

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::highlight::{CellHighlighter, HighlightPolicy};
use crate::html;
use crate::serializer::{DomSerializer, SerializerConfig};
use crate::style::StyleMap;
use crate::types::*;
use serde_json::Value;

/// Configuration for DOM service
#[derive(Debug, Clone)]
pub struct DomServiceConfig {
    /// Deepest element nesting accepted from either input format
    pub max_depth: usize,
    pub serializer: SerializerConfig,
}

impl Default for DomServiceConfig {
    fn default() -> Self {
        Self {
            max_depth: 512,
            serializer: SerializerConfig::default(),
        }
    }
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    /// Replace the loaded document with one parsed from HTML text
    pub fn parse_html(&mut self, src: &str) -> Result<NodeId> {
        self.arena.clear();
        let root_id = html::parse_into(&mut self.arena, src, self.config.max_depth)?;
        tracing::debug!(nodes = self.arena.len(), "parsed HTML document");
        Ok(root_id)
    }

    /// Parse a `DOM.getDocument` response from its JSON text
    pub fn parse_cdp_json(&mut self, json: &str) -> Result<NodeId> {
        let response: Value = serde_json::from_str(json)?;
        self.parse_cdp_dom_tree(&response)
    }

    /// Parse CDP DOM tree response and build arena
    ///
    /// Input format matches CDP's DOM.getDocument response:
    /// ```json
    /// {
    ///   "root": {
    ///     "nodeId": 1,
    ///     "backendNodeId": 1,
    ///     "nodeType": 9,
    ///     "nodeName": "#document",
    ///     "children": [...]
    ///   }
    /// }
    /// ```
    pub fn parse_cdp_dom_tree(&mut self, cdp_response: &Value) -> Result<NodeId> {
        let root = cdp_response
            .get("root")
            .ok_or_else(|| DomError::Snapshot("Missing 'root' in CDP response".to_string()))?;

        self.arena.clear();
        let root_id = self.parse_node(root, None, 0)?;
        self.arena.set_root(root_id)?;
        tracing::debug!(nodes = self.arena.len(), "loaded DOM snapshot");

        Ok(root_id)
    }

    /// Recursively parse a CDP node
    fn parse_node(
        &mut self,
        cdp_node: &Value,
        parent_id: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId> {
        if depth > self.config.max_depth {
            return Err(DomError::MaxDepthExceeded {
                current: depth,
                max: self.config.max_depth,
            });
        }

        let node_id = cdp_node["nodeId"]
            .as_u64()
            .ok_or_else(|| DomError::Snapshot("Missing nodeId".to_string()))?
            as u32;

        let backend_node_id = cdp_node["backendNodeId"]
            .as_u64()
            .ok_or_else(|| DomError::Snapshot("Missing backendNodeId".to_string()))?
            as u32;

        let node_type_val = cdp_node["nodeType"]
            .as_u64()
            .ok_or_else(|| DomError::Snapshot("Missing nodeType".to_string()))?;

        let node_type = u8::try_from(node_type_val)
            .ok()
            .and_then(NodeType::from_u8)
            .ok_or_else(|| DomError::InvalidNodeType {
                expected: "valid NodeType".to_string(),
                actual: format!("{}", node_type_val),
            })?;

        let node_name = cdp_node["nodeName"].as_str().unwrap_or("");

        let mut node = DomNode::new(node_id, backend_node_id, node_type, node_name);
        node.node_value = cdp_node["nodeValue"].as_str().unwrap_or("").to_string();
        node.parent_id = parent_id;

        // Attributes arrive as a flat [name, value, name, value, ...] array
        if let Some(attrs) = cdp_node["attributes"].as_array() {
            for pair in attrs.chunks_exact(2) {
                if let (Some(key), Some(value)) = (pair[0].as_str(), pair[1].as_str()) {
                    if key.eq_ignore_ascii_case("style") {
                        node.style = StyleMap::parse(value);
                    }
                    node.attributes.push((key.to_string(), value.to_string()));
                }
            }
        }

        // Add node to arena
        let current_node_id = self.arena.add_node(node);

        // Parse children
        if let Some(children) = cdp_node["children"].as_array() {
            let mut child_ids = smallvec::SmallVec::new();

            for child in children {
                let child_id = self.parse_node(child, Some(current_node_id), depth + 1)?;
                child_ids.push(child_id);
            }

            // Update parent's children list
            self.arena.get_mut(current_node_id)?.children_ids = child_ids;
        }

        Ok(current_node_id)
    }

    /// Run the cell highlighter over the loaded document
    pub fn highlight_cells(&mut self, policy: HighlightPolicy) -> Result<()> {
        CellHighlighter::new(policy).highlight(&mut self.arena)
    }

    /// Serialize the loaded document as HTML
    pub fn to_html(&self) -> Result<String> {
        if self.arena.root_id().is_none() {
            return Err(DomError::NoDocument);
        }
        DomSerializer::with_config(self.config.serializer.clone()).serialize(&self.arena)
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}
