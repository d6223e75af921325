//! HTML text → arena
//!
//! A tolerant, single-pass tree builder. It is not a full HTML5 parser: it
//! knows void elements, raw-text elements, comments, doctypes and the implied
//! end tags that matter for tables and lists. Unknown closing tags are
//! ignored, unclosed elements are closed at end of input.
//!
//! Tag and attribute names are matched case-insensitively on ASCII and stored
//! lower-cased.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::style::StyleMap;
use crate::types::{is_raw_text_element, is_void_element, DomNode, NodeId, NodeType};
use crate::utils::decode_entities;

/// Tags implicitly closed by a new start tag, with the ancestors that stop the search.
const IMPLIED_CLOSE: &[(&str, &[&str], &[&str])] = &[
    ("td", &["td", "th"], &["tr", "table"]),
    ("th", &["td", "th"], &["tr", "table"]),
    ("tr", &["tr"], &["table", "thead", "tbody", "tfoot"]),
    ("thead", &["thead", "tbody", "tfoot"], &["table"]),
    ("tbody", &["thead", "tbody", "tfoot"], &["table"]),
    ("tfoot", &["thead", "tbody", "tfoot"], &["table"]),
    ("li", &["li"], &["ul", "ol"]),
    ("p", &["p"], &["div", "td", "th", "li", "body"]),
    ("option", &["option"], &["select"]),
];

/// Parse `src` into `arena`, returning the id of the new `#document` root.
///
/// The arena is not cleared; callers that want a fresh document clear it first.
pub fn parse_into(arena: &mut DomArena, src: &str, max_depth: usize) -> Result<NodeId> {
    let root = new_node(arena, NodeType::Document, "#document");
    let root_id = arena.add_node(root);

    let mut builder = TreeBuilder {
        arena,
        src,
        pos: 0,
        open: vec![root_id],
        max_depth,
    };
    builder.run()?;

    builder.arena.set_root(root_id)?;
    Ok(root_id)
}

fn new_node(arena: &DomArena, node_type: NodeType, name: &str) -> DomNode {
    let id = arena.len() as NodeId;
    DomNode::new(id, id, node_type, name)
}

struct TreeBuilder<'a, 'src> {
    arena: &'a mut DomArena,
    src: &'src str,
    pos: usize,
    /// Stack of open elements, document root at the bottom
    open: Vec<NodeId>,
    max_depth: usize,
}

struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

impl<'a, 'src> TreeBuilder<'a, 'src> {
    fn run(&mut self) -> Result<()> {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];

            if rest.starts_with("<!--") {
                self.comment()?;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.declaration()?;
            } else if rest.starts_with("</") {
                self.end_tag()?;
            } else if starts_tag(rest) {
                self.start_tag()?;
            } else {
                self.text()?;
            }
        }
        Ok(())
    }

    fn current(&self) -> NodeId {
        // The document root is never popped
        self.open.last().copied().unwrap_or(0)
    }

    fn append(&mut self, node: DomNode) -> Result<NodeId> {
        let parent = self.current();
        self.arena.append_child(parent, node)
    }

    fn open_tag_name(&self, depth: usize) -> Option<&str> {
        let id = *self.open.get(depth)?;
        self.arena.get(id).ok()?.tag_name()
    }

    /// Pop open elements through the nearest one named in `targets`,
    /// unless a `boundaries` element is reached first.
    fn close_nearest(&mut self, targets: &[&str], boundaries: &[&str]) {
        for depth in (1..self.open.len()).rev() {
            let Some(name) = self.open_tag_name(depth) else {
                continue;
            };
            if targets.contains(&name) {
                self.open.truncate(depth);
                return;
            }
            if boundaries.contains(&name) {
                return;
            }
        }
    }

    fn text(&mut self) -> Result<()> {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let mut end = start + 1;
        while end < bytes.len() {
            if bytes[end] == b'<' {
                let rest = &self.src[end..];
                if starts_tag(rest) || rest.starts_with("</") || rest.starts_with("<!") {
                    break;
                }
            }
            end += 1;
        }
        self.pos = end;

        let text = decode_entities(&self.src[start..end]);
        // Text directly under the document is inter-tag noise
        if self.current() == self.open[0] && text.trim().is_empty() {
            return Ok(());
        }
        let node = DomNode::text(self.arena.len() as NodeId, text);
        self.append(node)?;
        Ok(())
    }

    fn comment(&mut self) -> Result<()> {
        let body_start = self.pos + 4;
        let end = self.src[body_start..]
            .find("-->")
            .ok_or_else(|| DomError::html(self.pos, "unterminated comment"))?;
        let mut node = new_node(self.arena, NodeType::Comment, "#comment");
        node.node_value = self.src[body_start..body_start + end].to_string();
        self.pos = body_start + end + 3;
        self.append(node)?;
        Ok(())
    }

    fn declaration(&mut self) -> Result<()> {
        let end = self.src[self.pos..]
            .find('>')
            .ok_or_else(|| DomError::html(self.pos, "unterminated declaration"))?;
        let inner = self.src[self.pos + 2..self.pos + end].trim();
        let is_doctype = inner
            .get(..7)
            .is_some_and(|head| head.eq_ignore_ascii_case("doctype"));

        let mut node = if is_doctype {
            let name = inner[7..].trim().to_ascii_lowercase();
            new_node(self.arena, NodeType::DocumentType, &name)
        } else {
            new_node(self.arena, NodeType::Comment, "#comment")
        };
        node.node_value = inner.to_string();
        self.pos += end + 1;
        self.append(node)?;
        Ok(())
    }

    fn end_tag(&mut self) -> Result<()> {
        let start = self.pos;
        let end = self.src[start..]
            .find('>')
            .ok_or_else(|| DomError::html(start, "unterminated end tag"))?;
        let name = self.src[start + 2..start + end]
            .trim()
            .to_ascii_lowercase();
        self.pos = start + end + 1;

        for depth in (1..self.open.len()).rev() {
            if self.open_tag_name(depth) == Some(name.as_str()) {
                self.open.truncate(depth);
                break;
            }
        }
        Ok(())
    }

    fn start_tag(&mut self) -> Result<()> {
        let tag_start = self.pos;
        let tag = self.read_start_tag()?;

        if let Some((_, targets, boundaries)) =
            IMPLIED_CLOSE.iter().find(|(name, _, _)| *name == tag.name)
        {
            self.close_nearest(targets, boundaries);
        }

        let mut node = new_node(self.arena, NodeType::Element, &tag.name);
        for (name, value) in tag.attributes {
            // First occurrence wins
            if node.attr(&name).is_some() {
                continue;
            }
            if name == "style" {
                node.style = StyleMap::parse(&value);
            }
            node.attributes.push((name, value));
        }

        let is_void = is_void_element(&tag.name);
        let is_raw = is_raw_text_element(&tag.name);
        let node_id = self.append(node)?;

        if is_void || tag.self_closing {
            return Ok(());
        }

        if is_raw {
            return self.raw_text(node_id, &tag.name);
        }

        let depth = self.open.len();
        if depth > self.max_depth {
            return Err(DomError::MaxDepthExceeded {
                current: depth,
                max: self.max_depth,
            });
        }
        tracing::trace!(tag = %tag.name, offset = tag_start, depth, "open element");
        self.open.push(node_id);
        Ok(())
    }

    /// Content of `script`/`style`/`title`/`textarea`, up to the matching close tag.
    fn raw_text(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let rest = &self.src[self.pos..];
        let close = format!("</{name}");
        let end = rest
            .to_ascii_lowercase()
            .find(&close)
            .unwrap_or(rest.len());
        let content = &rest[..end];

        if !content.is_empty() {
            // title and textarea are escapable raw text
            let value = if name == "title" || name == "textarea" {
                decode_entities(content)
            } else {
                content.to_string()
            };
            let text = DomNode::text(self.arena.len() as NodeId, value);
            self.arena.append_child(node_id, text)?;
        }

        self.pos += end;
        if self.pos < self.src.len() {
            let tail = &self.src[self.pos..];
            self.pos += tail.find('>').map(|i| i + 1).unwrap_or(tail.len());
        }
        Ok(())
    }

    fn read_start_tag(&mut self) -> Result<StartTag> {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let unterminated = || DomError::html(start, "unterminated start tag");

        let mut i = start + 1;
        while i < bytes.len() && !is_name_end(bytes[i]) {
            i += 1;
        }
        let name = self.src[start + 1..i].to_ascii_lowercase();
        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                None => return Err(unterminated()),
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') => {
                    if bytes.get(i + 1) == Some(&b'>') {
                        self_closing = true;
                        i += 2;
                        break;
                    }
                    i += 1;
                    continue;
                }
                Some(_) => {}
            }

            let name_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let attr_name = self.src[name_start..i].to_ascii_lowercase();

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if bytes.get(i) != Some(&b'=') {
                attributes.push((attr_name, String::new()));
                continue;
            }
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }

            let value = match bytes.get(i) {
                None => return Err(unterminated()),
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = i + 1;
                    let len = self.src[value_start..]
                        .find(quote as char)
                        .ok_or_else(|| DomError::html(start, "unterminated attribute value"))?;
                    i = value_start + len + 1;
                    &self.src[value_start..value_start + len]
                }
                Some(_) => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                    {
                        i += 1;
                    }
                    &self.src[value_start..i]
                }
            };
            attributes.push((attr_name, decode_entities(value)));
        }

        self.pos = i;
        Ok(StartTag {
            name,
            attributes,
            self_closing,
        })
    }
}

fn starts_tag(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn is_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'>' || b == b'/'
}
