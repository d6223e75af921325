//! DOM Serializer - Convert the arena back to HTML
//!
//! This module handles:
//! - Writing elements with their attributes in source order
//! - Regenerating the `style` attribute of elements whose style map changed
//! - Escaping text and attribute values
//! - XPath generation for element identification in logs

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::*;
use crate::utils::{escape_attr, escape_text};

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// Put block-level elements on their own lines, indented by depth.
    /// Elements holding text or inline markup are written on one line with
    /// their content untouched; whitespace-only text between blocks is
    /// dropped.
    pub pretty: bool,
    pub indent_width: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent_width: 2,
        }
    }
}

/// DOM Tree Serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Serialize the whole document
    pub fn serialize(&self, arena: &DomArena) -> Result<String> {
        let mut output = String::with_capacity(4096);

        if let Some(root_id) = arena.root_id() {
            self.serialize_into(arena, root_id, 0, self.config.pretty, &mut output)?;
        }

        Ok(output)
    }

    /// Serialize a single node and its subtree (outer HTML)
    pub fn serialize_node(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::new();
        self.serialize_into(arena, node_id, 0, self.config.pretty, &mut output)?;
        Ok(output)
    }

    fn indent(&self, depth: usize, pretty: bool, output: &mut String) {
        if pretty {
            output.extend(std::iter::repeat(' ').take(depth * self.config.indent_width));
        }
    }

    fn serialize_into(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        depth: usize,
        pretty: bool,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;

        match node.node_type {
            NodeType::Element => {
                let tag = node.node_name.to_ascii_lowercase();

                self.indent(depth, pretty, output);
                output.push('<');
                output.push_str(&tag);
                write_attributes(node, output);
                output.push('>');

                if is_void_element(&tag) {
                    newline(pretty, output);
                    return Ok(());
                }

                if is_raw_text_element(&tag) && tag != "title" && tag != "textarea" {
                    for &child_id in &node.children_ids {
                        output.push_str(&arena.get(child_id)?.node_value);
                    }
                } else if !node.children_ids.is_empty() {
                    let block = pretty && !has_inline_content(arena, node)?;
                    newline(block, output);
                    for &child_id in &node.children_ids {
                        self.serialize_into(arena, child_id, depth + 1, block, output)?;
                    }
                    self.indent(depth, block, output);
                }

                output.push_str("</");
                output.push_str(&tag);
                output.push('>');
                newline(pretty, output);
            }
            NodeType::Text | NodeType::CdataSection => {
                // In block context only whitespace-only text reaches here
                if !pretty {
                    output.push_str(&escape_text(&node.node_value));
                }
            }
            NodeType::Comment => {
                self.indent(depth, pretty, output);
                output.push_str("<!--");
                output.push_str(&node.node_value);
                output.push_str("-->");
                newline(pretty, output);
            }
            NodeType::DocumentType => {
                output.push_str("<!DOCTYPE ");
                output.push_str(if node.node_name.is_empty() {
                    "html"
                } else {
                    node.node_name.as_str()
                });
                output.push('>');
                output.push('\n');
            }
            NodeType::Document | NodeType::DocumentFragment => {
                let block = pretty && !has_inline_content(arena, node)?;
                for &child_id in &node.children_ids {
                    self.serialize_into(arena, child_id, depth, block, output)?;
                }
            }
            _ => {
                // Nothing renderable
            }
        }

        Ok(())
    }

    /// Generate XPath for a node
    pub fn generate_xpath(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut path_parts = Vec::new();
        let mut current_id = Some(node_id);

        while let Some(id) = current_id {
            let node = arena.get(id)?;

            if node.node_type == NodeType::Element {
                // Get position among siblings with same tag name
                let position = match node.parent_id {
                    Some(parent_id) => arena
                        .get(parent_id)?
                        .children_ids
                        .iter()
                        .filter(|&&child_id| {
                            arena.get(child_id).is_ok_and(|child| {
                                child.is_element()
                                    && child.node_name.eq_ignore_ascii_case(&node.node_name)
                            })
                        })
                        .position(|&child_id| child_id == id)
                        .map(|p| p + 1) // XPath is 1-indexed
                        .unwrap_or(1),
                    None => 1,
                };

                path_parts.push(format!("{}[{}]", node.node_name.to_lowercase(), position));
            }

            current_id = node.parent_id;
        }

        path_parts.reverse();
        Ok(format!("/{}", path_parts.join("/")))
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn newline(pretty: bool, output: &mut String) {
    if pretty {
        output.push('\n');
    }
}

/// Text with content, or any inline element, among the direct children
fn has_inline_content(arena: &DomArena, node: &DomNode) -> Result<bool> {
    for &child_id in &node.children_ids {
        let child = arena.get(child_id)?;
        let inline = match child.node_type {
            NodeType::Text | NodeType::CdataSection => !child.node_value.trim().is_empty(),
            NodeType::Element => is_inline_element(&child.node_name),
            _ => false,
        };
        if inline {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Attributes in source order. A changed style map replaces the `style`
/// attribute; an unchanged one leaves the source value as it was.
fn write_attributes(node: &DomNode, output: &mut String) {
    let mut wrote_style = false;

    for (name, value) in &node.attributes {
        if name.eq_ignore_ascii_case("style") {
            wrote_style = true;
            if node.style.is_dirty() {
                write_style(node, output);
                continue;
            }
        }
        output.push(' ');
        output.push_str(name);
        if !value.is_empty() {
            output.push_str("=\"");
            output.push_str(&escape_attr(value));
            output.push('"');
        }
    }

    if !wrote_style {
        write_style(node, output);
    }
}

fn write_style(node: &DomNode, output: &mut String) {
    if node.style.is_empty() {
        return;
    }
    output.push_str(" style=\"");
    output.push_str(&escape_attr(&node.style.to_string()));
    output.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::DomService;

    fn parse(src: &str) -> DomService {
        let mut service = DomService::new();
        service.parse_html(src).unwrap();
        service
    }

    #[test]
    fn test_round_trip_keeps_markup() {
        let src = "<!DOCTYPE html><html><body><!-- x --><table class=\"t\"><tr><td id=\"a\">1 &amp; 2</td><td>x<br>y</td></tr></table></body></html>";
        let service = parse(src);
        let output = DomSerializer::new().serialize(service.arena()).unwrap();

        assert_eq!(
            output,
            "<!DOCTYPE html>\n<html><body><!-- x --><table class=\"t\"><tr><td id=\"a\">1 &amp; 2</td><td>x<br>y</td></tr></table></body></html>"
        );
    }

    #[test]
    fn test_style_written_from_map() {
        let mut service = parse(r#"<td style="color: red" class="c">FREE</td><td>x</td>"#);
        let cells = service.arena().find_by_tag("td");
        service
            .arena_mut()
            .get_mut(cells[0])
            .unwrap()
            .style
            .set("font-size", "15px");
        service
            .arena_mut()
            .get_mut(cells[1])
            .unwrap()
            .style
            .set("font-weight", "bold");

        let output = DomSerializer::new().serialize(service.arena()).unwrap();
        assert_eq!(
            output,
            r#"<td style="color: red; font-size: 15px" class="c">FREE</td><td style="font-weight: bold">x</td>"#
        );
    }

    #[test]
    fn test_script_is_not_escaped() {
        let service = parse("<script>a < b && c</script>");
        let output = DomSerializer::new().serialize(service.arena()).unwrap();
        assert_eq!(output, "<script>a < b && c</script>");
    }

    #[test]
    fn test_pretty_output() {
        let service = parse("<div>\n  <p>hi</p>\n</div>");
        let serializer = DomSerializer::with_config(SerializerConfig {
            pretty: true,
            indent_width: 2,
        });
        let output = serializer.serialize(service.arena()).unwrap();
        assert_eq!(output, "<div>\n  <p>hi</p>\n</div>\n");
    }

    #[test]
    fn test_pretty_keeps_inline_content_together() {
        let service = parse("<table><tr><td><b>Fr</b>ee</td><td> 2 </td></tr></table>");
        let serializer = DomSerializer::with_config(SerializerConfig {
            pretty: true,
            indent_width: 2,
        });
        let output = serializer.serialize(service.arena()).unwrap();
        assert_eq!(
            output,
            "<table>\n  <tr>\n    <td><b>Fr</b>ee</td>\n    <td> 2 </td>\n  </tr>\n</table>\n"
        );
    }

    #[test]
    fn test_untouched_style_written_verbatim() {
        let src = r#"<td style="background: url(data:image/png;base64,AAAA);color:RED">x</td>"#;
        let service = parse(src);
        let output = DomSerializer::new().serialize(service.arena()).unwrap();
        assert_eq!(output, src);
    }

    #[test]
    fn test_generate_xpath() {
        let service = parse("<table><tr><td>a</td><td>b</td></tr></table>");
        let cells = service.arena().find_by_tag("td");
        let xpath = DomSerializer::new()
            .generate_xpath(service.arena(), cells[1])
            .unwrap();
        assert_eq!(xpath, "/table[1]/tr[1]/td[2]");
    }

    #[test]
    fn test_serialize_node_subtree() {
        let service = parse("<div id=\"card\"><h1>T</h1></div><p>other</p>");
        let card = service.arena().find_by_id("card").unwrap();
        let output = DomSerializer::new()
            .serialize_node(service.arena(), card)
            .unwrap();
        assert_eq!(output, "<div id=\"card\"><h1>T</h1></div>");
    }
}
