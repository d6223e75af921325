//! Utility functions for DOM processing

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{NodeId, NodeType, HIDDEN_TEXT_ELEMENTS};

/// Cap text length to keep log lines short
pub fn cap_text_length(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Decode character references: common named ones (markup, Latin-1
/// punctuation and symbols, frequent accented letters) plus `&#NN;` and
/// `&#xHH;`.
///
/// Anything unrecognised is left as written. [`escape_text`] and
/// [`escape_attr`] pass such references through untouched.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = reference_end(&rest[1..]).and_then(|semi| {
            let name = &rest[1..semi + 1];
            decode_reference(name).map(|ch| (ch, semi + 2))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

const MAX_REFERENCE_LEN: usize = 11;

/// Byte offset of the `;` closing a reference body, if close enough
fn reference_end(body: &str) -> Option<usize> {
    body.bytes().take(MAX_REFERENCE_LEN).position(|b| b == b';')
}

fn decode_reference(name: &str) -> Option<char> {
    match name.strip_prefix('#') {
        Some(num) => {
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
        None => named_reference(name),
    }
}

fn named_reference(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "iexcl" => '¡',
        "cent" => '¢',
        "pound" => '£',
        "yen" => '¥',
        "euro" => '€',
        "sect" => '§',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "deg" => '°',
        "plusmn" => '±',
        "times" => '×',
        "divide" => '÷',
        "micro" => 'µ',
        "para" => '¶',
        "middot" => '·',
        "laquo" => '«',
        "raquo" => '»',
        "iquest" => '¿',
        "ndash" => '–',
        "mdash" => '—',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "bull" => '•',
        "hellip" => '…',
        "frac12" => '½',
        "frac14" => '¼',
        "frac34" => '¾',
        "aacute" => 'á',
        "eacute" => 'é',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "agrave" => 'à',
        "egrave" => 'è',
        "ccedil" => 'ç',
        "ntilde" => 'ñ',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "szlig" => 'ß',
        "Eacute" => 'É',
        "Auml" => 'Ä',
        "Ouml" => 'Ö',
        "Uuml" => 'Ü',
        _ => return None,
    };
    Some(ch)
}

/// Length of an undecoded named reference (`&name;`) at the start of `s`.
///
/// Known names never survive decoding, so a known name here came from an
/// escaped `&amp;` and is not opaque.
fn opaque_reference_len(s: &str) -> Option<usize> {
    let body = s.strip_prefix('&')?;
    let semi = reference_end(body)?;
    let name = &body[..semi];
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric());
    (valid && named_reference(name).is_none()).then_some(semi + 2)
}

fn escape_with(s: &str, escape: impl Fn(char) -> Option<&'static str>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices();
    while let Some((i, ch)) = chars.next() {
        if ch == '&' {
            if let Some(len) = opaque_reference_len(&s[i..]) {
                out.push_str(&s[i..i + len]);
                chars.nth(len - 2);
                continue;
            }
        }
        match escape(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Escape text content for HTML output
pub fn escape_text(s: &str) -> String {
    escape_with(s, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\u{a0}' => Some("&nbsp;"),
        _ => None,
    })
}

/// Escape an attribute value for a double-quoted HTML attribute
pub fn escape_attr(s: &str) -> String {
    escape_with(s, |ch| match ch {
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '<' => Some("&lt;"),
        '\u{a0}' => Some("&nbsp;"),
        _ => None,
    })
}

/// Rendered text of a node: descendant text, whitespace-normalized.
///
/// Text under `script`, `style`, `template` and `noscript` is skipped.
pub fn display_text(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut raw = String::new();
    let mut stack = vec![node_id];

    while let Some(id) = stack.pop() {
        let node = arena.get(id)?;
        match node.node_type {
            NodeType::Text | NodeType::CdataSection => raw.push_str(&node.node_value),
            NodeType::Element
                if HIDDEN_TEXT_ELEMENTS
                    .iter()
                    .any(|tag| node.node_name.eq_ignore_ascii_case(tag)) => {}
            NodeType::Element if node.node_name.eq_ignore_ascii_case("br") => raw.push('\n'),
            _ => stack.extend(node.children_ids.iter().rev().copied()),
        }
    }

    Ok(normalize_ws(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DomNode;

    #[test]
    fn test_cap_text_length() {
        assert_eq!(cap_text_length("hello", 10), "hello");
        assert_eq!(cap_text_length("hello world", 5), "hello...");
        assert_eq!(cap_text_length("héllo", 2), "h...");
    }

    #[test]
    fn test_normalize_ws() {
        assert_eq!(normalize_ws("  Free \n\t Shipping  "), "Free Shipping");
        assert_eq!(normalize_ws("   "), "");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;td&gt;"), "<td>");
        assert_eq!(decode_entities("&#70;&#x52;EE"), "FREE");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
        assert_eq!(decode_entities("&copy; 2024 &mdash; &eacute;t&eacute;"), "© 2024 — été");
        assert_eq!(decode_entities("&amp;ééééé"), "&ééééé");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_unknown_reference_passes_through() {
        let decoded = decode_entities("&hearts; &amp;lt; fish &amp; chips &x;");
        assert_eq!(decoded, "&hearts; &lt; fish & chips &x;");
        assert_eq!(escape_text(&decoded), "&hearts; &amp;lt; fish &amp; chips &x;");
        assert_eq!(escape_attr("&zwj;"), "&zwj;");
        assert_eq!(escape_text("&;"), "&amp;;");
    }

    #[test]
    fn test_display_text_skips_scripts() {
        let mut arena = DomArena::new();
        let td = arena.add_node(DomNode::new(0, 0, NodeType::Element, "td"));
        arena.append_child(td, DomNode::text(1, "  Free ")).unwrap();
        let script = arena
            .append_child(td, DomNode::new(2, 2, NodeType::Element, "script"))
            .unwrap();
        arena.append_child(script, DomNode::text(3, "var x;")).unwrap();
        let b = arena
            .append_child(td, DomNode::new(4, 4, NodeType::Element, "b"))
            .unwrap();
        arena.append_child(b, DomNode::text(5, "\n Trial")).unwrap();

        assert_eq!(display_text(&arena, td).unwrap(), "Free Trial");
    }
}
