//! Inline style declarations
//!
//! An element's `style` attribute, parsed into an ordered property map.
//! Order is kept, and a map that was never changed after parsing reports
//! itself clean so the serializer can write the source text back as is.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Ordered `property -> value` mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleMap {
    declarations: SmallVec<[(String, String); 2]>,
    /// Set by any `set`/`remove` that changed a declaration
    #[serde(skip)]
    dirty: bool,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration block such as `color: red; font-size: 12px`.
    ///
    /// A `;` inside parentheses or quotes does not end a declaration, so
    /// `url(data:image/png;base64,..)` stays whole. Property names are
    /// lower-cased. Declarations without a `:` or with an empty name are
    /// dropped.
    pub fn parse(css: &str) -> Self {
        let mut map = Self::new();
        for declaration in split_declarations(css) {
            let Some((name, value)) = declaration.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            map.set(&name.to_ascii_lowercase(), value.trim());
        }
        map.dirty = false;
        map
    }

    /// Whether a declaration was changed since parsing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Set a property. An existing declaration is overwritten in place.
    pub fn set(&mut self, property: &str, value: &str) {
        match self
            .declarations
            .iter_mut()
            .find(|(name, _)| name == property)
        {
            Some((_, existing)) => {
                if existing != value {
                    *existing = value.to_string();
                    self.dirty = true;
                }
            }
            None => {
                self.declarations
                    .push((property.to_string(), value.to_string()));
                self.dirty = true;
            }
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let idx = self
            .declarations
            .iter()
            .position(|(name, _)| name == property)?;
        self.dirty = true;
        Some(self.declarations.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Split on `;` outside of `(..)`, `'..'` and `".."`
fn split_declarations(css: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, ch) in css.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&css[start..]);
    parts
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let style = StyleMap::parse(" Color : red;;font-size:12px ; bogus; :x");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("font-size"), Some("12px"));
    }

    #[test]
    fn test_semicolon_inside_url_and_quotes() {
        let style = StyleMap::parse(
            "background: url(data:image/png;base64,AAAA); content: \"a;b\"; color: red",
        );
        assert_eq!(style.len(), 3);
        assert_eq!(style.get("background"), Some("url(data:image/png;base64,AAAA)"));
        assert_eq!(style.get("content"), Some("\"a;b\""));
        assert_eq!(style.get("color"), Some("red"));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut style = StyleMap::parse("font-size: 15px; color: red");
        assert!(!style.is_dirty());

        style.set("font-size", "15px");
        assert!(!style.is_dirty());

        style.set("font-size", "20pt");
        assert!(style.is_dirty());

        let mut style = StyleMap::parse("color: red");
        style.remove("color");
        assert!(style.is_dirty());
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut style = StyleMap::parse("font-size: 10px; color: blue");
        style.set("font-size", "15px");
        style.set("font-weight", "bold");
        assert_eq!(style.to_string(), "font-size: 15px; color: blue; font-weight: bold");
    }

    #[test]
    fn test_remove() {
        let mut style = StyleMap::parse("a: 1; b: 2");
        assert_eq!(style.remove("a").as_deref(), Some("1"));
        assert_eq!(style.remove("a"), None);
        assert_eq!(style.to_string(), "b: 2");
    }

    #[test]
    fn test_empty_display() {
        assert_eq!(StyleMap::new().to_string(), "");
        assert!(StyleMap::parse("  ").is_empty());
    }
}
