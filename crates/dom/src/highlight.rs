//! Cell highlighter
//!
//! Scans every table cell of a document and enlarges the font of the ones
//! whose display text contains "free" (case-insensitive, substring match).
//!
//! ```text
//! DomArena ──query──→ CellCollection ──for each cell──→ display text
//!                          (len fixed)                     │ contains "free"?
//!                                                          ↓
//!                                              StyleMap.set(font-size, ..)
//! ```
//!
//! The collection is queried once per run. Styles are overwritten, never
//! appended, so running twice leaves the same result as running once.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::serializer::DomSerializer;
use crate::types::NodeId;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag of the elements the highlighter inspects
pub const CELL_TAG: &str = "td";

/// Lower-case text a cell must contain to be highlighted
pub const NEEDLE: &str = "free";

/// How a matched cell is styled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightPolicy {
    /// `font-size: 15px` on every match
    #[default]
    Fixed,
    /// Font size picked from the total cell count, plus `font-weight: bold`.
    /// 25 cells → 14pt, 16 cells → 20pt, anything else → 25pt.
    ByCount,
}

impl HighlightPolicy {
    pub fn font_size(self, total_cells: usize) -> &'static str {
        match self {
            HighlightPolicy::Fixed => "15px",
            HighlightPolicy::ByCount => match total_cells {
                25 => "14pt",
                16 => "20pt",
                _ => "25pt",
            },
        }
    }

    pub fn font_weight(self) -> Option<&'static str> {
        match self {
            HighlightPolicy::Fixed => None,
            HighlightPolicy::ByCount => Some("bold"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HighlightPolicy::Fixed => "fixed",
            HighlightPolicy::ByCount => "by-count",
        }
    }
}

impl fmt::Display for HighlightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighlightPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "a" => Ok(HighlightPolicy::Fixed),
            "by-count" | "bycount" | "b" => Ok(HighlightPolicy::ByCount),
            other => Err(format!(
                "unknown highlight policy '{other}' (expected 'fixed' or 'by-count')"
            )),
        }
    }
}

/// Case-insensitive substring test against [`NEEDLE`]
pub fn is_match(text: &str) -> bool {
    text.to_lowercase().contains(NEEDLE)
}

/// Cells of one tag, in document order at query time
///
/// Consuming it yields each id once; query again to start over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCollection {
    ids: Vec<NodeId>,
}

impl CellCollection {
    pub fn query(arena: &DomArena, tag: &str) -> Self {
        Self {
            ids: arena.find_by_tag(tag),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl IntoIterator for CellCollection {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

/// Applies a [`HighlightPolicy`] to the cells of a document
#[derive(Debug, Clone, Copy, Default)]
pub struct CellHighlighter {
    policy: HighlightPolicy,
}

impl CellHighlighter {
    pub fn new(policy: HighlightPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> HighlightPolicy {
        self.policy
    }

    /// Style every matching cell of the document in `arena`.
    ///
    /// Fails with [`DomError::NoDocument`] when nothing is loaded.
    pub fn highlight(&self, arena: &mut DomArena) -> Result<()> {
        arena.root_id().ok_or(DomError::NoDocument)?;

        let cells = CellCollection::query(arena, CELL_TAG);
        let total = cells.len();
        let font_size = self.policy.font_size(total);
        let font_weight = self.policy.font_weight();
        let mut matched = 0usize;

        for cell_id in cells {
            let text = utils::display_text(arena, cell_id)?;
            if !is_match(&text) {
                continue;
            }

            if tracing::enabled!(tracing::Level::DEBUG) {
                let xpath = DomSerializer::new().generate_xpath(arena, cell_id)?;
                tracing::debug!(
                    %xpath,
                    text = %utils::cap_text_length(&text, 40),
                    font_size,
                    "highlighting cell"
                );
            }

            let style = &mut arena.get_mut(cell_id)?.style;
            style.set("font-size", font_size);
            if let Some(weight) = font_weight {
                style.set("font-weight", weight);
            }
            matched += 1;
        }

        tracing::info!(policy = %self.policy, total, matched, "highlighted cells");
        Ok(())
    }
}
