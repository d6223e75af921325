//! DOM processing for the cell highlighter
//!
//! Index-based document tree with HTML and DevTools-snapshot loaders, an
//! HTML serializer, and the highlighter that styles table cells mentioning
//! "free".
//!
//! ## Core Design
//!
//! ```text
//! HTML text ─┐
//!            ├→ DomArena (owned) → CellHighlighter → DomSerializer → HTML text
//! CDP JSON ──┘        ↓
//!               NodeId (u32)
//! ```

pub mod arena;
pub mod error;
pub mod highlight;
pub mod html;
pub mod serializer;
pub mod service;
pub mod style;
pub mod types;
pub mod utils;

pub use arena::DomArena;
pub use error::{DomError, Result};
pub use highlight::{CellCollection, CellHighlighter, HighlightPolicy};
pub use serializer::{DomSerializer, SerializerConfig};
pub use service::{DomService, DomServiceConfig};
pub use style::StyleMap;
pub use types::*;
