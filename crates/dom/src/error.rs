//! Error types for DOM operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Malformed DOM snapshot: {0}")]
    Snapshot(String),

    #[error("HTML error at byte {offset}: {message}")]
    Html { offset: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No document loaded")]
    NoDocument,

    #[error("Maximum nesting depth exceeded: {current} > {max}")]
    MaxDepthExceeded { current: usize, max: usize },
}

impl DomError {
    pub(crate) fn html(offset: usize, message: impl Into<String>) -> Self {
        DomError::Html {
            offset,
            message: message.into(),
        }
    }
}
