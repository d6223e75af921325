//! Error types for card generation

use dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CardError>;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("Grid size must be between 3 and 5, got {0}")]
    InvalidGridSize(u8),

    #[error("Minimum value ({min}) must be below maximum value ({max})")]
    MinNotBelowMax { min: i32, max: i32 },

    #[error("Minimum value ({0}) cannot be negative")]
    NegativeMin(i32),

    #[error("Maximum value ({0}) cannot exceed 999")]
    MaxTooLarge(i32),

    #[error("Range {min}..={max} holds fewer than the {needed} distinct values a grid needs")]
    RangeTooSmall { min: i32, max: i32, needed: usize },

    #[error("At least one player is required")]
    NoPlayers,

    #[error("Rendered card has no #{0} container")]
    MissingContainer(String),

    #[error("Document error: {0}")]
    Dom(#[from] DomError),
}
