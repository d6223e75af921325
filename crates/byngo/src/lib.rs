//! Byngo - bingo cards with their free space highlighted
//!
//! Grids are generated here; the styling of the free cell is the `dom`
//! crate's cell highlighter run over each rendered card.

pub mod card;
pub mod error;
pub mod grid;

pub use card::{CardDeck, CardOptions};
pub use error::{CardError, Result};
pub use grid::{Grid, GridSize, Square};
