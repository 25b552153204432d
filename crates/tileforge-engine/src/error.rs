//! Error types for the engine.
//!
//! Moves and new games never fail. The only fallible operations are the
//! ones that take data from outside the engine: building a board from raw
//! rows and parsing a direction token.

/// Errors that can occur when constructing engine values from raw input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A cell held a value that is neither 0 nor a power of two.
    #[error("invalid tile {value} at row {row}, col {col}")]
    InvalidTile { row: usize, col: usize, value: u32 },

    /// The string is not one of `up`, `right`, `down`, `left`.
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),
}
