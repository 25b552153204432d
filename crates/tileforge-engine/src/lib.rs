//! Board engine for Tileforge.
//!
//! This crate is the rules of the game and nothing else: a 4×4 grid of
//! tiles, the score, and the game-over predicate. It never touches the
//! network and never owns a random number generator — callers pass one in.
//!
//! # Key types
//!
//! - [`Board`] — the grid itself, plus the deterministic slide/merge step
//! - [`GameState`] — board + score + best score + game-over flag
//! - [`Direction`] — the four moves a player can make
//! - [`resolve_line`] — the one algorithm every move direction shares
//!
//! # How a move works
//!
//! ```text
//! Direction ──→ extract N lines ──→ resolve_line() ×N ──→ write back
//!                                                            │
//!                       moved? ──→ spawn tile ──→ update best score
//!                                                            │
//!                                         game_over = !can_move()
//! ```
//!
//! Every direction is reduced to "slide left" on a 1-D line, so the four
//! directions cannot disagree about merge rules.

mod board;
mod direction;
mod error;
mod game;
mod line;

pub use board::{Board, Grid};
pub use direction::Direction;
pub use error::EngineError;
pub use game::{GameState, Phase};
pub use line::resolve_line;

/// Side length of the board. The game only supports 4×4.
pub const BOARD_SIZE: usize = 4;

/// Probability that a spawned tile is a 2 (otherwise it is a 4).
pub const SPAWN_TWO_PROBABILITY: f64 = 0.9;
