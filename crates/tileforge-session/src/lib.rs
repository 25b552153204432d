//! Player sessions for Tileforge.
//!
//! A session is one connection's game: its [`GameState`], its own random
//! number generator, and the lock that keeps requests from interleaving.
//!
//! 1. **Dispatch** — [`GameSession::handle`] takes one inbound message,
//!    runs it against the game, and returns the encoded response.
//! 2. **Tracking** — [`SessionRegistry`] knows which sessions exist, gives
//!    each new one a fresh game and generator, and forgets it on
//!    disconnect.
//!
//! # How it fits in the stack
//!
//! ```text
//! Transport (below)   ← delivers raw bytes per connection
//!     ↕
//! Session (this crate) ← decode → run on GameState → encode
//!     ↕
//! Protocol + Engine   ← wire types, rules of the game
//! ```
//!
//! [`GameState`]: tileforge_engine::GameState

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::{SessionRegistry, SharedSession};
pub use session::{GameSession, SessionConfig};
