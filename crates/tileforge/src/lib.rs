//! # Tileforge
//!
//! Single-player 2048 served over WebSocket.
//!
//! Every connection gets its own game. The client drives it with two
//! JSON requests, `newGame` and `move`, and each response carries the
//! full game state, so the client never has to track anything itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tileforge::prelude::*;
//!
//! # async fn start() -> Result<(), TileforgeError> {
//! let server = TileforgeServer::builder()
//!     .bind("0.0.0.0:8081")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! ## Crates
//!
//! - `tileforge-engine`: the board, sliding and merging, tile spawning
//! - `tileforge-protocol`: request/response types and the JSON codec
//! - `tileforge-session`: one game per connection, request dispatch
//! - `tileforge-transport`: WebSocket connections

pub mod config;
mod error;
mod handler;
mod server;

pub use error::TileforgeError;
pub use server::{TileforgeServer, TileforgeServerBuilder};

/// Re-exports of the types most users need.
pub mod prelude {
    pub use crate::config::{ConfigError, ServerConfig};
    pub use crate::{TileforgeError, TileforgeServer, TileforgeServerBuilder};

    pub use tileforge_engine::{Board, Direction, GameState, Phase};
    pub use tileforge_protocol::{
        Codec, ErrorCode, JsonCodec, MoveResult, RpcError, RpcRequest,
        RpcResponse, RpcResult, SessionId,
    };
    pub use tileforge_session::{
        GameSession, SessionConfig, SessionError, SessionRegistry,
    };
    pub use tileforge_transport::{
        Connection, ConnectionId, Handshake, PendingWebSocket, Transport,
        TransportError, WebSocketTransport,
    };
}
