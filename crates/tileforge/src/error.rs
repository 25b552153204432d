//! Unified error type for the Tileforge server.

use tileforge_protocol::ProtocolError;
use tileforge_session::SessionError;
use tileforge_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` lifts a sub-crate error into this one without ceremony.
#[derive(Debug, thiserror::Error)]
pub enum TileforgeError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (duplicate or missing session).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The server configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
