//! Error types for the session layer.

use tileforge_protocol::{ProtocolError, SessionId};

/// Errors that can occur while tracking or driving sessions.
///
/// Bad client input is not one of them: that is answered in-band with an
/// error response and the session carries on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A session with this id is already registered.
    #[error("session {0} already exists")]
    AlreadyExists(SessionId),

    /// No session is registered under this id.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// A response could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
