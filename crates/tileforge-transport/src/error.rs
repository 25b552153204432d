use std::net::SocketAddr;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting or upgrading a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The upgrade request was answered with an HTTP error instead of a
    /// WebSocket, e.g. because it asked for the wrong path.
    #[error("upgrade rejected: {0}")]
    Rejected(String),

    /// The peer did not finish the upgrade in time.
    #[error("handshake with {0} timed out")]
    HandshakeTimedOut(SocketAddr),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
