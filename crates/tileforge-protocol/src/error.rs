//! Error types for the protocol layer.
//!
//! Note what is NOT here: a client sending garbage, an unknown method, or
//! a bad direction. Those are normal traffic and are answered with an
//! [`RpcError`](crate::RpcError) inside a response. `ProtocolError` is for
//! failures on our side of the codec.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// field of the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
