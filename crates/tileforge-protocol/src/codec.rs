//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The session handler only needs something that implements [`Codec`];
//! today that is always [`JsonCodec`], because browser clients speak JSON.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a codec lives inside every session,
/// and sessions are driven from Tokio tasks on any worker thread.
///
/// `decode` requires `DeserializeOwned` (not plain `Deserialize<'de>`) so
/// the decoded value never borrows from the inbound buffer, which the
/// transport is free to drop as soon as `decode` returns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use tileforge_protocol::{Codec, JsonCodec, RpcError, RpcResponse};
///
/// let codec = JsonCodec;
/// let response: RpcResponse<()> = RpcResponse::failure(3, RpcError::method_not_found());
///
/// let bytes = codec.encode(&response).unwrap();
/// let decoded: RpcResponse = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.id, 3);
/// assert!(decoded.result.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
