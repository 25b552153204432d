//! Wire protocol for Tileforge.
//!
//! This crate defines the request/response "language" a client uses to
//! drive a game over one connection:
//!
//! - **Types** ([`RpcRequest`], [`RpcResponse`], [`RpcError`],
//!   [`SessionId`]) — the structures that travel on the wire.
//! - **Requests** ([`Method`], [`Request`], [`Call`]) — the closed set of
//!   operations and the validation that turns raw bytes into one of them.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong inside the codec.
//!
//! # Message shapes
//!
//! ```text
//! → {"method": "move", "params": {"direction": "left"}, "id": 7}
//! ← {"result": {"moved": true, "grid": [[..]], ...}, "id": 7}
//! ← {"error": {"code": -32602, "message": "Invalid direction"}, "id": 7}
//! ```
//!
//! A response carries exactly one of `result` / `error`, and always echoes
//! the request's `id`.

mod codec;
mod error;
mod request;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use request::{Call, Method, MoveParams, Rejection, Request};
pub use types::{
    ErrorCode, MoveResult, RequestId, RpcError, RpcRequest, RpcResponse,
    RpcResult, SessionId,
};
