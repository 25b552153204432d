//! From raw bytes to a typed request.
//!
//! Decoding happens in three stages, and each stage has its own error code:
//!
//! ```text
//! bytes ──decode──→ RpcRequest ──method──→ Method ──params──→ Request
//!          │                        │                  │
//!     ParseError            MethodNotFound       InvalidParams
//! ```
//!
//! Whatever fails, the caller gets back the request id (when one could be
//! recovered) so the error response still correlates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tileforge_engine::Direction;

use crate::{Codec, RequestId, RpcError, RpcRequest, RpcResponse};

/// The closed set of methods a client can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `"newGame"` — start over, keeping the best score.
    NewGame,
    /// `"move"` — slide the tiles in `params.direction`.
    Move,
}

impl Method {
    pub const ALL: [Method; 2] = [Method::NewGame, Method::Move];

    /// The method name as it appears on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::NewGame => "newGame",
            Self::Move => "move",
        }
    }
}

impl FromStr for Method {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newGame" => Ok(Self::NewGame),
            "move" => Ok(Self::Move),
            _ => Err(RpcError::method_not_found()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `params` of a `move` request.
///
/// `direction` is kept as a string and parsed afterwards, so a missing
/// direction reads as `""` and is reported like any other unknown one.
/// Only params that are not an object at all are "Invalid params".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveParams {
    #[serde(default)]
    pub direction: String,
}

/// A validated request, ready to run against a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    NewGame,
    Move { direction: Direction },
}

impl Request {
    pub fn method(&self) -> Method {
        match self {
            Self::NewGame => Method::NewGame,
            Self::Move { .. } => Method::Move,
        }
    }

    /// Validates a raw request's method and params.
    ///
    /// # Errors
    /// - `MethodNotFound` for an unknown method name
    /// - `InvalidParams` when `move` has no usable `direction`
    pub fn from_raw(raw: RpcRequest) -> Result<Self, RpcError> {
        match raw.method.parse::<Method>()? {
            Method::NewGame => Ok(Self::NewGame),
            Method::Move => {
                let params: MoveParams = serde_json::from_value(raw.params)
                    .map_err(|_| RpcError::invalid_params("Invalid params"))?;
                let direction = params
                    .direction
                    .parse::<Direction>()
                    .map_err(|_| RpcError::invalid_params("Invalid direction"))?;
                Ok(Self::Move { direction })
            }
        }
    }
}

/// A request that passed every decoding stage, with its correlation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub id: RequestId,
    pub request: Request,
}

/// A request that failed to decode, with the id to answer it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub id: RequestId,
    pub error: RpcError,
}

impl<T> From<Rejection> for RpcResponse<T> {
    fn from(rejection: Rejection) -> Self {
        RpcResponse::failure(rejection.id, rejection.error)
    }
}

/// Only the `id` of a request. Used to salvage a correlation id from a
/// message that is valid JSON but not a valid request.
#[derive(Deserialize)]
struct IdOnly {
    #[serde(default)]
    id: RequestId,
}

impl Call {
    /// Decodes and validates one inbound message.
    ///
    /// # Errors
    /// Returns a [`Rejection`] carrying the error to send back. If the
    /// bytes are not a request at all, its id is the request's own `id`
    /// when the message is an object with an integer `id`, and `0`
    /// otherwise.
    pub fn decode<C: Codec>(codec: &C, data: &[u8]) -> Result<Self, Rejection> {
        let raw: RpcRequest = match codec.decode(data) {
            Ok(raw) => raw,
            Err(_) => {
                let id = codec.decode::<IdOnly>(data).map(|only| only.id).unwrap_or(0);
                return Err(Rejection {
                    id,
                    error: RpcError::parse_error(),
                });
            }
        };

        let id = raw.id;
        match Request::from_raw(raw) {
            Ok(request) => Ok(Self { id, request }),
            Err(error) => Err(Rejection { id, error }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCode, JsonCodec};

    fn decode(text: &str) -> Result<Call, Rejection> {
        Call::decode(&JsonCodec, text.as_bytes())
    }

    fn rejected(text: &str) -> Rejection {
        decode(text).expect_err("should be rejected")
    }

    // =====================================================================
    // Method
    // =====================================================================

    #[test]
    fn test_method_names_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>(), Ok(method));
        }
    }

    #[test]
    fn test_method_is_case_sensitive() {
        assert!("newgame".parse::<Method>().is_err());
        assert!("Move".parse::<Method>().is_err());
    }

    // =====================================================================
    // Call::decode — success
    // =====================================================================

    #[test]
    fn test_decode_new_game_ignores_params() {
        let call = decode(r#"{"method":"newGame","params":{"x":1},"id":4}"#).unwrap();
        assert_eq!(call, Call { id: 4, request: Request::NewGame });
    }

    #[test]
    fn test_decode_move_each_direction() {
        for dir in Direction::ALL {
            let text = format!(r#"{{"method":"move","params":{{"direction":"{dir}"}},"id":9}}"#);
            let call = decode(&text).unwrap();
            assert_eq!(call.request, Request::Move { direction: dir });
            assert_eq!(call.request.method(), Method::Move);
        }
    }

    // =====================================================================
    // Call::decode — rejections
    // =====================================================================

    #[test]
    fn test_decode_garbage_is_parse_error_with_zero_id() {
        let r = rejected("{{{ nope");
        assert_eq!(r.id, 0);
        assert_eq!(r.error.kind(), Some(ErrorCode::ParseError));
    }

    #[test]
    fn test_decode_non_object_is_parse_error_with_zero_id() {
        let r = rejected(r#""just a string""#);
        assert_eq!(r.id, 0);
        assert_eq!(r.error.kind(), Some(ErrorCode::ParseError));
    }

    #[test]
    fn test_decode_bad_shape_keeps_recoverable_id() {
        // Valid JSON, integer id, but `method` has the wrong type.
        let r = rejected(r#"{"method":42,"id":17}"#);
        assert_eq!(r.id, 17);
        assert_eq!(r.error.kind(), Some(ErrorCode::ParseError));
    }

    #[test]
    fn test_decode_unknown_method() {
        let r = rejected(r#"{"method":"undo","params":{},"id":12}"#);
        assert_eq!(r.id, 12);
        assert_eq!(r.error, RpcError::method_not_found());
    }

    #[test]
    fn test_decode_move_without_params() {
        let r = rejected(r#"{"method":"move","id":3}"#);
        assert_eq!(r.id, 3);
        assert_eq!(r.error, RpcError::invalid_params("Invalid params"));
    }

    #[test]
    fn test_decode_move_with_empty_params_is_invalid_direction() {
        let r = rejected(r#"{"method":"move","params":{},"id":4}"#);
        assert_eq!(r.id, 4);
        assert_eq!(r.error, RpcError::invalid_params("Invalid direction"));
    }

    #[test]
    fn test_decode_move_with_non_object_params() {
        let r = rejected(r#"{"method":"move","params":"left","id":5}"#);
        assert_eq!(r.error, RpcError::invalid_params("Invalid params"));
    }

    #[test]
    fn test_decode_move_with_non_string_direction() {
        let r = rejected(r#"{"method":"move","params":{"direction":1},"id":3}"#);
        assert_eq!(r.error.kind(), Some(ErrorCode::InvalidParams));
    }

    #[test]
    fn test_decode_move_with_unknown_direction() {
        let r = rejected(r#"{"method":"move","params":{"direction":"diagonal"},"id":21}"#);
        assert_eq!(r.id, 21);
        assert_eq!(r.error, RpcError::invalid_params("Invalid direction"));
    }

    #[test]
    fn test_rejection_converts_into_failure_response() {
        let resp: RpcResponse = rejected(r#"{"method":"x","id":6}"#).into();
        assert_eq!(resp.id, 6);
        assert!(resp.result.is_none());
        assert_eq!(resp.error, Some(RpcError::method_not_found()));
    }
}
