//! Core protocol types for Tileforge's wire format.
//!
//! Every type in this module is something that gets serialized, sent over
//! a connection, and read by the other side. Field names follow what the
//! browser client expects (camelCase where the game state is concerned).

use std::fmt;

use serde::{Deserialize, Serialize};
use tileforge_engine::GameState;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque identifier for one player session (one connection, one game).
///
/// Newtype over `u64` so a session id can't be mixed up with a request id
/// or a raw connection counter. Serialized as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Client-chosen correlation id, echoed back in the matching response.
pub type RequestId = i64;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A request exactly as it arrives on the wire, before validation.
///
/// `method` is still a free-form string and `params` is whatever JSON the
/// client sent. [`Call::decode`](crate::Call::decode) turns this into a
/// typed [`Request`](crate::Request).
///
/// Both `params` and `id` are optional on the wire: a missing `params` is
/// `null`, a missing `id` is `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,

    #[serde(default)]
    pub params: serde_json::Value,

    #[serde(default)]
    pub id: RequestId,
}

// ---------------------------------------------------------------------------
// Errors on the wire
// ---------------------------------------------------------------------------

/// The stable error codes a client can branch on.
///
/// Values come from the JSON-RPC reserved range so that generic JSON-RPC
/// tooling recognizes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The message bytes could not be decoded into a request.
    ParseError,
    /// The method is known, but its `params` failed validation.
    InvalidParams,
    /// The method name is not one the server supports.
    MethodNotFound,
}

impl ErrorCode {
    /// The numeric code sent on the wire.
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidParams => -32602,
            Self::MethodNotFound => -32601,
        }
    }

    /// Maps a wire code back to its kind, if it is one of ours.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32602 => Some(Self::InvalidParams),
            -32601 => Some(Self::MethodNotFound),
            _ => None,
        }
    }
}

/// The `error` object of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
        }
    }

    pub fn parse_error() -> Self {
        Self::new(ErrorCode::ParseError, "Parse error")
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    pub fn method_not_found() -> Self {
        Self::new(ErrorCode::MethodNotFound, "Method not found")
    }

    /// The kind of error, or `None` for a code outside our set.
    pub fn kind(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A response to one request.
///
/// Exactly one of `result` and `error` is `Some`. The constructors
/// [`success`](Self::success) and [`failure`](Self::failure) are the only
/// way the server builds one, which is what upholds that rule. The absent
/// field is left out of the JSON entirely rather than sent as `null`.
///
/// `T` is the result payload. The server uses [`RpcResult`]; clients and
/// tests usually decode into the default, `serde_json::Value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse<T = serde_json::Value> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,

    pub id: RequestId,
}

impl<T> RpcResponse<T> {
    pub fn success(id: RequestId, result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: RequestId, error: RpcError) -> Self {
        Self {
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Result payload of a `move` request.
///
/// The game state is flattened in, so the JSON is a single flat object:
/// `{"moved": true, "grid": [..], "score": 4, "bestScore": 4, "gameOver": false}`.
///
/// Decoding builds the state through `GameState`'s own checks, so a
/// decoded result cannot claim a live game on a stuck board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub moved: bool,

    #[serde(flatten)]
    pub state: GameState,
}

/// Every result payload the server can send.
///
/// `#[serde(untagged)]` serializes each variant as its inner value with no
/// wrapper, so a `newGame` result is just the game state object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RpcResult {
    Game(GameState),
    Move(MoveResult),
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tileforge_engine::{Board, Direction};

    use super::*;

    fn sample_state() -> GameState {
        GameState::from_board(
            Board::from_rows([
                [2, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 4],
            ])
            .unwrap(),
            12,
            20,
        )
    }

    // =====================================================================
    // Identity
    // =====================================================================

    #[test]
    fn test_session_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&SessionId(9)).unwrap(), "9");
    }

    #[test]
    fn test_session_id_display() {
        assert_eq!(SessionId(3).to_string(), "S-3");
    }

    // =====================================================================
    // RpcRequest
    // =====================================================================

    #[test]
    fn test_request_params_and_id_default_when_missing() {
        let req: RpcRequest = serde_json::from_str(r#"{"method":"newGame"}"#).unwrap();
        assert_eq!(req.method, "newGame");
        assert!(req.params.is_null());
        assert_eq!(req.id, 0);
    }

    #[test]
    fn test_request_without_method_fails() {
        let result: Result<RpcRequest, _> = serde_json::from_str(r#"{"id":1}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // Error codes
    // =====================================================================

    #[test]
    fn test_error_codes_are_distinct_and_negative() {
        let codes = [
            ErrorCode::ParseError.code(),
            ErrorCode::InvalidParams.code(),
            ErrorCode::MethodNotFound.code(),
        ];
        assert_eq!(codes, [-32700, -32602, -32601]);
    }

    #[test]
    fn test_error_code_round_trips_through_number() {
        for kind in [
            ErrorCode::ParseError,
            ErrorCode::InvalidParams,
            ErrorCode::MethodNotFound,
        ] {
            assert_eq!(ErrorCode::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ErrorCode::from_code(-1), None);
    }

    #[test]
    fn test_rpc_error_constructors() {
        assert_eq!(RpcError::parse_error().message, "Parse error");
        assert_eq!(RpcError::method_not_found().kind(), Some(ErrorCode::MethodNotFound));
        let e = RpcError::invalid_params("Invalid direction");
        assert_eq!(e.code, -32602);
        assert_eq!(e.to_string(), "Invalid direction (-32602)");
    }

    // =====================================================================
    // RpcResponse
    // =====================================================================

    #[test]
    fn test_failure_response_omits_result() {
        let resp: RpcResponse<()> = RpcResponse::failure(5, RpcError::method_not_found());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": {"code": -32601, "message": "Method not found"},
                "id": 5
            })
        );
    }

    #[test]
    fn test_success_response_omits_error() {
        let resp = RpcResponse::success(8, RpcResult::Game(sample_state()));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["id"], 8);
        assert!(json.get("error").is_none());
        assert_eq!(json["result"]["score"], 12);
        assert_eq!(json["result"]["bestScore"], 20);
        assert_eq!(json["result"]["gameOver"], false);
        assert_eq!(json["result"]["grid"][3][3], 4);
    }

    #[test]
    fn test_move_result_is_flat() {
        let mut state = sample_state();
        let moved = state.apply_move(Direction::Left, &mut StdRng::seed_from_u64(1));
        let json = serde_json::to_value(RpcResult::Move(MoveResult { moved, state })).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["bestScore", "gameOver", "grid", "moved", "score"]);
        assert_eq!(json["moved"], true);
    }

    #[test]
    fn test_move_result_decode_derives_game_over_from_grid() {
        let text = r#"{
            "moved": true,
            "grid": [[2,4,2,4],[4,2,4,2],[2,4,2,4],[4,2,4,2]],
            "score": 16,
            "bestScore": 8,
            "gameOver": false
        }"#;
        let result: MoveResult = serde_json::from_str(text).unwrap();
        assert!(result.moved);
        assert!(result.state.is_game_over());
        assert_eq!(result.state.best_score(), 16);
    }

    #[test]
    fn test_response_decodes_into_value() {
        let text = r#"{"result":{"moved":false},"id":2}"#;
        let resp: RpcResponse = serde_json::from_str(text).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.result.unwrap()["moved"], false);
    }
}
