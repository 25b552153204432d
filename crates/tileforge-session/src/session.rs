//! A single player's session and its request dispatch.
//!
//! A session is the server's record of one connected player. It holds:
//! - WHO the session is (`SessionId`)
//! - WHAT game they are playing (`GameState`)
//! - WHERE new tiles come from (a generator owned by this session only)

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::Mutex;

use tileforge_engine::GameState;
use tileforge_protocol::{
    Call, Codec, JsonCodec, MoveResult, Request, RpcResponse, RpcResult,
    SessionId,
};

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every session a registry creates.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Base seed for tile spawning.
    ///
    /// `None` (the default) seeds each session from the OS. `Some(seed)`
    /// derives each session's generator from `seed` and its id, so the
    /// same client traffic replays the same games.
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// Everything a request is allowed to touch. Only reachable through the
/// session's lock.
struct Table<R> {
    game: GameState,
    rng: R,
}

/// One connection's game and the handler for its requests.
///
/// All request handling goes through [`handle`](Self::handle), which holds
/// the session's lock for the whole decode → apply → build-response step.
/// Two requests on the same session therefore never interleave: request N
/// has finished its move, its spawn and its game-over check before request
/// N+1 sees the board. The lock is released before the response bytes go
/// back to the transport.
///
/// Sessions share nothing with each other, so different sessions run in
/// parallel freely.
pub struct GameSession<R = StdRng, C = JsonCodec> {
    id: SessionId,
    table: Mutex<Table<R>>,
    codec: C,
}

impl<R, C> GameSession<R, C>
where
    R: Rng + Send,
    C: Codec,
{
    /// Creates a session with a freshly dealt game.
    pub fn new(id: SessionId, mut rng: R, codec: C) -> Self {
        let game = GameState::new(&mut rng);
        Self::with_state(id, game, rng, codec)
    }

    /// Creates a session that resumes from an existing game state.
    pub fn with_state(id: SessionId, game: GameState, rng: R, codec: C) -> Self {
        Self {
            id,
            table: Mutex::new(Table { game, rng }),
            codec,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Handles one inbound message and returns the encoded response.
    ///
    /// Malformed messages, unknown methods and bad parameters all produce
    /// an error *response*, not an `Err`: the session stays usable.
    ///
    /// # Errors
    /// Returns [`SessionError::Protocol`] only if the response itself
    /// cannot be encoded.
    pub async fn handle(&self, data: &[u8]) -> Result<Vec<u8>, SessionError> {
        let response = self.respond(data).await;
        Ok(self.codec.encode(&response)?)
    }

    /// Like [`handle`](Self::handle), but returns the response before
    /// encoding.
    pub async fn respond(&self, data: &[u8]) -> RpcResponse<RpcResult> {
        let mut table = self.table.lock().await;
        let Table { game, rng } = &mut *table;

        let call = match Call::decode(&self.codec, data) {
            Ok(call) => call,
            Err(rejection) => {
                tracing::debug!(
                    session_id = %self.id,
                    id = rejection.id,
                    error = %rejection.error,
                    "rejected request"
                );
                return rejection.into();
            }
        };

        tracing::debug!(
            session_id = %self.id,
            id = call.id,
            method = %call.request.method(),
            "dispatching request"
        );

        let result = match call.request {
            Request::NewGame => {
                game.new_game(rng);
                tracing::info!(
                    session_id = %self.id,
                    best_score = game.best_score(),
                    "new game"
                );
                RpcResult::Game(game.clone())
            }
            Request::Move { direction } => {
                let was_over = game.is_game_over();
                let moved = game.apply_move(direction, rng);
                if !was_over && game.is_game_over() {
                    tracing::info!(
                        session_id = %self.id,
                        score = game.score(),
                        max_tile = game.board().max_tile(),
                        "game over"
                    );
                }
                RpcResult::Move(MoveResult {
                    moved,
                    state: game.clone(),
                })
            }
        };

        RpcResponse::success(call.id, result)
    }

    /// A copy of the current game state.
    pub async fn snapshot(&self) -> GameState {
        self.table.lock().await.game.clone()
    }
}

// =========================================================================
// Tests
// =========================================================================
