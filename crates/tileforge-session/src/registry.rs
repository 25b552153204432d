//! The session registry: every live session on the server.
//!
//! Responsible for:
//! - Creating a session (fresh game, own generator) when a connection opens
//! - Looking sessions up by id
//! - Dropping a session, and its game, when the connection closes
//!
//! # Concurrency note
//!
//! `SessionRegistry` is a plain `HashMap` and is NOT thread-safe by itself.
//! The server wraps it in a mutex and only holds that lock for an insert,
//! lookup or remove. Request handling never touches the registry: each
//! connection task keeps its own `Arc` to its session.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tileforge_protocol::{Codec, JsonCodec, SessionId};

use crate::{GameSession, SessionConfig, SessionError};

/// A session as handed out by the registry: shared between the registry
/// and the connection task that drives it.
pub type SharedSession<C = JsonCodec> = Arc<GameSession<StdRng, C>>;

/// Tracks all live sessions.
///
/// ## Lifecycle
///
/// ```text
/// connection opens ──→ create() ──→ [live] ──→ remove() ──→ gone
///                                     │
///                                  get(id)
/// ```
///
/// There is no "disconnected but resumable" state: when a connection
/// closes its game is discarded.
pub struct SessionRegistry<C = JsonCodec> {
    sessions: HashMap<SessionId, SharedSession<C>>,
    config: SessionConfig,
    codec: C,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions speak JSON.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: Codec + Clone> SessionRegistry<C> {
    /// Creates an empty registry whose sessions use `codec`.
    pub fn with_codec(config: SessionConfig, codec: C) -> Self {
        Self {
            sessions: HashMap::new(),
            config,
            codec,
        }
    }

    /// Registers a new session with a freshly dealt game.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyExists`] if `id` is taken.
    pub fn create(
        &mut self,
        id: SessionId,
    ) -> Result<SharedSession<C>, SessionError> {
        if self.sessions.contains_key(&id) {
            return Err(SessionError::AlreadyExists(id));
        }

        let rng = session_rng(&self.config, id);
        let session = Arc::new(GameSession::new(id, rng, self.codec.clone()));
        self.sessions.insert(id, Arc::clone(&session));

        tracing::info!(
            session_id = %id,
            seeded = self.config.seed.is_some(),
            "session created"
        );
        Ok(session)
    }

    /// Removes a session. Its game is dropped once the last `Arc` goes.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no such session exists.
    pub fn remove(
        &mut self,
        id: SessionId,
    ) -> Result<SharedSession<C>, SessionError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        tracing::info!(session_id = %id, "session removed");
        Ok(session)
    }

    /// Looks up a session by id.
    pub fn get(&self, id: &SessionId) -> Option<SharedSession<C>> {
        self.sessions.get(id).cloned()
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Builds the tile generator for one session.
///
/// Each session gets its own generator, seeded once. With a configured
/// base seed the generator depends only on that seed and the session id.
fn session_rng(config: &SessionConfig, id: SessionId) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ id.0),
        None => StdRng::from_os_rng(),
    }
}

// =========================================================================
// Tests
// =========================================================================
