//! Per-connection handler: open a session and answer requests in order.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register a session with a fresh game for the connection
//!   2. Loop: receive a message → session produces the response → send it
//!   3. On close (or any transport error) the session is discarded

use std::sync::Arc;

use tileforge_protocol::SessionId;
use tileforge_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::TileforgeError;

/// Drop guard that removes a session from the registry when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the async lock is taken on a spawned task.
struct SessionGuard {
    session_id: SessionId,
    state: Arc<ServerState>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let session_id = self.session_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut sessions = state.sessions.lock().await;
            let _ = sessions.remove(session_id);
        });
    }
}

/// Handles a single connection from accept to close.
///
/// Requests are answered strictly one after another, so responses go out
/// in request order. A clean close or a receive error ends the session
/// normally. A failed send ends it with an error, and so does a response
/// that cannot be encoded, after closing the connection.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), TileforgeError> {
    let conn_id = conn.id();
    let session_id = SessionId(conn_id.into_inner());
    tracing::debug!(%conn_id, %session_id, peer = %conn.peer_addr(), "handling new connection");

    // Create session and guard together: if creation fails no guard is
    // needed, if it succeeds the guard is immediately active.
    let session = {
        let mut sessions = state.sessions.lock().await;
        sessions.create(session_id)?
    };
    let _guard = SessionGuard {
        session_id,
        state: Arc::clone(&state),
    };

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%session_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%session_id, error = %e, "recv error");
                break;
            }
        };

        let reply = match session.handle(&data).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(%session_id, error = %e, "could not encode response");
                let _ = conn.close().await;
                return Err(e.into());
            }
        };

        if let Err(e) = conn.send(&reply).await {
            tracing::debug!(%session_id, error = %e, "send failed, closing session");
            return Err(e.into());
        }
    }

    // _guard drops here → session removal fires.
    Ok(())
}
