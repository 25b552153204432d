//! `TileforgeServer` builder and accept loop.
//!
//! This is the entry point for running a Tileforge server. It ties the
//! layers together: transport → session (protocol + engine inside).

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tileforge_session::{SessionConfig, SessionRegistry};
use tileforge_transport::{
    Handshake, PendingWebSocket, Transport, TransportError, WebSocketTransport,
    DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_PATH,
};
use tokio::sync::Mutex;

use crate::config::{ServerConfig, DEFAULT_LISTEN};
use crate::handler::handle_connection;
use crate::TileforgeError;

/// Shared server state passed to each connection handler task.
///
/// The registry lock is only held for an insert or a remove, never
/// while a request is being handled.
pub(crate) struct ServerState {
    pub(crate) sessions: Mutex<SessionRegistry>,
}

impl ServerState {
    pub(crate) fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Mutex::new(SessionRegistry::new(config)),
        }
    }
}

/// Builder for configuring and starting a Tileforge server.
///
/// # Example
///
/// ```rust,no_run
/// use tileforge::prelude::*;
///
/// # async fn start() -> Result<(), TileforgeError> {
/// let server = TileforgeServer::builder()
///     .bind("127.0.0.1:8081")
///     .ws_path("/ws")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TileforgeServerBuilder {
    bind_addr: String,
    ws_path: String,
    handshake_timeout: Duration,
    session_config: SessionConfig,
}

impl TileforgeServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_LISTEN.to_string(),
            ws_path: DEFAULT_PATH.to_string(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            session_config: SessionConfig::default(),
        }
    }

    /// Creates a builder from a resolved [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new()
            .bind(&config.listen)
            .ws_path(&config.path)
            .session_config(config.session_config())
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the request path WebSocket upgrades are accepted on.
    pub fn ws_path(mut self, path: &str) -> Self {
        self.ws_path = path.to_string();
        self
    }

    /// Sets how long a client may take to complete the WebSocket upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the listener. The server does not accept anything until
    /// [`TileforgeServer::run`] is called.
    pub async fn build(self) -> Result<TileforgeServer, TileforgeError> {
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_path(self.ws_path)
            .with_handshake_timeout(self.handshake_timeout);

        let state = Arc::new(ServerState::new(self.session_config));

        Ok(TileforgeServer { transport, state })
    }
}

impl Default for TileforgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tileforge server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TileforgeServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TileforgeServer {
    /// Creates a new builder.
    pub fn builder() -> TileforgeServerBuilder {
        TileforgeServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TileforgeError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), TileforgeError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves.
    ///
    /// The loop only takes sockets off the listener. Each one gets its own
    /// task that runs the WebSocket upgrade and then
    /// [`handle_connection`], so a client that never finishes its upgrade
    /// holds up nobody else. A failed accept is logged and the loop keeps
    /// going.
    ///
    /// When `shutdown` resolves the transport stops accepting and this
    /// returns; the listener closes when the server is dropped. Sessions
    /// already running are left to finish on their own.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<(), TileforgeError>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            addr = ?self.transport.local_addr().ok(),
            path = self.transport.path(),
            "Tileforge server running"
        );
        tokio::pin!(shutdown);

        loop {
            let accepted = tokio::select! {
                biased;
                _ = &mut shutdown => None,
                accepted = self.transport.accept() => Some(accepted),
            };

            match accepted {
                Some(Ok(pending)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(serve(pending, state));
                }
                Some(Err(TransportError::Shutdown)) => break,
                Some(Err(e)) => {
                    tracing::error!(error = %e, "accept failed");
                }
                None => {
                    self.transport.shutdown().await?;
                    break;
                }
            }
        }

        tracing::info!("Tileforge server stopped");
        Ok(())
    }
}

/// One connection's task: finish the upgrade, then play.
async fn serve(pending: PendingWebSocket, state: Arc<ServerState>) {
    let conn_id = pending.id();
    let conn = match pending.complete().await {
        Ok(conn) => conn,
        Err(TransportError::Rejected(reason)) => {
            tracing::debug!(%conn_id, %reason, "upgrade rejected");
            return;
        }
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "handshake failed");
            return;
        }
    };

    if let Err(e) = handle_connection(conn, state).await {
        tracing::debug!(%conn_id, error = %e, "connection ended with error");
    }
}
