//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Mutex};
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;

use crate::{Connection, ConnectionId, Handshake, Transport, TransportError};

/// Path a client must request to open a game connection, unless
/// overridden with [`WebSocketTransport::with_path`].
pub const DEFAULT_PATH: &str = "/ws";

/// How long a peer gets to send a complete upgrade request, unless
/// overridden with [`WebSocketTransport::with_handshake_timeout`].
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

/// A WebSocket-based [`Transport`] that listens for incoming connections.
///
/// Only upgrade requests for the configured path are accepted; anything
/// else is answered with `404 Not Found` and never becomes a connection.
pub struct WebSocketTransport {
    listener: TcpListener,
    path: Arc<str>,
    handshake_timeout: Duration,
    shutdown: watch::Sender<bool>,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            listener,
            path: Arc::from(DEFAULT_PATH),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            shutdown,
        })
    }

    /// Sets the request path that upgrades are accepted on.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Arc::from(path.into());
        self
    }

    /// Sets how long a peer may take to complete the upgrade.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// The request path upgrades are accepted on.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Pending = PendingWebSocket;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let mut shutdown = self.shutdown.subscribe();
        let (stream, peer) = tokio::select! {
            biased;
            _ = shutdown.wait_for(|&down| down) => {
                return Err(TransportError::Shutdown);
            }
            accepted = self.listener.accept() => {
                accepted.map_err(TransportError::AcceptFailed)?
            }
        };

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %peer, "accepted TCP connection");

        Ok(PendingWebSocket {
            id,
            peer,
            stream,
            path: Arc::clone(&self.path),
            timeout: self.handshake_timeout,
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        // send_replace stores the flag even when no accept is waiting.
        self.shutdown.send_replace(true);
        tracing::info!("WebSocket transport shut down");
        Ok(())
    }
}

/// A TCP connection that has not finished its WebSocket upgrade.
pub struct PendingWebSocket {
    id: ConnectionId,
    peer: SocketAddr,
    stream: TcpStream,
    path: Arc<str>,
    timeout: Duration,
}

impl PendingWebSocket {
    /// The remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    fn id(&self) -> ConnectionId {
        self.id
    }

    /// Reads the upgrade request, checks its path and answers it.
    ///
    /// Fails with [`TransportError::HandshakeTimedOut`] if the peer has
    /// not completed the exchange within the transport's timeout.
    async fn complete(self) -> Result<Self::Connection, Self::Error> {
        let Self {
            id,
            peer,
            stream,
            path,
            timeout,
        } = self;

        let check_path = move |req: &Request, resp: Response| {
            if req.uri().path() == &*path {
                Ok(resp)
            } else {
                let mut rejection: ErrorResponse =
                    ErrorResponse::new(Some("not found".to_string()));
                *rejection.status_mut() = StatusCode::NOT_FOUND;
                Err(rejection)
            }
        };

        let upgrade = tokio_tungstenite::accept_hdr_async(stream, check_path);
        let ws = match tokio::time::timeout(timeout, upgrade).await {
            Ok(Ok(ws)) => ws,
            Ok(Err(WsError::Http(resp))) => {
                tracing::warn!(%id, %peer, status = %resp.status(), "upgrade rejected");
                return Err(TransportError::Rejected(format!(
                    "{peer}: {}",
                    resp.status()
                )));
            }
            Ok(Err(other)) => {
                return Err(TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    other,
                )));
            }
            Err(_) => {
                tracing::debug!(%id, %peer, "handshake timed out");
                return Err(TransportError::HandshakeTimedOut(peer));
            }
        };
        tracing::debug!(%id, %peer, "WebSocket upgrade complete");

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            peer,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// A single WebSocket connection.
///
/// The read and write halves sit behind separate locks, so a task waiting
/// in `recv` never blocks a `send`.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WebSocketConnection {
    /// The remote peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

fn broken_pipe(e: WsError) -> TransportError {
    TransportError::SendFailed(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        e,
    ))
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// Sends UTF-8 payloads as text frames (what a browser's JSON client
    /// expects) and anything else as a binary frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(broken_pipe)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    /// Sends a close frame and flushes it.
    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(broken_pipe)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
