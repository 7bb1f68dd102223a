//! Teaparty chat server.
//!
//! A multi-room chat server speaking a plain-text, line-oriented protocol
//! over TCP. Clients issue commands (`login`, `say`, `look`, `who`,
//! `logout`); the server routes each command through the room the session is
//! currently in and broadcasts chat lines to everyone in the shared room.
//!
//! # Architecture
//!
//! This crate separates decisions from I/O. The [`ChatDriver`] is the pure
//! core: it processes [`ChatEvent`]s and returns [`ChatAction`]s, holding
//! all shared state (sessions, the chat room, the name registry) with no
//! sockets in sight. The [`Server`] is the tokio runtime around it: it owns
//! the listener, spawns one reader task and one writer task per connection,
//! and executes the driver's actions.
//!
//! All events are serialized through one async mutex around the driver, and
//! actions are executed before the lock is released. Command handling is
//! therefore atomic with respect to every other session: a broadcast is
//! enqueued on all recipients' write queues before any other input is
//! processed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod error;
mod registry;
mod rooms;

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use bytes::BytesMut;
pub use driver::{ChatAction, ChatConfig, ChatDriver, ChatEvent, LogLevel, SessionId};
pub use error::ServerError;
pub use registry::NameRegistry;
pub use rooms::Room;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream, tcp::OwnedWriteHalf},
    sync::{Mutex, Notify, RwLock, mpsc},
};

/// Shared state for all connections.
///
/// Holds the per-session write queues and close notifiers used to execute
/// driver actions.
#[derive(Default)]
struct SharedState {
    /// Session ID → sender side of the session's write queue
    outbound: RwLock<HashMap<SessionId, mpsc::UnboundedSender<String>>>,
    /// Session ID → notifier that tells the session's reader task to stop
    closing: RwLock<HashMap<SessionId, Arc<Notify>>>,
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:5005")
    pub bind_address: String,
    /// Chat configuration (server name, connection limit)
    pub chat: ChatConfig,
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:5005".to_string(), chat: ChatConfig::default() }
    }
}

/// Production teaparty server.
///
/// Wraps [`ChatDriver`] with a TCP listener and the tokio runtime.
pub struct Server {
    /// The action-based chat driver
    driver: ChatDriver,
    /// Bound TCP listener
    listener: TcpListener,
}

impl Server {
    /// Create and bind a new server.
    ///
    /// Binding is the only fatal error path; everything after this point is
    /// contained per connection.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await.map_err(|e| {
            ServerError::Config(format!("failed to bind {}: {e}", config.bind_address))
        })?;

        Ok(Self { driver: ChatDriver::new(config.chat), listener })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server, accepting connections and processing commands.
    ///
    /// Runs until the process is shut down. Accept errors are logged and
    /// the loop keeps listening.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("server listening on {}", self.listener.local_addr()?);

        let driver = Arc::new(Mutex::new(self.driver));
        let shared = Arc::new(SharedState::default());
        let mut next_session_id: SessionId = 1;

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let session_id = next_session_id;
                    next_session_id += 1;
                    tracing::debug!("accepted {peer} as session {session_id}");

                    let driver = Arc::clone(&driver);
                    let shared = Arc::clone(&shared);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, session_id, driver, shared).await
                        {
                            tracing::error!("connection error: {e}");
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("accept error: {e}");
                },
            }
        }
    }
}

/// Handle a single TCP connection.
///
/// Registers the session's write queue and close notifier, announces the
/// connection to the driver, then loops forwarding received chunks until
/// EOF, a read error, or a close requested by the driver. Teardown emits
/// `ConnectionClosed` exactly once; the driver guards against a session
/// that already logged out.
async fn handle_connection(
    stream: TcpStream,
    session_id: SessionId,
    driver: Arc<Mutex<ChatDriver>>,
    shared: Arc<SharedState>,
) -> Result<(), ServerError> {
    let (mut reader, writer) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let closing = Arc::new(Notify::new());

    shared.outbound.write().await.insert(session_id, tx);
    shared.closing.write().await.insert(session_id, Arc::clone(&closing));

    let writer_task = tokio::spawn(write_outbound(session_id, writer, rx));

    {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(ChatEvent::ConnectionAccepted { session_id })?;
        execute_actions(actions, &shared).await;
    }

    let mut buf = BytesMut::with_capacity(1024);
    loop {
        tokio::select! {
            read = reader.read_buf(&mut buf) => match read {
                Ok(0) => break,
                Ok(_) => {
                    let bytes = buf.split().freeze();
                    let mut driver = driver.lock().await;
                    let actions =
                        driver.process_event(ChatEvent::DataReceived { session_id, bytes })?;
                    execute_actions(actions, &shared).await;
                },
                Err(e) => {
                    tracing::debug!("read error on session {session_id}: {e}");
                    break;
                },
            },
            () = closing.notified() => break,
        }
    }

    shared.outbound.write().await.remove(&session_id);
    shared.closing.write().await.remove(&session_id);

    {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(ChatEvent::ConnectionClosed {
            session_id,
            reason: "connection closed".to_string(),
        })?;
        execute_actions(actions, &shared).await;
    }

    // Let queued output drain before the connection task finishes.
    let _ = writer_task.await;

    Ok(())
}

/// Drain a session's write queue to its socket.
///
/// Ends when the queue's sender is dropped (close or teardown), after which
/// the write half is shut down so the peer sees FIN. A write failure ends
/// the task; delivery is best-effort per connection.
async fn write_outbound(
    session_id: SessionId,
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = rx.recv().await {
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            tracing::debug!("write failed on session {session_id}: {e}");
            break;
        }
    }
    let _ = writer.shutdown().await;
}

/// Execute driver actions.
///
/// A missing or closed write queue only affects that recipient; broadcast
/// delivery to the others proceeds.
async fn execute_actions(actions: Vec<ChatAction>, shared: &SharedState) {
    for action in actions {
        match action {
            ChatAction::SendToSession { session_id, line } => {
                let outbound = shared.outbound.read().await;
                match outbound.get(&session_id) {
                    Some(tx) => {
                        if tx.send(line).is_err() {
                            tracing::debug!("write queue for session {session_id} is gone");
                        }
                    },
                    None => {
                        tracing::debug!("send to unknown session {session_id} skipped");
                    },
                }
            },

            ChatAction::Close { session_id, reason } => {
                tracing::info!("closing session {session_id}: {reason}");
                shared.outbound.write().await.remove(&session_id);
                if let Some(notify) = shared.closing.write().await.remove(&session_id) {
                    notify.notify_one();
                }
            },

            ChatAction::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{message}"),
                LogLevel::Info => tracing::info!("{message}"),
                LogLevel::Warn => tracing::warn!("{message}"),
                LogLevel::Error => tracing::error!("{message}"),
            },
        }
    }
}
