//! Chat driver.
//!
//! The driver is the single-threaded core of the server: connection
//! lifecycle, line framing, command dispatch, room membership, and the name
//! registry all live here, with no I/O. It follows the action pattern:
//! events from the runtime go in, actions for the runtime to execute come
//! out. Because the runtime serializes all events through one lock, every
//! command handler runs to completion before any other session's input is
//! looked at, which is what makes room transitions and broadcasts atomic.
//!
//! Broadcasts are expanded here into one `SendToSession` per recipient, in
//! room join order. The full delivery set is therefore enqueued before the
//! triggering handler returns, and a write failure on one recipient cannot
//! affect the others.

use std::collections::HashMap;

use bytes::Bytes;
use teaparty_proto::{LineFramer, reply};

use crate::{
    error::ServerError,
    registry::NameRegistry,
    rooms::{self, ChatRoom, Room, SessionFlow},
};

/// Unique identifier for one connection, assigned by the accept loop.
pub type SessionId = u64;

/// Chat server configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Name used in the welcome banner.
    pub server_name: String,
    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { server_name: "TeaParty".to_string(), max_connections: 10_000 }
    }
}

/// Events that the chat driver processes.
///
/// These are produced by the external runtime (tests or production).
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A new connection was accepted.
    ConnectionAccepted {
        /// Unique connection ID assigned by the runtime
        session_id: SessionId,
    },

    /// Raw bytes arrived from a connection.
    DataReceived {
        /// Connection that sent the bytes
        session_id: SessionId,
        /// The received chunk, cut at an arbitrary boundary
        bytes: Bytes,
    },

    /// A connection was closed by the peer or by an I/O error.
    ConnectionClosed {
        /// Connection that was closed
        session_id: SessionId,
        /// Reason for closure
        reason: String,
    },
}

/// Actions that the chat driver produces.
///
/// These are executed by runtime-specific code.
#[derive(Debug, Clone)]
pub enum ChatAction {
    /// Enqueue a line of text on a session's write queue.
    SendToSession {
        /// Target session ID
        session_id: SessionId,
        /// Text to send, terminator included
        line: String,
    },

    /// Close a connection.
    Close {
        /// Session to close
        session_id: SessionId,
        /// Reason for closure
        reason: String,
    },

    /// Log a message.
    Log {
        /// Log level
        level: LogLevel,
        /// Message to log
        message: String,
    },
}

impl ChatAction {
    pub(crate) fn send(session_id: SessionId, line: String) -> Self {
        Self::SendToSession { session_id, line }
    }

    fn log(level: LogLevel, message: String) -> Self {
        Self::Log { level, message }
    }
}

/// Log levels for driver actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational message
    Info,
    /// Warning
    Warn,
    /// Error
    Error,
}

/// Per-session state: display name, current room, framer buffer.
#[derive(Debug)]
pub(crate) struct SessionState {
    /// Display name; unset until login succeeds.
    pub(crate) name: Option<String>,
    /// The room this session is currently in. Always exactly one.
    pub(crate) room: Room,
    /// Accumulated bytes not yet forming a complete line.
    framer: LineFramer,
}

/// Action-based chat driver.
///
/// Owns all cross-session shared state: the session map, the shared chat
/// room, and the name registry.
#[derive(Debug, Default)]
pub struct ChatDriver {
    /// Session state (session_id → SessionState)
    pub(crate) sessions: HashMap<SessionId, SessionState>,
    /// The single shared chat room
    pub(crate) chat_room: ChatRoom,
    /// Server-wide name registry
    pub(crate) registry: NameRegistry,
    /// Configuration
    config: ChatConfig,
}

impl ChatDriver {
    /// Create a new chat driver.
    pub fn new(config: ChatConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            chat_room: ChatRoom::default(),
            registry: NameRegistry::new(),
            config,
        }
    }

    /// Process an event and return the actions to execute.
    ///
    /// This is the main entry point for the driver.
    pub fn process_event(&mut self, event: ChatEvent) -> Result<Vec<ChatAction>, ServerError> {
        match event {
            ChatEvent::ConnectionAccepted { session_id } => {
                self.handle_connection_accepted(session_id)
            },
            ChatEvent::DataReceived { session_id, bytes } => {
                Ok(self.handle_data_received(session_id, &bytes))
            },
            ChatEvent::ConnectionClosed { session_id, reason } => {
                Ok(self.handle_connection_closed(session_id, &reason))
            },
        }
    }

    /// Handle a new connection being accepted.
    ///
    /// The session starts in the login room, which greets its single
    /// entering occupant with the welcome banner.
    fn handle_connection_accepted(
        &mut self,
        session_id: SessionId,
    ) -> Result<Vec<ChatAction>, ServerError> {
        if self.sessions.contains_key(&session_id) {
            return Err(ServerError::SessionAlreadyExists(session_id));
        }

        if self.sessions.len() >= self.config.max_connections {
            return Ok(vec![ChatAction::Close {
                session_id,
                reason: "max connections exceeded".to_string(),
            }]);
        }

        self.sessions.insert(
            session_id,
            SessionState { name: None, room: Room::Login, framer: LineFramer::new() },
        );

        Ok(vec![
            ChatAction::send(session_id, reply::welcome(&self.config.server_name)),
            ChatAction::log(LogLevel::Debug, format!("session {session_id} connected")),
        ])
    }

    /// Handle raw bytes from a connection.
    ///
    /// Feeds the session's framer and dispatches each complete line through
    /// the session's current room. Partial lines never dispatch. When a
    /// handler ends the session, remaining buffered lines are discarded.
    fn handle_data_received(&mut self, session_id: SessionId, bytes: &Bytes) -> Vec<ChatAction> {
        let mut actions = Vec::new();

        let Some(session) = self.sessions.get_mut(&session_id) else {
            // The session raced its own close; nothing to do.
            actions.push(ChatAction::log(
                LogLevel::Debug,
                format!("dropping {} bytes for unknown session {session_id}", bytes.len()),
            ));
            return actions;
        };
        session.framer.extend(bytes);

        loop {
            let line = match self.sessions.get_mut(&session_id) {
                Some(session) => session.framer.next_line(),
                None => None,
            };
            let Some(line) = line else { break };

            match rooms::dispatch(self, session_id, &line, &mut actions) {
                SessionFlow::Continue => {},
                SessionFlow::End => {
                    self.teardown_session(session_id, &mut actions);
                    actions.push(ChatAction::Close {
                        session_id,
                        reason: "logout".to_string(),
                    });
                    break;
                },
            }
        }

        actions
    }

    /// Handle a connection being closed by the peer or by an I/O error.
    ///
    /// A session that already logged out is gone from the map, which is the
    /// guard against running teardown twice.
    fn handle_connection_closed(&mut self, session_id: SessionId, reason: &str) -> Vec<ChatAction> {
        let mut actions = Vec::new();

        if !self.sessions.contains_key(&session_id) {
            return actions;
        }

        self.teardown_session(session_id, &mut actions);
        actions.push(ChatAction::log(
            LogLevel::Info,
            format!("session {session_id} closed: {reason}"),
        ));

        actions
    }

    /// Move a session from the login room into the shared chat room.
    ///
    /// The join broadcast goes to the occupants present before the join, so
    /// the newcomer does not hear its own entrance. The name must have been
    /// checked against the registry by the caller.
    pub(crate) fn enter_chat_room(
        &mut self,
        session_id: SessionId,
        name: &str,
        actions: &mut Vec<ChatAction>,
    ) {
        self.broadcast_chat(&reply::entered(name), actions);
        self.registry.register(name, session_id);
        self.chat_room.join(session_id);

        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.name = Some(name.to_string());
            session.room = Room::Chat;
        }

        actions.push(ChatAction::log(
            LogLevel::Info,
            format!("session {session_id} logged in as {name:?}"),
        ));
    }

    /// Enqueue a line for every occupant of the chat room, in join order.
    pub(crate) fn broadcast_chat(&self, line: &str, actions: &mut Vec<ChatAction>) {
        for &session_id in self.chat_room.occupants() {
            actions.push(ChatAction::send(session_id, line.to_string()));
        }
    }

    /// Run the logout-room transition: leave the current room, deregister
    /// the name, drop the session.
    ///
    /// Leaving the chat room broadcasts the departure to the remaining
    /// occupants; leaving the login room broadcasts nothing. Deregistration
    /// is a no-op for sessions that never logged in.
    fn teardown_session(&mut self, session_id: SessionId, actions: &mut Vec<ChatAction>) {
        let Some(session) = self.sessions.get_mut(&session_id) else {
            return;
        };
        let previous_room = session.room;
        session.room = Room::Logout;
        let name = session.name.clone();

        if previous_room == Room::Chat {
            self.chat_room.leave(session_id);
            if let Some(name) = &name {
                self.broadcast_chat(&reply::left(name), actions);
            }
        }

        if let Some(name) = &name {
            self.registry.deregister(name);
        }

        self.sessions.remove(&session_id);
    }

    /// Display name of a session, if it has logged in.
    pub(crate) fn session_name(&self, session_id: SessionId) -> Option<String> {
        self.sessions.get(&session_id).and_then(|session| session.name.clone())
    }

    /// Number of live sessions, logged in or not.
    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// The room a session is currently in. `None` if the session is gone.
    pub fn room(&self, session_id: SessionId) -> Option<Room> {
        self.sessions.get(&session_id).map(|session| session.room)
    }

    /// Names of the chat room's occupants, in join order.
    pub fn chat_occupants(&self) -> Vec<String> {
        self.chat_room
            .occupants()
            .iter()
            .filter_map(|session_id| self.session_name(*session_id))
            .collect()
    }

    /// All registered names, in registration order.
    pub fn registered_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(driver: &mut ChatDriver, session_id: SessionId) -> Vec<ChatAction> {
        driver.process_event(ChatEvent::ConnectionAccepted { session_id }).unwrap()
    }

    fn data(driver: &mut ChatDriver, session_id: SessionId, bytes: &[u8]) -> Vec<ChatAction> {
        driver
            .process_event(ChatEvent::DataReceived {
                session_id,
                bytes: Bytes::copy_from_slice(bytes),
            })
            .unwrap()
    }

    fn sends(actions: &[ChatAction]) -> Vec<(SessionId, String)> {
        actions
            .iter()
            .filter_map(|action| match action {
                ChatAction::SendToSession { session_id, line } => {
                    Some((*session_id, line.clone()))
                },
                _ => None,
            })
            .collect()
    }

    #[test]
    fn accepted_connection_is_greeted() {
        let mut driver = ChatDriver::new(ChatConfig::default());

        let actions = accept(&mut driver, 1);

        assert_eq!(driver.connection_count(), 1);
        assert_eq!(driver.room(1), Some(Room::Login));
        assert_eq!(sends(&actions), vec![(1, "Welcome to TeaParty\r\n".to_string())]);
    }

    #[test]
    fn rejects_when_max_connections_exceeded() {
        let config = ChatConfig { max_connections: 2, ..ChatConfig::default() };
        let mut driver = ChatDriver::new(config);

        accept(&mut driver, 1);
        accept(&mut driver, 2);
        let actions = accept(&mut driver, 3);

        assert_eq!(driver.connection_count(), 2);
        assert!(matches!(actions[0], ChatAction::Close { session_id: 3, .. }));
    }

    #[test]
    fn duplicate_session_id_is_an_error() {
        let mut driver = ChatDriver::new(ChatConfig::default());

        accept(&mut driver, 1);
        let result = driver.process_event(ChatEvent::ConnectionAccepted { session_id: 1 });

        assert!(matches!(result, Err(ServerError::SessionAlreadyExists(1))));
    }

    #[test]
    fn data_for_unknown_session_is_dropped() {
        let mut driver = ChatDriver::new(ChatConfig::default());

        let actions = data(&mut driver, 99, b"say hello\r\n");

        assert!(sends(&actions).is_empty());
    }

    #[test]
    fn empty_and_whitespace_lines_produce_nothing() {
        let mut driver = ChatDriver::new(ChatConfig::default());
        accept(&mut driver, 1);

        let actions = data(&mut driver, 1, b"\r\n   \r\n\t\r\n");

        assert!(sends(&actions).is_empty());
        assert_eq!(driver.room(1), Some(Room::Login));
    }

    #[test]
    fn partial_line_never_dispatches() {
        let mut driver = ChatDriver::new(ChatConfig::default());
        accept(&mut driver, 1);

        let actions = data(&mut driver, 1, b"login ali");
        assert!(sends(&actions).is_empty());
        assert_eq!(driver.room(1), Some(Room::Login));

        data(&mut driver, 1, b"ce\r\n");
        assert_eq!(driver.room(1), Some(Room::Chat));
        assert_eq!(driver.registered_names(), vec!["alice".to_string()]);
    }

    #[test]
    fn close_after_logout_is_a_guarded_noop() {
        let mut driver = ChatDriver::new(ChatConfig::default());
        accept(&mut driver, 1);
        data(&mut driver, 1, b"login alice\r\n");

        let actions = data(&mut driver, 1, b"logout\r\n");
        assert!(actions.iter().any(|a| matches!(a, ChatAction::Close { session_id: 1, .. })));
        assert_eq!(driver.connection_count(), 0);

        let actions = driver
            .process_event(ChatEvent::ConnectionClosed {
                session_id: 1,
                reason: "connection closed".to_string(),
            })
            .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn lines_after_logout_in_the_same_chunk_are_discarded() {
        let mut driver = ChatDriver::new(ChatConfig::default());
        accept(&mut driver, 1);
        data(&mut driver, 1, b"login alice\r\n");

        let actions = data(&mut driver, 1, b"logout\r\nsay ghost\r\n");

        let say_lines: Vec<_> =
            sends(&actions).into_iter().filter(|(_, line)| line.contains("ghost")).collect();
        assert!(say_lines.is_empty());
    }
}
