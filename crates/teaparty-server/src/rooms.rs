//! Room state machine and command dispatch.
//!
//! Every session is in exactly one room at any time. Rooms group sessions
//! and define which verbs they can issue; each variant carries its own verb
//! table and its own fallback for unrecognized input.
//!
//! ```text
//! ┌───────────┐   login <name>   ┌──────────┐
//! │   Login   │─────────────────>│   Chat   │
//! └───────────┘                  └──────────┘
//!       │                              │
//!       │ logout / disconnect          │ logout / disconnect
//!       ↓                              ↓
//!              ┌────────────┐
//!              │   Logout   │  (deregisters the name, then the
//!              └────────────┘   session is dropped)
//! ```
//!
//! `Login` and `Logout` carry no cross-session state and exist per session.
//! The chat room is different: a single shared [`ChatRoom`] owned by the
//! driver, holding the occupant list in join order.
//!
//! Dispatch is an explicit mapping from verb string to handler function,
//! one static table per variant. Resolution never fails: a verb missing
//! from the table falls through to the variant's `unknown` handler.

use teaparty_proto::{Command, reply};

use crate::driver::{ChatAction, ChatDriver, SessionId};

/// The room a session is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Room {
    /// Pre-login holding pen for one newly accepted connection.
    Login,
    /// The single shared room where logged-in users talk.
    Chat,
    /// Transient sink entered during teardown.
    Logout,
}

impl Room {
    pub(crate) fn table(self) -> &'static VerbTable {
        match self {
            Self::Login => &LOGIN_TABLE,
            Self::Chat => &CHAT_TABLE,
            Self::Logout => &LOGOUT_TABLE,
        }
    }
}

/// Occupants of the shared chat room, in join order.
#[derive(Debug, Default)]
pub(crate) struct ChatRoom {
    occupants: Vec<SessionId>,
}

impl ChatRoom {
    pub(crate) fn join(&mut self, session_id: SessionId) {
        if !self.occupants.contains(&session_id) {
            self.occupants.push(session_id);
        }
    }

    pub(crate) fn leave(&mut self, session_id: SessionId) {
        self.occupants.retain(|&id| id != session_id);
    }

    pub(crate) fn occupants(&self) -> &[SessionId] {
        &self.occupants
    }
}

/// What the dispatcher should do with the session after a handler ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionFlow {
    /// Keep the session; process further lines normally.
    Continue,
    /// End the session gracefully. Raised by `logout` in any room.
    End,
}

/// A command handler. Receives the argument string, or for `unknown` the
/// unresolved verb.
type Handler = fn(&mut ChatDriver, SessionId, &str, &mut Vec<ChatAction>) -> SessionFlow;

/// Verb table for one room variant.
pub(crate) struct VerbTable {
    verbs: &'static [(&'static str, Handler)],
    unknown: Handler,
}

impl VerbTable {
    fn lookup(&self, verb: &str) -> Option<Handler> {
        self.verbs.iter().find(|(v, _)| *v == verb).map(|&(_, handler)| handler)
    }
}

static LOGIN_TABLE: VerbTable =
    VerbTable { verbs: &[("login", do_login), ("logout", do_logout)], unknown: unknown_login };

static CHAT_TABLE: VerbTable = VerbTable {
    verbs: &[("say", do_say), ("look", do_look), ("who", do_who), ("logout", do_logout)],
    unknown: unknown_generic,
};

static LOGOUT_TABLE: VerbTable =
    VerbTable { verbs: &[("logout", do_logout)], unknown: unknown_generic };

/// Route one complete line through the session's current room.
///
/// Empty and whitespace-only lines are silently ignored.
pub(crate) fn dispatch(
    driver: &mut ChatDriver,
    session_id: SessionId,
    line: &str,
    actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    let Some(cmd) = Command::parse(line) else {
        return SessionFlow::Continue;
    };

    let room = match driver.sessions.get(&session_id) {
        Some(session) => session.room,
        None => return SessionFlow::Continue,
    };

    let table = room.table();
    match table.lookup(&cmd.verb) {
        Some(handler) => handler(driver, session_id, &cmd.arg, actions),
        None => (table.unknown)(driver, session_id, &cmd.verb, actions),
    }
}

fn do_login(
    driver: &mut ChatDriver,
    session_id: SessionId,
    arg: &str,
    actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    let name = arg.trim();
    if name.is_empty() {
        actions.push(ChatAction::send(session_id, reply::empty_name()));
    } else if driver.registry.contains(name) {
        actions.push(ChatAction::send(session_id, reply::name_taken(name)));
    } else {
        driver.enter_chat_room(session_id, name, actions);
    }
    SessionFlow::Continue
}

fn do_say(
    driver: &mut ChatDriver,
    session_id: SessionId,
    arg: &str,
    actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    let Some(name) = driver.session_name(session_id) else {
        return SessionFlow::Continue;
    };
    driver.broadcast_chat(&reply::say_line(&name, arg), actions);
    SessionFlow::Continue
}

fn do_look(
    driver: &mut ChatDriver,
    session_id: SessionId,
    _arg: &str,
    actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    actions.push(ChatAction::send(session_id, reply::look_header()));
    for name in driver.chat_occupants() {
        actions.push(ChatAction::send(session_id, reply::name_line(&name)));
    }
    SessionFlow::Continue
}

fn do_who(
    driver: &mut ChatDriver,
    session_id: SessionId,
    _arg: &str,
    actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    actions.push(ChatAction::send(session_id, reply::who_header()));
    for name in driver.registered_names() {
        actions.push(ChatAction::send(session_id, reply::name_line(&name)));
    }
    SessionFlow::Continue
}

fn do_logout(
    _driver: &mut ChatDriver,
    _session_id: SessionId,
    _arg: &str,
    _actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    SessionFlow::End
}

fn unknown_generic(
    _driver: &mut ChatDriver,
    session_id: SessionId,
    verb: &str,
    actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    actions.push(ChatAction::send(session_id, reply::unknown_command(verb)));
    SessionFlow::Continue
}

fn unknown_login(
    _driver: &mut ChatDriver,
    session_id: SessionId,
    _verb: &str,
    actions: &mut Vec<ChatAction>,
) -> SessionFlow {
    actions.push(ChatAction::send(session_id, reply::login_hint()));
    SessionFlow::Continue
}
