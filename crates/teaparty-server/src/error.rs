//! Server error types.

use crate::driver::SessionId;

/// Errors that can occur in the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error (invalid bind address, port in use, etc.).
    ///
    /// Fatal: the process cannot start. Fix configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport/network error (accept failure, I/O error, etc.).
    ///
    /// Contained to the affected connection; the server keeps serving other
    /// clients.
    #[error("transport error: {0}")]
    Transport(String),

    /// A session ID was registered twice.
    ///
    /// The accept loop assigns unique IDs, so this indicates a logic bug.
    #[error("session already exists: {0}")]
    SessionAlreadyExists(SessionId),
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
