//! Server-to-client line formats.
//!
//! Every line the server can put on the wire is built here, one constructor
//! per format, so the exact byte sequences live in a single place. All
//! replies carry their own terminator; some span two terminated lines and
//! are sent as one write.

/// Line terminator appended to every reply.
pub const CRLF: &str = "\r\n";

/// Greeting sent to a session the moment it connects.
pub fn welcome(server_name: &str) -> String {
    format!("Welcome to {server_name}{CRLF}")
}

/// Hint sent for any unrecognized command before login.
pub fn login_hint() -> String {
    format!("Please log in{CRLF}Use \"log in <nick>\"{CRLF}")
}

/// Rejection for a `login` with no name.
pub fn empty_name() -> String {
    format!("Please enter a name{CRLF}")
}

/// Rejection for a `login` with a name already in use.
pub fn name_taken(name: &str) -> String {
    format!("The name \"{name}\" is taken.{CRLF}Please try again.{CRLF}")
}

/// Broadcast when a session joins the chat room.
pub fn entered(name: &str) -> String {
    format!("{name} has entered the room.{CRLF}")
}

/// Broadcast when a session leaves the chat room.
pub fn left(name: &str) -> String {
    format!("{name} has left the room.{CRLF}")
}

/// Broadcast carrying one `say` message.
pub fn say_line(name: &str, text: &str) -> String {
    format!("{name}: {text}{CRLF}")
}

/// Header line of the `look` response; occupant names follow one per line.
///
/// The space before the terminator is part of the format.
pub fn look_header() -> String {
    format!("The following are in this room: {CRLF}")
}

/// Header line of the `who` response; registered names follow one per line.
pub fn who_header() -> String {
    format!("The following are logged in: {CRLF}")
}

/// One name in a `look` or `who` listing.
pub fn name_line(name: &str) -> String {
    format!("{name}{CRLF}")
}

/// Reply for a verb the current room does not recognize.
///
/// Compatibility: the stray trailing `s` is part of the deployed wire format
/// and must not be corrected here.
pub fn unknown_command(cmd: &str) -> String {
    format!("Unknown command: {cmd}s{CRLF}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_byte_exact() {
        assert_eq!(welcome("TestChat"), "Welcome to TestChat\r\n");
        assert_eq!(login_hint(), "Please log in\r\nUse \"log in <nick>\"\r\n");
        assert_eq!(empty_name(), "Please enter a name\r\n");
        assert_eq!(name_taken("alice"), "The name \"alice\" is taken.\r\nPlease try again.\r\n");
        assert_eq!(entered("alice"), "alice has entered the room.\r\n");
        assert_eq!(left("alice"), "alice has left the room.\r\n");
        assert_eq!(say_line("alice", "hello"), "alice: hello\r\n");
        assert_eq!(look_header(), "The following are in this room: \r\n");
        assert_eq!(who_header(), "The following are logged in: \r\n");
        assert_eq!(name_line("bob"), "bob\r\n");
    }

    #[test]
    fn unknown_command_keeps_the_trailing_s() {
        assert_eq!(unknown_command("dance"), "Unknown command: dances\r\n");
        assert_eq!(unknown_command(""), "Unknown command: s\r\n");
    }
}
