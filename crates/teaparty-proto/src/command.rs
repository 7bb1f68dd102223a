//! Command parsing.
//!
//! A command line is a verb followed optionally by one argument string. The
//! verb is the text up to the first space, taken verbatim; the argument is
//! everything after it with leading and trailing whitespace trimmed. Lines
//! that are empty or whitespace-only parse to nothing and must produce no
//! response.

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// First whitespace-delimited token of the line.
    ///
    /// May be empty when the line starts with a space; resolution against a
    /// room's verb table then falls through to the unknown handler.
    pub verb: String,
    /// Remainder of the line, trimmed. Empty when the verb stands alone.
    pub arg: String,
}

impl Command {
    /// Split a line into verb and argument.
    ///
    /// Returns `None` for empty or whitespace-only lines.
    pub fn parse(line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }

        let (verb, rest) = match line.split_once(' ') {
            Some((verb, rest)) => (verb, rest),
            None => (line, ""),
        };

        Some(Self { verb: verb.to_string(), arg: rest.trim().to_string() })
    }
}
