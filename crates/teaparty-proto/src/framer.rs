//! Line framer.
//!
//! Turns a raw byte stream into a sequence of complete text lines. Chunks
//! arrive in arbitrary sizes; a line is emitted only once its terminator has
//! been seen, and any trailing partial line is retained for the next chunk.
//!
//! Bytes are decoded as Latin-1: every byte maps to the Unicode code point of
//! the same value, so decoding cannot fail and single-byte clients round-trip
//! cleanly. There is no multi-byte encoding handling.

use bytes::BytesMut;

/// Byte sequence marking the end of one protocol line.
pub const TERMINATOR: &[u8] = b"\r\n";

/// Accumulates incoming bytes and yields complete lines.
///
/// The buffer is unbounded: no maximum line length is enforced, so a peer
/// that never sends the terminator grows the buffer without limit.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw bytes to the buffer.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete line, without its terminator.
    ///
    /// Returns `None` while the buffer holds no terminator. A line may be
    /// empty (the peer sent a bare `"\r\n"`).
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.windows(TERMINATOR.len()).position(|w| w == TERMINATOR)?;
        let line = self.buf.split_to(pos + TERMINATOR.len());
        Some(line[..pos].iter().map(|&b| char::from(b)).collect())
    }

    /// Number of buffered bytes not yet part of a complete line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
