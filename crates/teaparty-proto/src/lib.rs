//! Wire protocol for the teaparty chat server.
//!
//! The protocol is plain text over TCP: commands and replies are lines
//! terminated by `"\r\n"`. There is no framing beyond the terminator and no
//! length prefixes. This crate is the protocol leaf: it knows how to turn a
//! byte stream into lines ([`LineFramer`]), how to split a line into a verb
//! and its argument ([`Command`]), and how to format every line the server
//! can send ([`reply`]). It performs no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod framer;
pub mod reply;

pub use command::Command;
pub use framer::{LineFramer, TERMINATOR};
