//! The IPC wire codec (§3.1, §6): a length-prefixed byte serializer/deserializer plus
//! frame-at-a-time transport over any `Read`/`Write`. This is the one artifact of the
//! render pipeline explicitly required to cross a process boundary — the painter's
//! `DisplayList` — so it ships here as a small, self-contained codec with no socket or
//! event-loop dependency, grounded on the original engine's `clever::ipc::Serializer`.
//!
//! Everything multi-byte (integers, the IEEE-754 bit pattern of floats) is written
//! network byte order (big-endian); strings and byte blobs are length-prefixed with a
//! `u32` length followed by raw bytes. `Underflow` is the one error class in the whole
//! core that is unrecoverable and closes the channel (§7).

mod frame;
mod reader;
mod writer;

pub use frame::{recv_frame, send_frame};
pub use reader::Deserializer;
pub use writer::Serializer;

use std::fmt;

/// Raised when a read would run past the end of the buffer. Unlike every other error
/// class in this core (parse recovery, selector re-parse failure), this one is
/// unrecoverable: the caller must treat the channel as closed (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underflow {
    pub requested: usize,
    pub remaining: usize,
}

impl fmt::Display for Underflow {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "underflow: requested {} bytes, {} remaining", self.requested, self.remaining)
    }
}

impl std::error::Error for Underflow {}

pub type Result<T> = std::result::Result<T, Underflow>;
