//! The QuickLZ frame format.
//!
//! A frame is a 3- or 9-byte header followed by either a token stream or a
//! raw copy of the source when compression would have expanded it.
//!
//! The frame format is self-describing: both sizes can be read from the
//! header alone, without decoding. It is not self-terminating though, and
//! frames produced with a streaming buffer are not independent - they must
//! be decompressed in order by a decompressor configured identically.

mod compress;
mod decompress;
pub mod header;

use fehler::{throw, throws};
use thiserror::Error;

use crate::raw::{Level, Params};

/// No streaming buffer: every frame is compressed against an empty history.
pub const STREAMING_BUFFER_0: usize = 0;
/// A 100 kB rolling window shared by consecutive frames.
pub const STREAMING_BUFFER_100000: usize = 100_000;
/// A 1 MB rolling window shared by consecutive frames.
pub const STREAMING_BUFFER_1000000: usize = 1_000_000;

/// How much larger than the source the destination must be. The encoder
/// may write this far past the source length before the expansion abort
/// fires and the raw fallback takes over.
pub const DESTINATION_PADDING: usize = 400;

/// Errors when constructing a [`Compressor`] or [`Decompressor`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid compression level ({0}); this format has levels 1, 2 and 3")]
    InvalidLevel(u8),
    #[error("invalid streaming buffer size ({0}); this format allows 0, 100000 and 1000000")]
    InvalidStreamingBuffer(usize),
}

#[throws(ConfigError)]
pub(crate) fn validate(level: u8, streaming_buffer: usize) -> Params {
    let level = Level::from_number(level).ok_or(ConfigError::InvalidLevel(level))?;
    match streaming_buffer {
        STREAMING_BUFFER_0 | STREAMING_BUFFER_100000 | STREAMING_BUFFER_1000000 => {}
        other => throw!(ConfigError::InvalidStreamingBuffer(other)),
    }
    Params::new(level, streaming_buffer)
}

pub use compress::*;
pub use decompress::*;
