//! The raw QuickLZ token-stream codec.
//!
//! Using this directly saves you the header and the fallback mechanism for
//! incompressible data, but the cores are trusting: `compress_core` assumes
//! the destination carries the format's worst-case slack and
//! `decompress_core` assumes the source slice is exactly as long as the
//! frame claims to be. The `framed` module establishes both of these before
//! calling in; if you call the cores yourself, you get to establish them
//! yourself.

mod compress;
mod decompress;
mod tables;

pub use compress::*;
pub use decompress::*;
pub use tables::*;

use byteorder::{ByteOrder, LE};

/// Minimum back-distance of an ordinary match. The overlap-aware copy in
/// the decoder steps by `MINOFFSET + 1` bytes and relies on this floor.
pub(crate) const MINOFFSET: i64 = 2;
/// The final bytes of every frame are always coded as literals; a match may
/// not start within the last `UNCONDITIONAL_MATCHLEN + UNCOMPRESSED_END`
/// bytes of the input.
pub(crate) const UNCONDITIONAL_MATCHLEN: i64 = 6;
pub(crate) const UNCOMPRESSED_END: i64 = 4;
/// Control words are 32-bit little-endian.
pub(crate) const CWORD_LEN: i64 = 4;

/// Compression level of the 1.5.0 format.
///
/// The three levels share the control-word framing but use different
/// dictionary geometries and token grammars, so a frame can only be decoded
/// at the level it was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    One,
    Two,
    Three,
}

impl Level {
    pub fn from_number(level: u8) -> Option<Level> {
        match level {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            3 => Some(Level::Three),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
        }
    }

    /// Hash bucket entries per hash value.
    pub(crate) fn pointers(self) -> usize {
        match self {
            Level::One => 1,
            Level::Two => 4,
            Level::Three => 16,
        }
    }

    pub(crate) fn hash_values(self) -> usize {
        match self {
            Level::Two => 2048,
            _ => 4096,
        }
    }

    /// Map a fetch to its hash bucket. Only the low 24 bits of the fetch
    /// influence the result.
    pub(crate) fn hash(self, fetch: u32) -> u32 {
        let mask = self.hash_values() as u32 - 1;
        match self {
            Level::Two => ((fetch >> 9) ^ (fetch >> 13) ^ fetch) & mask,
            _ => ((fetch >> 12) ^ fetch) & mask,
        }
    }

    pub(crate) fn hash_at(self, buffer: &[u8], position: i64) -> u32 {
        self.hash(fetch_at(buffer, position))
    }
}

/// A validated codec configuration: level, streaming window, and the
/// level-dependent sentinel marking an empty level-1 dictionary slot.
///
/// Level 1 without streaming uses 0 as the sentinel (position 0 is never a
/// valid back-reference source there); every other configuration must use
/// -1 because position 0 of the streaming buffer is addressable.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub(crate) level: Level,
    pub(crate) streaming_buffer: usize,
    pub(crate) offset_base: i64,
}

impl Params {
    /// Combine a level and streaming-buffer size. The caller is expected to
    /// have validated the streaming-buffer size against the three values
    /// the format allows.
    pub fn new(level: Level, streaming_buffer: usize) -> Params {
        let offset_base = if level == Level::One && streaming_buffer == 0 { 0 } else { -1 };
        Params { level, streaming_buffer, offset_base }
    }
}

/// A fetch: four little-endian bytes read at an arbitrary position.
///
/// The grammars call this a 3-byte fetch because they mask to 24 bits
/// wherever they compare; the level-1 cache is the one place all 32 bits
/// matter.
#[inline]
pub(crate) fn fetch_at(buffer: &[u8], index: i64) -> u32 {
    let index = index as usize;
    LE::read_u32(&buffer[index..index + 4])
}

/// Little-endian token write of 1, 2 or 3/4 bytes.
///
/// A 3-byte write spills a fourth zero byte which the next write (or the
/// destination slack) covers.
#[inline]
pub(crate) fn write_token(destination: &mut [u8], index: i64, value: u32, bytes: usize) {
    let index = index as usize;
    match bytes {
        1 => destination[index] = value as u8,
        2 => LE::write_u16(&mut destination[index..index + 2], value as u16),
        _ => LE::write_u32(&mut destination[index..index + 4], value),
    }
}

/// True if the `n` bytes following `index` all repeat `buffer[index]`.
#[inline]
pub(crate) fn same(buffer: &[u8], index: usize, n: usize) -> bool {
    let first = buffer[index];
    buffer[index + 1..=index + n].iter().all(|&byte| byte == first)
}
