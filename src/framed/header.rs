//! The 3- or 9-byte frame prefix.
//!
//! Byte 0 carries the flags; the remaining bytes carry the compressed and
//! decompressed sizes at a width chosen by the long-header bit. Everything
//! a decoder needs is in here, which is what makes the introspection
//! functions stateless.

#![allow(non_upper_case_globals)]

use byteorder::{ByteOrder, LE};
use fehler::{throw, throws};
use thiserror::Error;

use crate::raw::Level;

bitflags::bitflags! {
    pub(crate) struct Flags: u8 {
        const Compressed = 0b0000_0001;
        const LongHeader = 0b0000_0010;
        const Version    = 0b0100_0000;
    }
}

/// Errors when reading a frame header.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("the buffer ends before the header does; this cannot be a complete frame")]
    Truncated,
    #[error("the header claims compression level {0}, which this format does not have")]
    BadLevel(u8),
    #[error("the header carries streaming tag 3, which is reserved and never produced by a valid writer")]
    ReservedStreamingTag,
    #[error("the version bit is clear; this frame was not produced by a 1.5.0 writer")]
    UnsupportedVersion,
}

/// Everything byte 0 and the size fields say about a frame.
pub(crate) struct Header {
    pub compressed: bool,
    pub level: u8,
    pub streaming_tag: u8,
    pub header_size: usize,
    pub compressed_size: usize,
    pub decompressed_size: usize,
}

#[throws(ParseError)]
fn flags_byte(source: &[u8]) -> u8 {
    *source.get(0).ok_or(ParseError::Truncated)?
}

/// Header length in bytes: 3 or 9, from the long-header bit.
#[throws(ParseError)]
pub fn size_header(source: &[u8]) -> usize {
    if Flags::from_bits_truncate(flags_byte(source)?).contains(Flags::LongHeader) {
        9
    } else {
        3
    }
}

/// The total frame length the header declares, including itself.
#[throws(ParseError)]
pub fn size_compressed(source: &[u8]) -> usize {
    read_size_field(source, 1)?
}

/// The number of bytes the frame decompresses to.
#[throws(ParseError)]
pub fn size_decompressed(source: &[u8]) -> usize {
    let field = if size_header(source)? == 9 { 5 } else { 2 };
    read_size_field(source, field)?
}

#[throws(ParseError)]
fn read_size_field(source: &[u8], index: usize) -> usize {
    if size_header(source)? == 9 {
        if source.len() < index + 4 {
            throw!(ParseError::Truncated);
        }
        LE::read_u32(&source[index..index + 4]) as usize
    } else {
        *source.get(index).ok_or(ParseError::Truncated)? as usize
    }
}

#[throws(ParseError)]
pub(crate) fn parse(source: &[u8]) -> Header {
    let byte = flags_byte(source)?;
    let flags = Flags::from_bits_truncate(byte);
    if !flags.contains(Flags::Version) {
        throw!(ParseError::UnsupportedVersion);
    }

    let level = (byte >> 2) & 3;
    if level == 0 {
        throw!(ParseError::BadLevel(level));
    }

    let streaming_tag = (byte >> 4) & 3;
    if streaming_tag == 3 {
        throw!(ParseError::ReservedStreamingTag);
    }

    Header {
        compressed: flags.contains(Flags::Compressed),
        level,
        streaming_tag,
        header_size: size_header(source)?,
        compressed_size: size_compressed(source)?,
        decompressed_size: size_decompressed(source)?,
    }
}

pub(crate) fn streaming_tag(streaming_buffer: usize) -> u8 {
    match streaming_buffer {
        0 => 0,
        100_000 => 1,
        1_000_000 => 2,
        _ => 3,
    }
}

pub(crate) fn write(
    destination: &mut [u8],
    long: bool,
    compressed: bool,
    level: Level,
    streaming_buffer: usize,
    compressed_size: usize,
    decompressed_size: usize,
) {
    let mut flags = Flags::Version;
    if compressed {
        flags |= Flags::Compressed;
    }
    if long {
        flags |= Flags::LongHeader;
        LE::write_u32(&mut destination[1..5], compressed_size as u32);
        LE::write_u32(&mut destination[5..9], decompressed_size as u32);
    } else {
        destination[1] = compressed_size as u8;
        destination[2] = decompressed_size as u8;
    }
    destination[0] =
        flags.bits() | (level.number() << 2) | (streaming_tag(streaming_buffer) << 4);
}
