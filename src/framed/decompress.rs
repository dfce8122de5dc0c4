use fehler::{throw, throws};
use thiserror::Error;

use super::{header, validate, ConfigError};
use crate::raw::{decompress_core, DecoderTable, Params};

/// Errors when decompressing a QuickLZ frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressionError {
    #[error("refusing to decompress an empty buffer (or into one)")]
    EmptyBuffer,
    #[error("the destination you gave me is smaller than the decompressed size the header declares")]
    SmallBuffer,
    #[error("invalid header")]
    HeaderParse(#[from] header::ParseError),
    #[error("the header declares {declared} compressed bytes but only {present} are present")]
    Truncated { declared: usize, present: usize },
    #[error("the frame was written at compression level {frame} but this decompressor is configured for level {configured}")]
    LevelMismatch { frame: u8, configured: u8 },
    #[error("the frame was written with a different streaming-buffer size than this decompressor is configured for")]
    StreamingMismatch,
    #[error("the token stream is corrupt: an offset or match length points outside the reconstructed data, or the stream ends mid-token")]
    CorruptStream,
}
type Error = DecompressionError; // do it this way for better docs

/// A stateful QuickLZ decompressor.
///
/// Must be configured exactly like the [`Compressor`](super::Compressor)
/// that produced the frames. With a streaming buffer, frames carry matches
/// into each other and have to be decompressed in the order they were
/// produced.
pub struct Decompressor {
    params: Params,
    stream_buffer: Vec<u8>,
    stream_counter: usize,
    table: Option<DecoderTable>,
}

impl Decompressor {
    /// `level` must be 1, 2 or 3 and `streaming_buffer` one of 0, 100000
    /// and 1000000.
    #[throws(ConfigError)]
    pub fn new(level: u8, streaming_buffer: usize) -> Decompressor {
        let params = validate(level, streaming_buffer)?;
        let mut table = DecoderTable::new(&params);
        if let Some(table) = table.as_mut() {
            table.reset();
        }
        Decompressor {
            stream_buffer: vec![0; params.streaming_buffer],
            stream_counter: 0,
            table,
            params,
        }
    }

    /// Decompress one frame from `source` into `destination`, returning
    /// the decompressed length. The destination must hold at least
    /// `size_decompressed(source)` bytes.
    #[throws]
    pub fn decompress(&mut self, source: &[u8], destination: &mut [u8]) -> usize {
        if source.is_empty() || destination.is_empty() {
            throw!(Error::EmptyBuffer);
        }

        let head = header::parse(source)?;
        if head.level != self.params.level.number() {
            throw!(Error::LevelMismatch {
                frame: head.level,
                configured: self.params.level.number(),
            });
        }
        if head.streaming_tag != header::streaming_tag(self.params.streaming_buffer) {
            throw!(Error::StreamingMismatch);
        }

        let size = head.decompressed_size;
        if destination.len() < size {
            throw!(Error::SmallBuffer);
        }
        // Bound the declared frame length by what is actually present, so
        // the in-loop checks against it are real memory bounds.
        if source.len() < head.compressed_size {
            throw!(Error::Truncated {
                declared: head.compressed_size,
                present: source.len(),
            });
        }
        if !head.compressed && head.compressed_size < head.header_size + size {
            throw!(Error::Truncated {
                declared: head.header_size + size,
                present: head.compressed_size,
            });
        }
        if size == 0 {
            return 0;
        }
        let frame = &source[..head.compressed_size];

        let streaming = self.params.streaming_buffer;
        if streaming == 0 || self.stream_counter + size - 1 >= streaming {
            if head.compressed {
                if let Some(table) = self.table.as_mut() {
                    table.reset();
                }
                let decoded = decompress_core(
                    &self.params,
                    self.table.as_mut(),
                    frame,
                    head.header_size,
                    destination,
                    0,
                    size,
                    0,
                );
                if decoded == 0 {
                    throw!(Error::CorruptStream);
                }
            } else {
                destination[..size]
                    .copy_from_slice(&frame[head.header_size..head.header_size + size]);
            }
            self.stream_counter = 0;
            if let Some(table) = self.table.as_mut() {
                table.reset();
            }
        } else {
            // Decode into the rolling history first, then hand the bytes
            // to the caller; later frames may match against them.
            let dst_base = self.stream_counter;
            if head.compressed {
                let decoded = decompress_core(
                    &self.params,
                    self.table.as_mut(),
                    frame,
                    head.header_size,
                    &mut self.stream_buffer,
                    dst_base,
                    size,
                    0,
                );
                if decoded == 0 {
                    throw!(Error::CorruptStream);
                }
            } else {
                self.stream_buffer[dst_base..dst_base + size]
                    .copy_from_slice(&frame[head.header_size..head.header_size + size]);
                if let Some(table) = self.table.as_mut() {
                    table.reset();
                }
            }
            destination[..size].copy_from_slice(&self.stream_buffer[dst_base..dst_base + size]);
            self.stream_counter += size;
        }
        size
    }
}
