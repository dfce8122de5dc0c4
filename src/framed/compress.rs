use fehler::{throw, throws};
use thiserror::Error;

use super::{header, validate, ConfigError, DESTINATION_PADDING};
use crate::raw::{compress_core, EncoderTable, Params};

/// Errors when compressing a QuickLZ frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionError {
    #[error("refusing to compress an empty buffer (or into one)")]
    EmptyBuffer,
    #[error("the destination you gave me must be at least 400 bytes longer than the source; the encoder may expand that far before the raw fallback takes over")]
    SmallBuffer,
}
type Error = CompressionError; // do it this way for better docs

/// A stateful QuickLZ compressor.
///
/// Construct it with a level and a streaming-buffer size; the dictionary is
/// allocated once and lives as long as the instance. With a streaming
/// buffer, consecutive [`compress`](Compressor::compress) calls share a
/// rolling history and their output must be decompressed in order by a
/// [`Decompressor`](super::Decompressor) configured identically.
pub struct Compressor {
    params: Params,
    stream_buffer: Vec<u8>,
    stream_counter: usize,
    table: EncoderTable,
}

impl Compressor {
    /// `level` must be 1, 2 or 3 and `streaming_buffer` one of 0, 100000
    /// and 1000000.
    #[throws(ConfigError)]
    pub fn new(level: u8, streaming_buffer: usize) -> Compressor {
        let params = validate(level, streaming_buffer)?;
        let mut table = EncoderTable::new(&params);
        table.reset(&params);
        Compressor {
            stream_buffer: vec![0; params.streaming_buffer],
            stream_counter: 0,
            table,
            params,
        }
    }

    /// Compress all of `source` into `destination`, returning the frame
    /// length. The destination must be at least `source.len() + 400` bytes.
    ///
    /// Sources longer than `u32::MAX - 400` cannot be described by the
    /// header and yield `Ok(0)` without touching the destination.
    #[throws]
    pub fn compress(&mut self, source: &[u8], destination: &mut [u8]) -> usize {
        if source.is_empty() || destination.is_empty() {
            throw!(Error::EmptyBuffer);
        }
        if destination.len() < source.len() + DESTINATION_PADDING {
            throw!(Error::SmallBuffer);
        }

        let size = source.len();
        if size as u64 > u32::MAX as u64 - DESTINATION_PADDING as u64 {
            return 0;
        }

        let base = if size < 216 { 3 } else { 9 };
        let streaming = self.params.streaming_buffer;

        let frame_size;
        let compressed;
        if streaming == 0 || self.stream_counter + size - 1 >= streaming {
            // No rolling history (or it would overflow): compress this
            // frame against a freshly reset dictionary.
            self.table.reset(&self.params);
            let payload =
                compress_core(&self.params, &mut self.table, source, 0, destination, base, size);
            if streaming > 0 {
                self.table.reset(&self.params);
            }
            if payload == 0 {
                destination[base..base + size].copy_from_slice(source);
                frame_size = size + base;
                compressed = false;
            } else {
                frame_size = base + payload;
                compressed = true;
            }
            self.stream_counter = 0;
        } else {
            // Append to the rolling history and compress from there, so
            // matches may reach back into earlier frames.
            let src_base = self.stream_counter;
            self.stream_buffer[src_base..src_base + size].copy_from_slice(source);
            let payload = compress_core(
                &self.params,
                &mut self.table,
                &self.stream_buffer,
                src_base,
                destination,
                base,
                size,
            );
            if payload == 0 {
                destination[base..base + size]
                    .copy_from_slice(&self.stream_buffer[src_base..src_base + size]);
                frame_size = size + base;
                compressed = false;
                self.table.reset(&self.params);
            } else {
                frame_size = base + payload;
                compressed = true;
            }
            self.stream_counter += size;
        }

        header::write(
            destination,
            base == 9,
            compressed,
            self.params.level,
            streaming,
            frame_size,
            size,
        );
        frame_size
    }
}
