//! Pure Rust implementation of the QuickLZ 1.5.0 compression format.
//!
//! QuickLZ is a byte-oriented LZ77 codec with three compression levels and
//! an optional rolling streaming buffer that lets matches reach back into
//! previously compressed frames. The wire format produced and consumed here
//! is bit-compatible with other 1.5.0 implementations.
//!
//! ```
//! use quicklz_compression::{Compressor, Decompressor};
//!
//! let data = b"round and round and round it goes";
//! let mut compressed = vec![0u8; data.len() + 400];
//! let n = Compressor::new(1, 0)?.compress(data, &mut compressed)?;
//!
//! let mut decompressed = vec![0u8; data.len()];
//! Decompressor::new(1, 0)?.decompress(&compressed[..n], &mut decompressed)?;
//! assert_eq!(&decompressed[..], data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

pub mod framed;
pub mod raw;

pub use framed::header::{size_compressed, size_decompressed, size_header, ParseError};
pub use framed::{
    CompressionError, Compressor, ConfigError, DecompressionError, Decompressor,
    DESTINATION_PADDING, STREAMING_BUFFER_0, STREAMING_BUFFER_100000, STREAMING_BUFFER_1000000,
};



#[cfg(test)]
mod tests {
    use crate::{Compressor, Decompressor};

    fn roundtrip(level: u8, data: &[u8]) -> Vec<u8> {
        let mut compressed = vec![0u8; data.len() + 400];
        let n = Compressor::new(level, 0)
            .unwrap()
            .compress(data, &mut compressed)
            .unwrap();

        let mut decompressed = vec![0u8; data.len()];
        let m = Decompressor::new(level, 0)
            .unwrap()
            .decompress(&compressed[..n], &mut decompressed)
            .unwrap();
        assert_eq!(m, data.len());
        decompressed
    }

    /// Test that the compressed data decompresses to the original at every
    /// level.
    fn inverse(s: &str) {
        for level in 1..=3 {
            assert_eq!(roundtrip(level, s.as_bytes()), s.as_bytes(), "level {}", level);
        }
    }

    #[test]
    fn shakespear() {
        inverse("to be, or not to be, that is the question");
        inverse("the lady doth protest too much, methinks");
        inverse("brevity is the soul of wit");
        inverse("now is the winter of our discontent");
    }

    #[test]
    fn repetitive() {
        inverse("round and round and round and round it goes");
        inverse("na na na na na na na na na na na na na na na batman");
        inverse("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        inverse("abcabcabcabcabcabcabcabcabcabcabcabcabcabcabc");
    }

    #[test]
    fn not_compressible() {
        inverse("as6yhol.;jrew5tyuikbfewedfyjltre22459ba");
        inverse("jhflkdjshaf9p8u89ybkvjsdbfkhvg4ut08yfrr");
    }

    #[test]
    fn short() {
        inverse("ahhd");
        inverse("ahd");
        inverse("x-29");
        inverse("x");
        inverse("k");
        inverse(".");
        inverse("ajsdh");
    }

    #[test]
    fn nulls() {
        inverse("\0\0\0\0\0\0\0\0\0\0\0\0\0");
    }

    #[test]
    fn empty_buffers_are_errors() {
        use crate::{CompressionError, DecompressionError};

        let mut out = vec![0u8; 500];
        let error = Compressor::new(1, 0).unwrap().compress(b"", &mut out);
        assert_eq!(error, Err(CompressionError::EmptyBuffer));

        let error = Decompressor::new(1, 0).unwrap().decompress(b"", &mut out);
        assert_eq!(error, Err(DecompressionError::EmptyBuffer));
    }

    #[test]
    fn invalid_configurations_are_errors() {
        use crate::ConfigError;

        assert_eq!(Compressor::new(0, 0).err(), Some(ConfigError::InvalidLevel(0)));
        assert_eq!(Compressor::new(4, 0).err(), Some(ConfigError::InvalidLevel(4)));
        assert_eq!(
            Compressor::new(2, 12345).err(),
            Some(ConfigError::InvalidStreamingBuffer(12345))
        );
        assert_eq!(Decompressor::new(9, 100_000).err(), Some(ConfigError::InvalidLevel(9)));
    }

    #[test]
    fn big_compression() {
        let mut s = Vec::with_capacity(2_000_000);

        for n in 0..2_000_000 {
            s.push((n as u8).wrapping_mul(0xA).wrapping_add(33) ^ 0xA2);
        }

        for level in 1..=3 {
            assert_eq!(roundtrip(level, &s), s, "level {}", level);
        }
    }
}
