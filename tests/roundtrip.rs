use quicklz_compression::{
    size_compressed, size_decompressed, size_header, Compressor, DecompressionError, Decompressor,
    DESTINATION_PADDING,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn compress(level: u8, streaming: usize, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; data.len() + DESTINATION_PADDING];
    let n = Compressor::new(level, streaming)
        .unwrap()
        .compress(data, &mut out)
        .unwrap();
    out.truncate(n);
    out
}

fn decompress(level: u8, streaming: usize, frame: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; size_decompressed(frame).unwrap()];
    let n = Decompressor::new(level, streaming)
        .unwrap()
        .decompress(frame, &mut out)
        .unwrap();
    assert_eq!(n, out.len());
    out
}

/// Performs a full compress-decompress cycle at one configuration and
/// asserts bit-exact reconstruction.
#[track_caller]
fn assert_round_trip(level: u8, streaming: usize, data: &[u8]) {
    let frame = compress(level, streaming, data);
    assert_eq!(size_compressed(&frame).unwrap(), frame.len());
    assert_eq!(size_decompressed(&frame).unwrap(), data.len());
    assert_eq!(decompress(level, streaming, &frame), data, "level {}", level);
}

fn mixed_corpus(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0xcafe);
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        match rng.gen_range(0, 4) {
            // a run
            0 => {
                let byte = rng.gen::<u8>();
                let run = rng.gen_range(1, 500);
                data.extend(std::iter::repeat(byte).take(run));
            }
            // noise
            1 => {
                let n = rng.gen_range(1, 300);
                data.extend((0..n).map(|_| rng.gen::<u8>()));
            }
            // text
            2 => data.extend_from_slice(b"the daily grind of a compression dictionary "),
            // repeat an earlier slice
            _ => {
                if data.is_empty() {
                    data.push(0);
                } else {
                    let start = rng.gen_range(0, data.len());
                    let n = (data.len() - start).min(rng.gen_range(1, 400));
                    let slice = data[start..start + n].to_vec();
                    data.extend_from_slice(&slice);
                }
            }
        }
    }
    data.truncate(len);
    data
}

#[test]
fn every_configuration_round_trips() {
    let corpus = mixed_corpus(1 << 20);
    for &level in &[1u8, 2, 3] {
        for &streaming in &[0usize, 100_000, 1_000_000] {
            for &len in &[1usize, 2, 11, 215, 216, 4096, 100_000, 1 << 20] {
                assert_round_trip(level, streaming, &corpus[..len]);
            }
        }
    }
}

#[test]
fn sixteen_a_level_1() {
    let data = [b'A'; 16];
    let frame = compress(1, 0, &data);

    // compressed flag set, and a real match happened: the frame undercuts
    // the 19-byte raw fallback
    assert_eq!(frame[0] & 1, 1);
    assert!(frame.len() < data.len() + 3);
    // control word + 4 literals + one 2-byte distance-1 match + 4 tail
    // literals behind a short header
    assert_eq!(frame.len(), 17);
    assert_eq!(decompress(1, 0, &frame), data);
}

#[test]
fn byte_ramp_level_3() {
    let mut data = Vec::new();
    for _ in 0..8 {
        data.extend(0u8..=255);
    }
    let frame = compress(3, 0, &data);
    assert!(frame.len() < data.len());
    assert_eq!(decompress(3, 0, &frame), data);
}

#[test]
fn random_data_falls_back_to_raw() {
    let mut data = vec![0u8; 4096];
    StdRng::seed_from_u64(0x5eed).fill(&mut data[..]);

    let frame = compress(2, 0, &data);
    assert_eq!(frame[0] & 1, 0);
    assert_eq!(frame.len(), data.len() + 9);
    assert_eq!(&frame[9..], &data[..]);
    assert_eq!(decompress(2, 0, &frame), data);
}

#[test]
fn pangram_level_3() {
    let mut data = Vec::new();
    for _ in 0..100 {
        data.extend_from_slice(b"The quick brown fox jumps over the lazy dog. ");
    }
    let frame = compress(3, 0, &data);
    assert!(frame.len() < 200, "got {} bytes", frame.len());
    assert_eq!(decompress(3, 0, &frame), data);
}

#[test]
fn single_byte_level_1() {
    let data = [0x42u8];
    let frame = compress(1, 0, &data);
    // minimum payload is 9 bytes behind a 3-byte header
    assert_eq!(frame.len(), 12);
    assert_eq!(decompress(1, 0, &frame), data);
}

#[test]
fn header_width_boundary() {
    let short = compress(1, 0, &vec![b'x'; 215]);
    assert_eq!(size_header(&short).unwrap(), 3);
    assert_eq!(short[0] & 2, 0);

    let long = compress(1, 0, &vec![b'x'; 216]);
    assert_eq!(size_header(&long).unwrap(), 9);
    assert_eq!(long[0] & 2, 2);

    assert_round_trip(1, 0, &vec![b'x'; 215]);
    assert_round_trip(1, 0, &vec![b'x'; 216]);
}

#[test]
fn small_destination_is_an_error() {
    use quicklz_compression::CompressionError;

    let data = [7u8; 100];
    let mut out = vec![0u8; data.len() + DESTINATION_PADDING - 1];
    let error = Compressor::new(3, 0).unwrap().compress(&data, &mut out);
    assert_eq!(error, Err(CompressionError::SmallBuffer));

    let frame = compress(3, 0, &data);
    let mut out = vec![0u8; data.len() - 1];
    let error = Decompressor::new(3, 0).unwrap().decompress(&frame, &mut out);
    assert_eq!(error, Err(DecompressionError::SmallBuffer));
}

#[test]
fn mismatched_configuration_is_rejected() {
    let frame = compress(1, 0, b"some reasonably ordinary input data");

    let mut out = vec![0u8; 64];
    let error = Decompressor::new(2, 0).unwrap().decompress(&frame, &mut out);
    assert_eq!(
        error,
        Err(DecompressionError::LevelMismatch { frame: 1, configured: 2 })
    );

    let error = Decompressor::new(1, 100_000)
        .unwrap()
        .decompress(&frame, &mut out);
    assert_eq!(error, Err(DecompressionError::StreamingMismatch));
}

#[test]
fn match_offset_before_history_is_corrupt() {
    // level 3, short header: one match token claiming distance 10 before
    // anything was produced
    let frame = [
        0x4d, 11, 20, // header
        0x01, 0x00, 0x00, 0x80, // control word: first token is a match
        10 << 2, // distance 10, length 3
        0x00, 0x00, 0x00,
    ];
    let mut out = vec![0u8; 20];
    let error = Decompressor::new(3, 0).unwrap().decompress(&frame, &mut out);
    assert_eq!(error, Err(DecompressionError::CorruptStream));
}

#[test]
fn match_offset_too_close_is_corrupt() {
    // level 1: a match against a dictionary slot that still holds its
    // initial position resolves closer than the minimum back-distance
    let frame = [
        0x45, 11, 20, // header
        0x01, 0x00, 0x00, 0x80, // control word: first token is a match
        0x11, 0x00, // length-3 match
        0x00, 0x00,
    ];
    let mut out = vec![0u8; 20];
    let error = Decompressor::new(1, 0).unwrap().decompress(&frame, &mut out);
    assert_eq!(error, Err(DecompressionError::CorruptStream));
}

#[test]
fn overlong_match_is_corrupt() {
    // level 3: three literals, then an 18-byte match that would run into
    // the region reserved for the literal tail
    let frame = [
        0x4d, 14, 20, // header
        0x08, 0x00, 0x00, 0x80, // control word: L L L M
        b'a', b'b', b'c', 0xfe, 0x00, // match: distance 3, length 18
        0x00, 0x00,
    ];
    let mut out = vec![0u8; 20];
    let error = Decompressor::new(3, 0).unwrap().decompress(&frame, &mut out);
    assert_eq!(error, Err(DecompressionError::CorruptStream));
}

#[test]
fn truncated_frame_is_rejected() {
    let mut frame = compress(2, 0, &mixed_corpus(1000));
    let declared = frame.len();
    frame.truncate(declared / 2);

    let mut out = vec![0u8; 1000];
    let error = Decompressor::new(2, 0).unwrap().decompress(&frame, &mut out);
    assert_eq!(
        error,
        Err(DecompressionError::Truncated { declared, present: declared / 2 })
    );
}

#[test]
fn reserved_streaming_tag_is_rejected() {
    use quicklz_compression::ParseError;

    // flags byte with streaming tag 3
    let frame = [0x7d, 12, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut out = vec![0u8; 16];
    let error = Decompressor::new(1, 0).unwrap().decompress(&frame, &mut out);
    assert_eq!(
        error,
        Err(DecompressionError::HeaderParse(ParseError::ReservedStreamingTag))
    );
}

#[test]
fn compressed_sizes_describe_themselves() {
    let corpus = mixed_corpus(50_000);
    for &level in &[1u8, 2, 3] {
        let frame = compress(level, 0, &corpus);
        assert_eq!(size_compressed(&frame).unwrap(), frame.len());
        assert_eq!(size_decompressed(&frame).unwrap(), corpus.len());
        assert_eq!((frame[0] >> 2) & 3, level);
    }
}
