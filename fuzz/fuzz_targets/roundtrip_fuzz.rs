#![no_main]
use libfuzzer_sys::fuzz_target;
use quicklz_compression::{Compressor, Decompressor, DESTINATION_PADDING};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    for &level in &[1u8, 2, 3] {
        let mut compressed = vec![0u8; data.len() + DESTINATION_PADDING];
        let n = Compressor::new(level, 0)
            .unwrap()
            .compress(data, &mut compressed)
            .expect("compressing a sized buffer cannot fail");

        let mut decompressed = vec![0u8; data.len()];
        let m = Decompressor::new(level, 0)
            .unwrap()
            .decompress(&compressed[..n], &mut decompressed)
            .expect("our own frames must decode");
        assert_eq!(m, data.len());
        assert_eq!(&decompressed[..], data);
    }
});
