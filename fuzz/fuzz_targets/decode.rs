#![no_main]
use libfuzzer_sys::fuzz_target;
use quicklz_compression::Decompressor;

fuzz_target!(|data: &[u8]| {
    // arbitrary bytes must never panic or write out of bounds, at any
    // configuration; errors are fine
    let mut output = vec![0u8; 1 << 16];
    for &level in &[1u8, 2, 3] {
        for &streaming in &[0usize, 100_000, 1_000_000] {
            let mut decompressor = Decompressor::new(level, streaming).unwrap();
            let _ = decompressor.decompress(data, &mut output);
        }
    }
});
