use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quicklz_compression::{Compressor, Decompressor, DESTINATION_PADDING};
use rand::prelude::*;

fn criterion_benchmark(c: &mut Criterion) {
    let mut data = vec![0u8; 10_000_000];
    thread_rng().fill(&mut data[2_000_000..6_000_000]); // mixed

    for &level in &[1u8, 2, 3] {
        let mut compressed = vec![0u8; data.len() + DESTINATION_PADDING];
        let n = Compressor::new(level, 0)
            .unwrap()
            .compress(&data, &mut compressed)
            .unwrap();
        compressed.truncate(n);

        let mut group = c.benchmark_group(format!("level {}", level));

        group.bench_function("compress", |b| {
            let mut compressor = Compressor::new(level, 0).unwrap();
            let mut out = vec![0u8; data.len() + DESTINATION_PADDING];
            b.iter(|| compressor.compress(black_box(&data), &mut out).unwrap())
        });

        group.bench_function("decompress", |b| {
            let mut decompressor = Decompressor::new(level, 0).unwrap();
            let mut out = vec![0u8; data.len()];
            b.iter(|| decompressor.decompress(black_box(&compressed), &mut out).unwrap())
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
