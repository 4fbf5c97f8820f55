//! Raw Memory Operations Benchmarks
//!
//! Measures each chunk width against the standard library for:
//! 1. Copy and overlap-safe move
//! 2. Compare with a late mismatch
//! 3. Substring and single byte search
//! 4. Fill

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memview::memory::raw_ops::RawMemOps;
use memview::ChunkWidth;
use std::hint::black_box;

//==============================================================================
// TEST DATA GENERATION
//==============================================================================

/// Generate test data with a reproducible pattern
fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i * 17 + 13) % 256) as u8).collect()
}

const TEST_SIZES: [(&str, usize); 6] = [
    ("tiny_7B", 7),
    ("small_64B", 64),
    ("medium_1KB", 1024),
    ("medium_4KB", 4096),
    ("large_64KB", 65536),
    ("large_1MB", 1048576),
];

fn width_ops() -> Vec<(String, RawMemOps)> {
    ChunkWidth::ALL
        .iter()
        .map(|&width| (format!("w{}", width), RawMemOps::with_max_width(width)))
        .collect()
}

//==============================================================================
// COPY AND MOVE
//==============================================================================

fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("Raw Copy");

    for (name, size) in TEST_SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        let src = generate_test_data(size);

        for (label, ops) in width_ops() {
            group.bench_function(BenchmarkId::new(label, name), |b| {
                let mut dst = vec![0u8; size];
                b.iter(|| ops.copy(black_box(&mut dst), black_box(&src)));
            });
        }

        group.bench_function(BenchmarkId::new("std_copy_from_slice", name), |b| {
            let mut dst = vec![0u8; size];
            b.iter(|| black_box(&mut dst).copy_from_slice(black_box(&src)));
        });
    }

    group.finish();
}

fn bench_overlapping_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("Raw Overlapping Move");

    for (name, size) in TEST_SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        let shift = (size / 3).max(1);

        for (label, ops) in width_ops() {
            group.bench_function(BenchmarkId::new(label, name), |b| {
                let mut buf = generate_test_data(size + shift);
                b.iter(|| {
                    ops.move_within(black_box(&mut buf), 0..size, shift..size + shift)
                        .unwrap()
                });
            });
        }

        group.bench_function(BenchmarkId::new("std_copy_within", name), |b| {
            let mut buf = generate_test_data(size + shift);
            b.iter(|| black_box(&mut buf).copy_within(0..size, shift));
        });
    }

    group.finish();
}

//==============================================================================
// COMPARE AND SEARCH
//==============================================================================

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("Raw Compare");

    for (name, size) in TEST_SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        let lhs = generate_test_data(size);
        let mut rhs = lhs.clone();
        rhs[size - 1] ^= 0xFF;

        for (label, ops) in width_ops() {
            group.bench_function(BenchmarkId::new(label, name), |b| {
                b.iter(|| ops.compare(black_box(&lhs), black_box(&rhs)));
            });
        }

        group.bench_function(BenchmarkId::new("iter_position", name), |b| {
            b.iter(|| {
                black_box(&lhs)
                    .iter()
                    .zip(black_box(&rhs).iter())
                    .position(|(a, b)| a != b)
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Raw Search");

    for (name, size) in TEST_SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        let mut haystack = vec![b'a'; size];
        let needle = b"needle";
        if size >= needle.len() {
            haystack[size - needle.len()..].copy_from_slice(needle);
        }
        let last = haystack[size - 1];

        let word = RawMemOps::with_max_width(ChunkWidth::W64);
        let byte = RawMemOps::with_max_width(ChunkWidth::W8);

        group.bench_function(BenchmarkId::new("find_byte_word", name), |b| {
            b.iter(|| word.find_byte(black_box(&haystack), black_box(last)));
        });
        group.bench_function(BenchmarkId::new("find_byte_scalar", name), |b| {
            b.iter(|| byte.find_byte(black_box(&haystack), black_box(last)));
        });
        group.bench_function(BenchmarkId::new("find", name), |b| {
            b.iter(|| word.find(black_box(&haystack), black_box(needle)));
        });
        group.bench_function(BenchmarkId::new("find_from_end", name), |b| {
            b.iter(|| word.find_from_end(black_box(&haystack), black_box(needle)));
        });
    }

    group.finish();
}

//==============================================================================
// FILL
//==============================================================================

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("Raw Fill");

    for (name, size) in TEST_SIZES {
        group.throughput(Throughput::Bytes(size as u64));

        for (label, ops) in width_ops() {
            group.bench_function(BenchmarkId::new(label, name), |b| {
                let mut dst = vec![0u8; size];
                b.iter(|| ops.fill(black_box(&mut dst), black_box(0x5A)));
            });
        }

        group.bench_function(BenchmarkId::new("std_slice_fill", name), |b| {
            let mut dst = vec![0u8; size];
            b.iter(|| black_box(&mut dst).fill(black_box(0x5A)));
        });
    }

    group.finish();
}

criterion_group!(
    raw_ops,
    bench_copy,
    bench_overlapping_move,
    bench_compare,
    bench_search,
    bench_fill,
);

criterion_main!(raw_ops);
