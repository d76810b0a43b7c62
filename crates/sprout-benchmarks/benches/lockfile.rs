//! Lockfile codec benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sprout_benchmarks::{criterion_config, resolved_map};
use sprout_lockfile::{decode, encode};

/// Benchmark encoding and decoding lockfiles of different sizes
fn bench_lockfile_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("lockfile_codec");

    for package_count in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*package_count as u64));
        let versions = resolved_map(*package_count);
        let text = encode(&versions).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", package_count), &versions, |b, versions| {
            b.iter(|| black_box(encode(versions).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("decode", package_count), &text, |b, text| {
            b.iter(|| black_box(decode(text).unwrap()));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_lockfile_codec
}
criterion_main!(benches);
