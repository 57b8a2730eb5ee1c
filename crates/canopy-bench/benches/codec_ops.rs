//! Criterion micro-benchmarks for spec serialization and the binary codec.

use std::hint::black_box;

use canopy_bench::{record_heavy_tree, reference_tree};
use canopy_codec::{decode_spec, deserialize, encode_spec, serialize};
use canopy_core::Value;
use canopy_spec::{flatten, TreeSpec};
use canopy_test_utils::fixtures::mixed_tree;
use canopy_test_utils::{registry_with_fixtures, Leaf};
use criterion::{criterion_group, criterion_main, Criterion};

/// Flatten `tree` and keep only its spec.
fn make_spec(tree: &Value<Leaf>) -> TreeSpec<Leaf> {
    let registry = registry_with_fixtures();
    flatten(&registry, tree).unwrap().spec
}

/// Benchmark: spec to records and back for 500 dict entries.
fn bench_serialize_records(c: &mut Criterion) {
    let registry = registry_with_fixtures();
    let spec = make_spec(&record_heavy_tree(500));
    let records = serialize(&spec);

    c.bench_function("serialize_records_500", |b| {
        b.iter(|| {
            let records = serialize(&spec);
            black_box(&records);
        });
    });

    c.bench_function("deserialize_records_500", |b| {
        b.iter(|| {
            let spec = deserialize(&registry, &records).unwrap();
            black_box(&spec);
        });
    });
}

/// Benchmark: binary encode of the 4096-leaf reference spec.
fn bench_codec_encode_reference(c: &mut Criterion) {
    let spec = make_spec(&reference_tree());

    c.bench_function("codec_encode_reference_4096", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(64 * 1024);
            encode_spec(&mut buf, &spec).unwrap();
            black_box(&buf);
        });
    });
}

/// Benchmark: binary decode of the 4096-leaf reference spec.
fn bench_codec_decode_reference(c: &mut Criterion) {
    let registry = registry_with_fixtures();
    let spec = make_spec(&reference_tree());
    let mut buf = Vec::new();
    encode_spec(&mut buf, &spec).unwrap();

    c.bench_function("codec_decode_reference_4096", |b| {
        b.iter(|| {
            let mut cursor = buf.as_slice();
            let decoded = decode_spec(&mut cursor, &registry).unwrap();
            black_box(&decoded);
        });
    });
}

/// Benchmark: binary round trip of the mixed tree's spec.
fn bench_codec_roundtrip_custom(c: &mut Criterion) {
    let registry = registry_with_fixtures();
    let spec = make_spec(&mixed_tree());

    c.bench_function("codec_roundtrip_mixed_custom", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(1024);
            encode_spec(&mut buf, &spec).unwrap();
            let mut cursor = buf.as_slice();
            let decoded = decode_spec(&mut cursor, &registry).unwrap();
            black_box(&decoded);
        });
    });
}

criterion_group!(
    benches,
    bench_serialize_records,
    bench_codec_encode_reference,
    bench_codec_decode_reference,
    bench_codec_roundtrip_custom
);
criterion_main!(benches);
