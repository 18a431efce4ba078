//! Benchmarks for class file decoding and usage extraction.
//!
//! Uses the compiled samples under `tests/samples`:
//! - `Dispatcher`: generics, exception handlers, switches, lambdas and field access
//! - `Point`: a record with an `ObjectMethods` bootstrap

extern crate classref;

use classref::{index, index_with_config, ClassFile, IndexConfig, UsageEdge, UsageIndex};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::{fs, hint::black_box, path::PathBuf};

fn load(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/samples")
        .join(format!("{name}.class"));
    fs::read(&path).expect("Failed to read sample class")
}

/// Decoding alone: constant pool, members, attributes and instruction streams.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for name in ["Dispatcher", "Point"] {
        let data = load(name);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let class = ClassFile::from_mem(black_box(&data)).unwrap();
                black_box(class)
            });
        });
    }
    group.finish();
}

/// Full extraction into a typed edge list.
fn bench_index_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_edges");
    for name in ["Dispatcher", "Point"] {
        let data = load(name);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut edges: Vec<UsageEdge> = Vec::new();
                index(black_box(&data), &mut edges).unwrap();
                black_box(edges)
            });
        });
    }
    group.finish();
}

/// Extraction into the shared index, comparing the full scan against method bodies only.
fn bench_index_shared(c: &mut Criterion) {
    let data = load("Dispatcher");

    let mut group = c.benchmark_group("index_shared");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("full", |b| {
        let usages = UsageIndex::new();
        b.iter(|| {
            index(black_box(&data), &mut &usages).unwrap();
        });
    });
    group.bench_function("bytecode_only", |b| {
        let usages = UsageIndex::new();
        let config = IndexConfig::bytecode_only();
        b.iter(|| {
            index_with_config(black_box(&data), &mut &usages, &config).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_decode, bench_index_edges, bench_index_shared);
criterion_main!(benches);
