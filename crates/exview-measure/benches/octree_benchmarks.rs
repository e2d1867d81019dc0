//! Octree Benchmarks
//!
//! Build and radius-query cost of the vertex octree

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use exview_measure::{Octree, OctreeEntry};
use glam::Vec3;

/// Deterministic pseudo-random points in the unit cube
fn points(count: usize) -> Vec<OctreeEntry<usize>> {
    let mut state = 0x9e37_79b9_u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f32 / u32::MAX as f32
    };
    (0..count)
        .map(|i| OctreeEntry {
            position: Vec3::new(next(), next(), next()),
            data: i,
        })
        .collect()
}

fn bench_octree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_build");

    for count in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || points(count),
                |entries| black_box(Octree::from_entries(entries, 0.01, 8, 8)),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_octree_find_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_find_nearest");
    let tree = Octree::from_entries(points(100_000), 0.01, 8, 8);

    for radius in [0.01_f32, 0.05, 0.2].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(radius), radius, |b, &radius| {
            b.iter(|| black_box(tree.find_nearest(black_box(Vec3::splat(0.5)), radius).len()));
        });
    }

    group.finish();
}

fn bench_brute_force_baseline(c: &mut Criterion) {
    let entries = points(100_000);

    c.bench_function("brute_force_radius_0.05", |b| {
        b.iter(|| {
            let center = black_box(Vec3::splat(0.5));
            entries
                .iter()
                .filter(|e| e.position.distance(center) <= 0.05)
                .count()
        });
    });
}

criterion_group!(benches, bench_octree_build, bench_octree_find_nearest, bench_brute_force_baseline);
criterion_main!(benches);
