// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use thicket_benches::two_blobs;
use thicket_dualtree::SpatialTree;
use thicket_nbc::{NbcStat, NbcTree};

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");
    for &dim in &[2usize, 5] {
        for &n in &[1_000usize, 10_000, 50_000] {
            let points = two_blobs(7, n, dim, 1.0);
            group.throughput(Throughput::Elements(n as u64));
            group.bench_function(format!("d{dim}_n{n}"), |b| {
                b.iter_batched(
                    || points.clone(),
                    |pts| {
                        let tree: NbcTree = SpatialTree::build(pts, 32).unwrap();
                        black_box(tree.node_count())
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_leaf_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build_leaf_size");
    let points = two_blobs(8, 20_000, 3, 1.0);
    group.throughput(Throughput::Elements(points.len() as u64));
    for &leaf in &[4usize, 16, 64] {
        group.bench_function(format!("leaf{leaf}"), |b| {
            b.iter_batched(
                || points.clone(),
                |pts| {
                    let tree = SpatialTree::<_, NbcStat>::build(pts, leaf).unwrap();
                    black_box(tree.node_count())
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_leaf_size);
criterion_main!(benches);
