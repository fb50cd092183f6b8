// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use thicket_benches::two_blobs;
use thicket_nbc::{Classifier, NbcConfig, classify_exhaustive, run_traversal};

fn config() -> NbcConfig {
    NbcConfig::default()
        .with_bandwidths(0.25, 0.25)
        .with_leaf_size(32)
}

fn bench_dual_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_dual_tree");
    group.sample_size(20);
    let classifier = Classifier::new(config()).unwrap();
    for &n in &[2_000usize, 10_000, 40_000] {
        let tree = classifier.build_tree(two_blobs(11, n, 2, 1.5)).unwrap();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("mono_n{n}"), |b| {
            b.iter(|| {
                let out = run_traversal(&tree, &tree, classifier.config()).unwrap();
                black_box(out.tally)
            })
        });
    }
    group.finish();
}

fn bench_against_exhaustive(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_vs_exhaustive");
    group.sample_size(10);
    let classifier = Classifier::new(config()).unwrap();
    for &n in &[1_000usize, 4_000] {
        let points = two_blobs(12, n, 2, 1.5);
        let tree = classifier.build_tree(points.clone()).unwrap();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("dual_tree_n{n}"), |b| {
            b.iter(|| black_box(run_traversal(&tree, &tree, classifier.config()).unwrap().tally))
        });
        group.bench_function(format!("exhaustive_n{n}"), |b| {
            b.iter(|| black_box(classify_exhaustive(&points, &points, classifier.config()).unwrap().1))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_dual_tree, bench_against_exhaustive);
criterion_main!(benches);
