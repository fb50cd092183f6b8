// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end properties of the classifier.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thicket_dualtree::{DualTreeProblem, Postponed, Range, SpatialTree, Statistic, push_down};
use thicket_nbc::{
    Class, Classifier, Labels, MomentInfo, Nbc, NbcConfig, NbcParam, NbcPoint,
    NbcPostponed, NbcStat, NbcTree, classify_exhaustive, run_traversal,
};

const SLACK: f64 = 1e-9;

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= SLACK * (1.0 + a.abs().max(b.abs()))
}

fn contains(r: Range, v: f64) -> bool {
    r.lo - SLACK * (1.0 + r.lo.abs()) <= v && v <= r.hi + SLACK * (1.0 + r.hi.abs())
}

/// Two overlapping clusters, one per class, with random priors.
fn clusters(rng: &mut ChaCha8Rng, n: usize, dim: usize, gap: f64) -> Vec<NbcPoint> {
    (0..n)
        .map(|i| {
            let class = if i % 2 == 0 {
                Class::Positive
            } else {
                Class::Negative
            };
            let shift = if class == Class::Positive { 0.0 } else { gap };
            let coords = (0..dim)
                .map(|d| {
                    let c = rng.random_range(-1.5..1.5);
                    if d == 0 { c + shift } else { c }
                })
                .collect();
            NbcPoint::new(coords, class, rng.random_range(0.2..0.8))
        })
        .collect()
}

fn tree(points: Vec<NbcPoint>, leaf_size: usize) -> NbcTree {
    SpatialTree::build(points, leaf_size).unwrap()
}

fn brute_sum(q: &[f64], points: &[NbcPoint], class: Class, h: f64) -> f64 {
    let kernel = thicket_nbc::Epanechnikov::new(h);
    points
        .iter()
        .filter(|p| p.class == class)
        .map(|p| {
            let d: f64 = q.iter().zip(&p.coords).map(|(a, b)| (a - b) * (a - b)).sum();
            kernel.eval_unnorm_on_sq(d)
        })
        .sum()
}

#[test]
fn node_bounds_contain_brute_force_sums() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let h = 0.9;
    let kernel = thicket_nbc::Epanechnikov::new(h);
    let reference = tree(clusters(&mut rng, 120, 2, 1.0), 8);
    let query = tree(clusters(&mut rng, 60, 2, 1.0), 8);

    for q in query.nodes() {
        for r in reference.nodes() {
            for class in Class::ALL {
                let bound = r.stat().contribution_bound(class, &kernel, q.bound());
                let moments = &r.stat().class(class).moments;
                let closed = (!moments.is_empty())
                    .then(|| moments.kernel_sum_range(&kernel, q.bound()).unwrap());
                for p in q.points() {
                    let exact = brute_sum(&p.coords, r.points(), class, h);
                    assert!(contains(bound, exact), "{bound:?} misses {exact}");
                    if let Some(range) = closed {
                        let v = moments.kernel_sum(&kernel, &p.coords).unwrap();
                        assert!(contains(range, v), "{range:?} misses {v}");
                    }
                }
            }
        }
    }
}

#[test]
fn summaries_combine_like_the_whole_set() {
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let points = clusters(&mut rng, 200, 3, 0.5);
    let fold = |pts: &[NbcPoint]| {
        let mut s = NbcStat::empty(3);
        for p in pts {
            s.accumulate_point(p);
        }
        s
    };
    let whole = fold(&points);
    for split in [1, 57, 199] {
        let mut combined = fold(&points[split..]);
        combined.accumulate(&fold(&points[..split]));
        assert_eq!(combined.pi_pos(), whole.pi_pos());
        assert_eq!(combined.pi_neg(), whole.pi_neg());
        for class in Class::ALL {
            let (a, b) = (combined.class(class), whole.class(class));
            assert_eq!(a.bound, b.bound);
            assert_eq!(a.moments.count(), b.moments.count());
            assert!(near(a.moments.scatter(), b.moments.scatter()));
            for (x, y) in a.moments.mean().iter().zip(b.moments.mean()) {
                assert!(near(*x, *y));
            }
        }
    }
    // The tree computes the same root summary bottom-up.
    let t = tree(points, 4);
    let root = t.node(t.root()).stat();
    assert_eq!(root.count(Class::Positive), whole.count(Class::Positive));
    assert_eq!(root.class(Class::Negative).bound, whole.class(Class::Negative).bound);
}

#[test]
fn pushed_down_corrections_apply_like_direct_sums() {
    let h = 50.0;
    let config = NbcConfig::default().with_bandwidths(h, h);
    let nbc = Nbc::new(NbcParam::new(&config, 2, 1, 1).unwrap());
    let a = [[0.0, 1.0], [2.0, -1.0], [0.5, 0.5]];
    let b = [[3.0, 3.0], [-1.0, 2.0]];

    let mut parent = nbc.empty_postponed();
    for p in &a {
        parent.moments.positive.add_point(p);
    }
    let mut left = nbc.empty_postponed();
    let mut right = nbc.empty_postponed();
    for p in &b {
        right.moments.positive.add_point(p);
    }
    push_down(&mut parent, &mut left, &mut right).unwrap();
    assert!(parent.moments.positive.is_empty());

    // One more level below the right child.
    let mut grandchild = nbc.empty_postponed();
    let mut sibling = nbc.empty_postponed();
    push_down(&mut right, &mut grandchild, &mut sibling).unwrap();

    let q = NbcPoint::query(vec![0.3, 0.2], 0.5);
    let got = nbc.start_point(&q, &grandchild).unwrap();
    let all: Vec<NbcPoint> = a
        .iter()
        .chain(&b)
        .map(|c| NbcPoint::reference(c.to_vec(), Class::Positive))
        .collect();
    let direct = brute_sum(&q.coords, &all, Class::Positive, h);
    assert!(near(got.density.positive.lo, direct));
    assert_eq!(got.density.positive.lo, got.density.positive.hi);
    assert_eq!(got.density.negative, Range::ZERO);

    let left_only = nbc.start_point(&q, &left).unwrap();
    let direct_a = brute_sum(&q.coords, &all[..3], Class::Positive, h);
    assert!(near(left_only.density.positive.lo, direct_a));

    // Merging is the same as adding moments one by one.
    let mut merged = NbcPostponed::empty(2);
    merged.merge(&left).unwrap();
    let mut m = MomentInfo::empty(2);
    for p in &a {
        m.add_point(p);
    }
    assert_eq!(merged.moments.positive.count(), m.count());
}

fn check_against_exhaustive(query: &[NbcPoint], reference: &[NbcPoint], config: &NbcConfig) {
    check_against_exhaustive_within(query, reference, config, 0.0);
}

/// Like [`check_against_exhaustive`], with `slack` of absolute leeway on the
/// density intervals.
fn check_against_exhaustive_within(
    query: &[NbcPoint],
    reference: &[NbcPoint],
    config: &NbcConfig,
    slack: f64,
) {
    let (expected, expected_tally) = classify_exhaustive(query, reference, config).unwrap();
    let out = run_traversal(
        &tree(query.to_vec(), config.leaf_size),
        &tree(reference.to_vec(), config.leaf_size),
        config,
    )
    .unwrap();

    assert_eq!(out.results.len(), expected.len());
    for (i, (got, want)) in out.results.iter().zip(&expected).enumerate() {
        assert_eq!(got.labels, want.labels, "query {i}: {got:?} vs {want:?}");
        for class in Class::ALL {
            assert!(
                contains(
                    Range::new(got.density[class].lo - slack, got.density[class].hi + slack),
                    want.density[class].lo
                ),
                "query {i} {class}: {:?} misses {}",
                got.density[class],
                want.density[class].lo
            );
        }
    }
    assert_eq!(out.tally, expected_tally);
    assert_eq!(out.labels.len(), query.len());
}

#[test]
fn labels_match_exhaustive_bichromatic() {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    for (dim, gap, h_pos, h_neg, t) in [
        (2, 1.0, 0.5, 0.5, 0.5),
        (2, 2.0, 0.8, 0.4, 0.3),
        (3, 0.5, 1.0, 1.2, 0.6),
        (1, 1.5, 0.3, 0.6, 0.5),
    ] {
        let reference = clusters(&mut rng, 400, dim, gap);
        let query = clusters(&mut rng, 150, dim, gap);
        let config = NbcConfig::default()
            .with_bandwidths(h_pos, h_neg)
            .with_threshold(t)
            .with_leaf_size(8);
        check_against_exhaustive(&query, &reference, &config);
    }
}

#[test]
fn labels_match_exhaustive_far_from_origin() {
    let mut rng = ChaCha8Rng::seed_from_u64(16);
    let config = NbcConfig::default()
        .with_bandwidths(0.5, 0.5)
        .with_leaf_size(8);
    for offset in [1e6, 1e7, 1e8] {
        let shift = |points: Vec<NbcPoint>| -> Vec<NbcPoint> {
            points
                .into_iter()
                .map(|mut p| {
                    for c in &mut p.coords {
                        *c += offset;
                    }
                    p
                })
                .collect()
        };
        let reference = shift(clusters(&mut rng, 400, 2, 1.0));
        let query = shift(clusters(&mut rng, 150, 2, 1.0));
        check_against_exhaustive_within(&query, &reference, &config, 1e-4);
    }
}

#[test]
fn labels_match_exhaustive_monochromatic() {
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let points = clusters(&mut rng, 600, 2, 2.5);
    let config = NbcConfig::default()
        .with_bandwidths(0.6, 0.6)
        .with_leaf_size(16);
    check_against_exhaustive(&points, &points, &config);

    let c = Classifier::new(config).unwrap();
    let out = c.classify_monochromatic(points).unwrap();
    let s = out.stats;
    assert!(s.exclusions > 0, "{s:?}");
    assert!(s.settled_points + s.short_circuits > 0, "{s:?}");
    assert!(out.tally.positive > 0 && out.tally.negative > 0);
}

#[test]
fn rerun_is_identical() {
    let mut rng = ChaCha8Rng::seed_from_u64(15);
    let points = clusters(&mut rng, 300, 2, 1.0);
    let c = Classifier::new(NbcConfig::default().with_bandwidths(0.7, 0.7).with_leaf_size(6))
        .unwrap();
    let a = c.classify_monochromatic(points.clone()).unwrap();
    let b = c.classify_monochromatic(points).unwrap();
    assert_eq!(a.labels, b.labels);
    assert_eq!(a.results, b.results);
    assert_eq!(a.tally, b.tally);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn wide_kernels_include_everything_without_leaf_work() {
    let reference = vec![
        NbcPoint::reference(vec![0.0, 0.0], Class::Positive),
        NbcPoint::reference(vec![1.0, 0.0], Class::Positive),
        NbcPoint::reference(vec![0.0, 1.0], Class::Positive),
        NbcPoint::reference(vec![4.0, 4.0], Class::Negative),
        NbcPoint::reference(vec![5.0, 4.0], Class::Negative),
        NbcPoint::reference(vec![4.0, 5.0], Class::Negative),
    ];
    let query = vec![
        NbcPoint::query(vec![0.5, 0.5], 0.5),
        NbcPoint::query(vec![4.5, 4.5], 0.5),
        NbcPoint::query(vec![2.5, 2.5], 0.5),
        NbcPoint::query(vec![-1.0, 3.0], 0.9),
    ];
    let h = 20.0;
    let config = NbcConfig::default().with_bandwidths(h, h);
    let out = Classifier::new(config.clone())
        .unwrap()
        .classify(query.clone(), reference.clone())
        .unwrap();

    assert_eq!(out.stats.leaf_visits, 0);
    assert_eq!(out.stats.inclusions, 1);
    assert_eq!(out.stats.exclusions, 0);
    for (q, r) in query.iter().zip(&out.results) {
        for class in Class::ALL {
            let direct = brute_sum(&q.coords, &reference, class, h);
            assert!(near(r.density[class].lo, direct));
            assert!(near(r.density[class].hi, direct));
        }
    }
    assert_eq!(out.results[0].label(), Some(Class::Positive));
    assert_eq!(out.results[1].label(), Some(Class::Negative));
    let (expected, _) = classify_exhaustive(&query, &reference, &config).unwrap();
    let want: Vec<Labels> = expected.iter().map(|r| r.labels).collect();
    assert_eq!(out.labels, want);
}

#[test]
fn equidistant_query_stays_undecided() {
    let reference = vec![
        NbcPoint::reference(vec![-2.0, 0.0], Class::Positive),
        NbcPoint::reference(vec![-2.0, 1.0], Class::Positive),
        NbcPoint::reference(vec![-2.0, -1.0], Class::Positive),
        NbcPoint::reference(vec![2.0, 0.0], Class::Negative),
        NbcPoint::reference(vec![2.0, 1.0], Class::Negative),
        NbcPoint::reference(vec![2.0, -1.0], Class::Negative),
    ];
    let query = vec![NbcPoint::query(vec![0.0, 0.0], 0.5)];
    for leaf_size in [1, 2, 32] {
        let config = NbcConfig::default()
            .with_bandwidths(3.0, 3.0)
            .with_leaf_size(leaf_size);
        let out = Classifier::new(config)
            .unwrap()
            .classify(query.clone(), reference.clone())
            .unwrap();
        assert_eq!(out.labels, vec![Labels::EITHER]);
        assert_eq!(out.tally.undecided, 1);
        let d = &out.results[0].density;
        assert!(near(d.positive.lo, d.negative.lo));
    }
}
