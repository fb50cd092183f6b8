// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classify synthetic clusters.
//!
//! Draws two overlapping blobs, one per class, classifies every point against
//! the whole set, and prints the tally next to the traversal's work counters.
//! With `--check` the labels are compared with an exhaustive run.
//!
//! Set `RUST_LOG=thicket_nbc=debug` to see the derived constants.
//!
//! Run:
//! - `cargo run -p thicket_demos --example classify_clusters -- --points 5000 --gap 1.5`

use anyhow::{Result, ensure};
use argh::FromArgs;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thicket_nbc::{Class, Classifier, NbcConfig, NbcPoint, classify_exhaustive};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Two-blob classification demo.
#[derive(FromArgs)]
struct Args {
    /// number of points
    #[argh(option, default = "2000")]
    points: usize,
    /// dimension
    #[argh(option, default = "2")]
    dim: usize,
    /// distance between blob centers along the first axis
    #[argh(option, default = "1.0")]
    gap: f64,
    /// positive-class bandwidth
    #[argh(option, default = "0.3")]
    bandwidth_pos: f64,
    /// negative-class bandwidth
    #[argh(option, default = "0.3")]
    bandwidth_neg: f64,
    /// posterior threshold
    #[argh(option, default = "0.5")]
    threshold: f64,
    /// relative tolerance around the threshold
    #[argh(option, default = "1e-3")]
    tolerance: f64,
    /// maximum points per tree leaf
    #[argh(option, default = "32")]
    leaf_size: usize,
    /// random seed
    #[argh(option, default = "7")]
    seed: u64,
    /// compare against exhaustive classification
    #[argh(switch)]
    check: bool,
    /// print the configuration and tally as JSON
    #[argh(switch)]
    json: bool,
}

fn blobs(rng: &mut ChaCha8Rng, n: usize, dim: usize, gap: f64) -> Vec<NbcPoint> {
    (0..n)
        .map(|i| {
            let class = if i % 2 == 0 {
                Class::Positive
            } else {
                Class::Negative
            };
            let mut coords: Vec<f64> = (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect();
            if class == Class::Negative {
                coords[0] += gap;
            }
            NbcPoint::new(coords, class, 0.5)
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args: Args = argh::from_env();
    ensure!(args.dim > 0, "--dim must be positive");

    let config = NbcConfig::default()
        .with_bandwidths(args.bandwidth_pos, args.bandwidth_neg)
        .with_threshold(args.threshold)
        .with_tolerance(args.tolerance)
        .with_leaf_size(args.leaf_size);
    let classifier = Classifier::new(config)?;

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let points = blobs(&mut rng, args.points, args.dim, args.gap);
    let truth: Vec<Class> = points.iter().map(|p| p.class).collect();

    let out = classifier.classify_monochromatic(points.clone())?;
    info!(points = args.points, dim = args.dim, "classified");

    if args.json {
        let report = serde_json::json!({
            "config": classifier.config(),
            "tally": out.tally,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", out.tally);
        println!("{:#?}", out.stats);
    }

    let agree = out
        .results
        .iter()
        .zip(&truth)
        .filter(|(r, class)| r.label() == Some(**class))
        .count();
    println!("agree with generating class: {agree}/{}", truth.len());

    if args.check {
        let (exact, _) = classify_exhaustive(&points, &points, classifier.config())?;
        let mismatches = exact
            .iter()
            .zip(&out.labels)
            .filter(|(e, l)| e.labels != **l)
            .count();
        ensure!(mismatches == 0, "{mismatches} labels differ from the exhaustive run");
        println!("labels match the exhaustive run");
    }
    Ok(())
}
