// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classify points read from a text file.
//!
//! Each non-empty line holds one point: its coordinates, then a class flag
//! (nonzero is positive), then the point's positive-class prior. Fields are
//! separated by commas or whitespace; lines starting with `#` are skipped.
//!
//! Without `--query` every reference point is classified against the whole
//! reference set. With it, the query file uses the same layout and its class
//! column is ignored.
//!
//! Run:
//! - `cargo run -p thicket_demos --example classify_file -- data.csv --bandwidth-pos 0.2 --bandwidth-neg 0.2`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use argh::FromArgs;
use thicket_nbc::{Class, Classifier, NbcConfig, NbcPoint};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// File-driven classification demo.
#[derive(FromArgs)]
struct Args {
    /// reference points
    #[argh(positional)]
    reference: PathBuf,
    /// query points; defaults to the reference set
    #[argh(option)]
    query: Option<PathBuf>,
    /// positive-class bandwidth
    #[argh(option)]
    bandwidth_pos: f64,
    /// negative-class bandwidth
    #[argh(option)]
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
    /// print one label per query point (`1`, `0` or `?`)
    #[argh(switch)]
    labels: bool,
}

fn parse_line(line: &str) -> Result<NbcPoint> {
    let fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty())
        .map(|f| f.parse::<f64>().with_context(|| format!("bad number `{f}`")))
        .collect::<Result<Vec<_>>>()?;
    let [coords @ .., flag, prior] = fields.as_slice() else {
        bail!("expected coordinates, a class flag and a prior");
    };
    if coords.is_empty() {
        bail!("no coordinates");
    }
    let class = if *flag != 0.0 {
        Class::Positive
    } else {
        Class::Negative
    };
    Ok(NbcPoint::new(coords.to_vec(), class, *prior))
}

fn read_points(path: &Path) -> Result<Vec<NbcPoint>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut points = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let point = parse_line(line).with_context(|| format!("{}:{}", path.display(), i + 1))?;
        points.push(point);
    }
    debug!(path = %path.display(), points = points.len(), "read points");
    Ok(points)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args: Args = argh::from_env();

    let config = NbcConfig::default()
        .with_bandwidths(args.bandwidth_pos, args.bandwidth_neg)
        .with_threshold(args.threshold)
        .with_tolerance(args.tolerance)
        .with_leaf_size(args.leaf_size);
    let classifier = Classifier::new(config)?;

    let reference = read_points(&args.reference)?;
    let out = match &args.query {
        Some(path) => classifier.classify(read_points(path)?, reference)?,
        None => classifier.classify_monochromatic(reference)?,
    };
    info!(
        leaf_visits = out.stats.leaf_visits,
        settled_points = out.stats.settled_points,
        "traversal finished"
    );

    if args.labels {
        for result in &out.results {
            let label = match result.label() {
                Some(Class::Positive) => "1",
                Some(Class::Negative) => "0",
                None => "?",
            };
            println!("{label}");
        }
    }
    println!("{}", out.tally);
    Ok(())
}
