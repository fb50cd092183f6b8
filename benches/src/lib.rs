// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared input generators for the Thicket benchmarks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thicket_nbc::{Class, NbcPoint};

/// `n` points in `dim` dimensions: two unit-width blobs, one per class,
/// whose centers are `gap` apart along the first axis.
pub fn two_blobs(seed: u64, n: usize, dim: usize, gap: f64) -> Vec<NbcPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let class = if i % 2 == 0 {
                Class::Positive
            } else {
                Class::Negative
            };
            let offset = match class {
                Class::Positive => 0.0,
                Class::Negative => gap,
            };
            let mut coords: Vec<f64> = (0..dim).map(|_| rng.random_range(-1.0..1.0)).collect();
            coords[0] += offset;
            NbcPoint::new(coords, class, rng.random_range(0.3..0.7))
        })
        .collect()
}
