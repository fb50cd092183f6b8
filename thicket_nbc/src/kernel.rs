// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Epanechnikov kernel.
//!
//! Densities are accumulated unnormalized, `K(d²) = max(0, 1 - d²/h²)`, and
//! the normalization constant is folded into the decision constants once per
//! run (see [`NbcParam`](crate::NbcParam)).

use core::f64::consts::PI;

/// Epanechnikov kernel with a fixed bandwidth `h`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Epanechnikov {
    bandwidth: f64,
    bandwidth_sq: f64,
    inv_bandwidth_sq: f64,
}

impl Epanechnikov {
    /// Kernel with bandwidth `h`. The caller guarantees `h` is finite and
    /// positive.
    pub fn new(bandwidth: f64) -> Self {
        debug_assert!(bandwidth > 0.0, "bandwidth must be positive");
        let bandwidth_sq = bandwidth * bandwidth;
        Self {
            bandwidth,
            bandwidth_sq,
            inv_bandwidth_sq: 1.0 / bandwidth_sq,
        }
    }

    /// `h`.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// `h²`; the kernel vanishes at and beyond this squared distance.
    pub fn bandwidth_sq(&self) -> f64 {
        self.bandwidth_sq
    }

    /// `1 / h²`.
    pub fn inv_bandwidth_sq(&self) -> f64 {
        self.inv_bandwidth_sq
    }

    /// Unnormalized kernel value at squared distance `dist_sq`.
    ///
    /// Non-increasing in `dist_sq`, which is what makes box-distance bounds
    /// on kernel sums sound.
    #[inline]
    pub fn eval_unnorm_on_sq(&self, dist_sq: f64) -> f64 {
        if dist_sq < self.bandwidth_sq {
            1.0 - dist_sq * self.inv_bandwidth_sq
        } else {
            0.0
        }
    }

    /// Integral of the unnormalized kernel over `dim`-dimensional space:
    /// `2 · V_d · h^d / (d + 2)`.
    pub fn norm_constant(&self, dim: usize) -> f64 {
        let mut h_pow = 1.0;
        for _ in 0..dim {
            h_pow *= self.bandwidth;
        }
        2.0 * unit_ball_volume(dim) * h_pow / (dim as f64 + 2.0)
    }
}

/// Volume of the unit ball in `dim` dimensions.
///
/// Uses `V_d = V_{d-2} · 2π / d` from `V_0 = 1` and `V_1 = 2`.
pub fn unit_ball_volume(dim: usize) -> f64 {
    let (mut v, mut d) = if dim % 2 == 0 { (1.0, 0) } else { (2.0, 1) };
    while d < dim {
        d += 2;
        v *= 2.0 * PI / d as f64;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        let d = a - b;
        -1e-12 < d && d < 1e-12
    }

    #[test]
    fn unit_ball_volumes() {
        assert!(close(unit_ball_volume(0), 1.0));
        assert!(close(unit_ball_volume(1), 2.0));
        assert!(close(unit_ball_volume(2), PI));
        assert!(close(unit_ball_volume(3), 4.0 * PI / 3.0));
        assert!(close(unit_ball_volume(4), PI * PI / 2.0));
    }

    #[test]
    fn support_ends_at_the_bandwidth() {
        let k = Epanechnikov::new(2.0);
        assert_eq!(k.bandwidth_sq(), 4.0);
        assert_eq!(k.eval_unnorm_on_sq(0.0), 1.0);
        assert!(close(k.eval_unnorm_on_sq(1.0), 0.75));
        assert_eq!(k.eval_unnorm_on_sq(4.0), 0.0);
        assert_eq!(k.eval_unnorm_on_sq(9.0), 0.0);
    }

    #[test]
    fn norm_constant_matches_direct_integration() {
        // In 1D: integral of 1 - x²/h² over [-h, h] is 4h/3.
        let k = Epanechnikov::new(1.5);
        assert!(close(k.norm_constant(1), 4.0 * 1.5 / 3.0));
        // In 2D: π h² / 2.
        assert!(close(k.norm_constant(2), PI * 1.5 * 1.5 / 2.0));
    }
}
