// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interval and hyper-rectangle bounds.
//!
//! [`Range`] is a closed interval `[lo, hi]` used both for coordinates and for
//! bounded quantities (densities, priors). [`HRect`] is an axis-aligned box in
//! any dimension, stored as one [`Range`] per dimension, with the distance
//! helpers pair pruning needs.
//!
//! Floats are assumed finite. An empty range is represented as
//! `[+inf, -inf]` so that growing it by a value or a range works without a
//! special case.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Add, AddAssign};

/// Closed interval `[lo, hi]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Range {
    /// Lower end.
    pub lo: f64,
    /// Upper end.
    pub hi: f64,
}

impl Range {
    /// The empty set, identity for [`Range::union`].
    pub const EMPTY: Self = Self {
        lo: f64::INFINITY,
        hi: f64::NEG_INFINITY,
    };

    /// The zero interval `[0, 0]`, identity for addition.
    pub const ZERO: Self = Self { lo: 0.0, hi: 0.0 };

    /// Create a range from its ends.
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Degenerate range holding a single value.
    pub const fn point(v: f64) -> Self {
        Self { lo: v, hi: v }
    }

    /// True if no value lies in the range.
    pub fn is_empty(&self) -> bool {
        self.hi < self.lo
    }

    /// Whether `v` lies in the range (ends included).
    pub fn contains(&self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }

    /// Width `hi - lo`, or zero for an empty range.
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.hi - self.lo
        }
    }

    /// Midpoint of the range.
    pub fn mid(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    /// Grow the range to include `v`.
    pub fn expand(&mut self, v: f64) {
        self.lo = self.lo.min(v);
        self.hi = self.hi.max(v);
    }

    /// Smallest range containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    /// Multiply both ends by a non-negative factor.
    #[must_use]
    pub fn scale(&self, k: f64) -> Self {
        debug_assert!(k >= 0.0, "scaling a range by a negative factor flips it");
        Self {
            lo: self.lo * k,
            hi: self.hi * k,
        }
    }

    /// Distance from `v` to the nearest point of the range.
    fn min_gap(&self, v: f64) -> f64 {
        if v < self.lo {
            self.lo - v
        } else if v > self.hi {
            v - self.hi
        } else {
            0.0
        }
    }

    /// Distance from `v` to the farthest end of the range.
    fn max_gap(&self, v: f64) -> f64 {
        (v - self.lo).max(self.hi - v)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Range {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            lo: self.lo + rhs.lo,
            hi: self.hi + rhs.hi,
        }
    }
}

impl AddAssign for Range {
    fn add_assign(&mut self, rhs: Self) {
        self.lo += rhs.lo;
        self.hi += rhs.hi;
    }
}

impl AddAssign<f64> for Range {
    fn add_assign(&mut self, rhs: f64) {
        self.lo += rhs;
        self.hi += rhs;
    }
}

/// Axis-aligned hyper-rectangle, one [`Range`] per dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct HRect {
    ranges: Vec<Range>,
}

impl HRect {
    /// An empty box in `dim` dimensions.
    pub fn empty(dim: usize) -> Self {
        Self {
            ranges: vec![Range::EMPTY; dim],
        }
    }

    /// Smallest box around a point.
    pub fn from_point(coords: &[f64]) -> Self {
        Self {
            ranges: coords.iter().map(|&c| Range::point(c)).collect(),
        }
    }

    /// Number of dimensions.
    pub fn dim(&self) -> usize {
        self.ranges.len()
    }

    /// Per-dimension ranges.
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// True if the box contains no point (never grown).
    pub fn is_empty(&self) -> bool {
        self.ranges.iter().any(Range::is_empty)
    }

    /// Grow the box to include a point.
    pub fn expand_point(&mut self, coords: &[f64]) {
        debug_assert_eq!(coords.len(), self.dim(), "dimension mismatch");
        for (r, &c) in self.ranges.iter_mut().zip(coords) {
            r.expand(c);
        }
    }

    /// Grow the box to include another box.
    pub fn expand_rect(&mut self, other: &Self) {
        debug_assert_eq!(other.dim(), self.dim(), "dimension mismatch");
        for (r, o) in self.ranges.iter_mut().zip(&other.ranges) {
            *r = r.union(o);
        }
    }

    /// Whether the box contains the point (faces included).
    pub fn contains_point(&self, coords: &[f64]) -> bool {
        self.ranges.iter().zip(coords).all(|(r, &c)| r.contains(c))
    }

    /// Whether every point of `other` lies inside this box.
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.ranges
            .iter()
            .zip(&other.ranges)
            .all(|(r, o)| o.is_empty() || (r.lo <= o.lo && o.hi <= r.hi))
    }

    /// Dimension of largest extent and that extent. Ties go to the lowest
    /// dimension.
    pub fn widest_dim(&self) -> (usize, f64) {
        let mut best = (0, 0.0);
        for (d, r) in self.ranges.iter().enumerate() {
            let w = r.width();
            if w > best.1 {
                best = (d, w);
            }
        }
        best
    }

    /// Minimum squared distance from the box to a point.
    pub fn min_distance_sq_point(&self, coords: &[f64]) -> f64 {
        self.ranges
            .iter()
            .zip(coords)
            .map(|(r, &c)| {
                let g = r.min_gap(c);
                g * g
            })
            .sum()
    }

    /// Maximum squared distance from the box to a point.
    pub fn max_distance_sq_point(&self, coords: &[f64]) -> f64 {
        self.ranges
            .iter()
            .zip(coords)
            .map(|(r, &c)| {
                let g = r.max_gap(c);
                g * g
            })
            .sum()
    }

    /// Minimum squared distance between any point of this box and any point of
    /// `other`.
    pub fn min_distance_sq(&self, other: &Self) -> f64 {
        self.ranges
            .iter()
            .zip(&other.ranges)
            .map(|(a, b)| {
                let g = (b.lo - a.hi).max(a.lo - b.hi).max(0.0);
                g * g
            })
            .sum()
    }

    /// Maximum squared distance between any point of this box and any point of
    /// `other`.
    pub fn max_distance_sq(&self, other: &Self) -> f64 {
        self.ranges
            .iter()
            .zip(&other.ranges)
            .map(|(a, b)| {
                let g = (b.hi - a.lo).max(a.hi - b.lo);
                g * g
            })
            .sum()
    }

    /// Minimum squared distance from this box to the midpoint of `other`.
    ///
    /// Used as the traversal ordering key.
    pub fn min_to_mid_sq(&self, other: &Self) -> f64 {
        self.ranges
            .iter()
            .zip(&other.ranges)
            .map(|(a, b)| {
                let g = a.min_gap(b.mid());
                g * g
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(ranges: &[(f64, f64)]) -> HRect {
        let mut r = HRect::empty(ranges.len());
        r.expand_point(&ranges.iter().map(|r| r.0).collect::<Vec<_>>());
        r.expand_point(&ranges.iter().map(|r| r.1).collect::<Vec<_>>());
        r
    }

    #[test]
    fn empty_range_grows_to_point() {
        let mut r = Range::EMPTY;
        assert!(r.is_empty());
        assert_eq!(r.width(), 0.0);
        r.expand(3.0);
        assert_eq!(r, Range::point(3.0));
        r.expand(-1.0);
        assert_eq!(r, Range::new(-1.0, 3.0));
        assert_eq!(Range::EMPTY.union(&r), r);
    }

    #[test]
    fn range_arithmetic() {
        let mut a = Range::new(1.0, 2.0);
        a += Range::new(0.5, 4.0);
        assert_eq!(a, Range::new(1.5, 6.0));
        a += 1.0;
        assert_eq!(a, Range::new(2.5, 7.0));
        assert_eq!(a.scale(2.0), Range::new(5.0, 14.0));
    }

    #[test]
    fn rect_distances() {
        let a = rect(&[(0.0, 1.0), (0.0, 1.0)]);
        let b = rect(&[(3.0, 4.0), (0.0, 1.0)]);
        assert_eq!(a.min_distance_sq(&b), 4.0);
        assert_eq!(a.max_distance_sq(&b), 16.0 + 1.0);
        assert_eq!(b.min_distance_sq(&a), 4.0);
        // Overlapping boxes touch.
        let c = rect(&[(0.5, 2.0), (0.5, 2.0)]);
        assert_eq!(a.min_distance_sq(&c), 0.0);
        // Midpoint of b is (3.5, 0.5); a reaches x = 1.
        assert_eq!(a.min_to_mid_sq(&b), 2.5 * 2.5);
    }

    #[test]
    fn rect_point_distances() {
        let a = rect(&[(0.0, 2.0), (0.0, 2.0)]);
        assert_eq!(a.min_distance_sq_point(&[1.0, 1.0]), 0.0);
        assert_eq!(a.min_distance_sq_point(&[3.0, 1.0]), 1.0);
        assert_eq!(a.max_distance_sq_point(&[1.0, 1.0]), 2.0);
        assert_eq!(a.max_distance_sq_point(&[3.0, 0.0]), 9.0 + 4.0);
        assert!(a.contains_point(&[2.0, 0.0]));
        assert!(!a.contains_point(&[2.1, 0.0]));
    }

    #[test]
    fn widest_dim_prefers_lowest_on_ties() {
        let a = rect(&[(0.0, 1.0), (0.0, 3.0), (0.0, 3.0)]);
        assert_eq!(a.widest_dim(), (1, 3.0));
        let flat = HRect::from_point(&[1.0, 2.0]);
        assert_eq!(flat.widest_dim(), (0, 0.0));
    }

    #[test]
    fn contains_rect_ignores_empty_inner() {
        let a = rect(&[(0.0, 4.0), (0.0, 4.0)]);
        let b = rect(&[(1.0, 2.0), (1.0, 3.0)]);
        assert!(a.contains_rect(&b));
        assert!(!b.contains_rect(&a));
        assert!(a.contains_rect(&HRect::empty(2)));
    }
}
