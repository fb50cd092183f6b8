// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node statistics: moments for closed-form kernel sums, per-class boxes,
//! and prior ranges.

use alloc::vec;
use alloc::vec::Vec;

use thicket_dualtree::{DualTreeError, HRect, Range, Statistic};

use crate::kernel::Epanechnikov;
use crate::point::{ByClass, Class, NbcPoint};

/// Count, mean and scatter (sum of squared deviations from the mean) of a
/// point set.
///
/// For the Epanechnikov kernel these are enough to evaluate
/// `Σ_r K(|q - r|²)` exactly, as long as every `r` lies within the bandwidth
/// of `q`:
///
/// ```text
/// Σ_r (1 - |q - r|²/h²) = count - (count·|q - mean|² + scatter) / h²
/// ```
///
/// Moments are stored about the centroid, never as raw sums of squares.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentInfo {
    mean: Vec<f64>,
    scatter: f64,
    count: usize,
}

impl MomentInfo {
    /// Moments of no points.
    pub fn empty(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            scatter: 0.0,
            count: 0,
        }
    }

    /// Number of points.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Centroid; all zeros while empty.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Sum of squared distances to the centroid.
    pub fn scatter(&self) -> f64 {
        self.scatter
    }

    /// Whether no points were added.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add one point.
    pub fn add_point(&mut self, coords: &[f64]) {
        self.count += 1;
        let n = self.count as f64;
        let mut step = 0.0;
        for (m, &c) in self.mean.iter_mut().zip(coords) {
            let delta = c - *m;
            *m += delta / n;
            step += delta * (c - *m);
        }
        self.scatter += step;
    }

    /// Add another set's moments.
    pub fn add(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        let (na, nb) = (self.count as f64, other.count as f64);
        let n = na + nb;
        let mut gap_sq = 0.0;
        for (m, &o) in self.mean.iter_mut().zip(&other.mean) {
            let delta = o - *m;
            *m += delta * (nb / n);
            gap_sq += delta * delta;
        }
        self.scatter += other.scatter + gap_sq * (na * nb / n);
        self.count += other.count;
    }

    /// Back to no points.
    pub fn reset(&mut self) {
        self.mean.fill(0.0);
        self.scatter = 0.0;
        self.count = 0;
    }

    /// Exact unnormalized kernel sum at `q`.
    ///
    /// # Errors
    ///
    /// [`DualTreeError::NumericDegeneracy`] on empty moments.
    pub fn kernel_sum(&self, kernel: &Epanechnikov, q: &[f64]) -> Result<f64, DualTreeError> {
        self.require_points("exact kernel sum of an empty summary")?;
        Ok(self.sum_at(kernel, dist_sq(q, &self.mean)))
    }

    /// Range of [`kernel_sum`](Self::kernel_sum) over every `q` in `region`.
    ///
    /// The sum depends on `q` only through its squared distance to the
    /// centroid, so the extremes sit at the region's farthest and nearest
    /// points to it.
    ///
    /// # Errors
    ///
    /// [`DualTreeError::NumericDegeneracy`] on empty moments.
    pub fn kernel_sum_range(
        &self,
        kernel: &Epanechnikov,
        region: &HRect,
    ) -> Result<Range, DualTreeError> {
        self.require_points("kernel sum range of an empty summary")?;
        Ok(Range::new(
            self.sum_at(kernel, region.max_distance_sq_point(&self.mean)),
            self.sum_at(kernel, region.min_distance_sq_point(&self.mean)),
        ))
    }

    /// Closed form for a query at squared distance `to_mean_sq` from the
    /// centroid.
    fn sum_at(&self, kernel: &Epanechnikov, to_mean_sq: f64) -> f64 {
        let n = self.count as f64;
        n - (n * to_mean_sq + self.scatter) * kernel.inv_bandwidth_sq()
    }

    fn require_points(&self, reason: &'static str) -> Result<(), DualTreeError> {
        if self.count == 0 {
            Err(DualTreeError::NumericDegeneracy { reason })
        } else {
            Ok(())
        }
    }
}

pub(crate) fn dist_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Moments and bounding box of one class's points in a subtree.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassSummary {
    /// Moments of the class's points.
    pub moments: MomentInfo,
    /// Box around the class's points; empty when there are none.
    pub bound: HRect,
}

impl ClassSummary {
    fn empty(dim: usize) -> Self {
        Self {
            moments: MomentInfo::empty(dim),
            bound: HRect::empty(dim),
        }
    }
}

/// Per-node statistic of the classifier, shared by query and reference trees
/// so one tree can serve both roles.
#[derive(Clone, Debug, PartialEq)]
pub struct NbcStat {
    classes: ByClass<ClassSummary>,
    pi_pos: Range,
    pi_neg: Range,
}

impl NbcStat {
    /// Summary of `class`'s points.
    pub fn class(&self, class: Class) -> &ClassSummary {
        &self.classes[class]
    }

    /// Number of `class` points.
    pub fn count(&self, class: Class) -> usize {
        self.classes[class].moments.count()
    }

    /// Range of positive-class priors in the subtree.
    pub fn pi_pos(&self) -> Range {
        self.pi_pos
    }

    /// Range of negative-class priors in the subtree.
    pub fn pi_neg(&self) -> Range {
        self.pi_neg
    }

    /// Bound on `class`'s unnormalized kernel sum for any query inside
    /// `region`: `[count·K(maxDist²), count·K(minDist²)]`.
    pub fn contribution_bound(&self, class: Class, kernel: &Epanechnikov, region: &HRect) -> Range {
        let summary = &self.classes[class];
        if summary.moments.is_empty() {
            return Range::ZERO;
        }
        let n = summary.moments.count() as f64;
        Range::new(
            n * kernel.eval_unnorm_on_sq(summary.bound.max_distance_sq(region)),
            n * kernel.eval_unnorm_on_sq(summary.bound.min_distance_sq(region)),
        )
    }
}

impl Statistic<NbcPoint> for NbcStat {
    fn empty(dim: usize) -> Self {
        Self {
            classes: ByClass::from_fn(|_| ClassSummary::empty(dim)),
            pi_pos: Range::EMPTY,
            pi_neg: Range::EMPTY,
        }
    }

    fn accumulate_point(&mut self, point: &NbcPoint) {
        let summary = &mut self.classes[point.class];
        summary.moments.add_point(&point.coords);
        summary.bound.expand_point(&point.coords);
        self.pi_pos.expand(point.prior_of(Class::Positive));
        self.pi_neg.expand(point.prior_of(Class::Negative));
    }

    fn accumulate(&mut self, other: &Self) {
        for class in Class::ALL {
            let (mine, theirs) = (&mut self.classes[class], &other.classes[class]);
            mine.moments.add(&theirs.moments);
            mine.bound.expand_rect(&theirs.bound);
        }
        self.pi_pos = self.pi_pos.union(&other.pi_pos);
        self.pi_neg = self.pi_neg.union(&other.pi_neg);
    }
}
