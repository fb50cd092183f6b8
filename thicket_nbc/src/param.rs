// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constants derived once per run from the configuration and the reference
//! set.

use thicket_dualtree::Range;
use tracing::debug;

use crate::config::NbcConfig;
use crate::error::NbcError;
use crate::kernel::Epanechnikov;
use crate::labels::Labels;
use crate::point::{ByClass, Class};

/// Kernels and decision constants of a run.
///
/// A query is positive when its posterior for the positive class clears the
/// threshold `t` by a margin `ε = min(t, 1 - t) · tolerance`:
///
/// ```text
/// const_pos.lo · dens_pos.lo · pi_pos.lo > const_neg.hi · dens_neg.hi · pi_neg.hi
/// ```
///
/// with `const_pos = (1 - t ∓ ε) / N_pos`, `const_neg = (t ∓ ε) / N_neg`, and
/// `N_c` the kernel normalization times the class size. Negative is the
/// mirror image.
#[derive(Clone, Debug)]
pub struct NbcParam {
    kernels: ByClass<Epanechnikov>,
    const_pos: Range,
    const_neg: Range,
    counts: ByClass<usize>,
    dim: usize,
    threshold: f64,
}

impl NbcParam {
    /// Derive the constants for a reference set with the given class sizes.
    ///
    /// # Errors
    ///
    /// [`NbcError::InvalidConfig`] for a bad configuration and
    /// [`NbcError::MissingClass`] when a class has no reference points.
    pub fn new(
        config: &NbcConfig,
        dim: usize,
        count_pos: usize,
        count_neg: usize,
    ) -> Result<Self, NbcError> {
        config.validate()?;
        let counts = ByClass {
            positive: count_pos,
            negative: count_neg,
        };
        for class in Class::ALL {
            if counts[class] == 0 {
                return Err(NbcError::MissingClass { class });
            }
        }
        let kernels = ByClass::from_fn(|c| Epanechnikov::new(config.bandwidth(c)));

        let t = config.threshold;
        let epsilon = t.min(1.0 - t) * config.tolerance;
        let norm_pos = kernels.positive.norm_constant(dim) * count_pos as f64;
        let norm_neg = kernels.negative.norm_constant(dim) * count_neg as f64;
        let const_pos = Range::new((1.0 - t - epsilon) / norm_pos, (1.0 - t + epsilon) / norm_pos);
        let const_neg = Range::new((t - epsilon) / norm_neg, (t + epsilon) / norm_neg);

        debug!(
            dim,
            count_pos,
            count_neg,
            bandwidth_pos = config.bandwidth_pos,
            bandwidth_neg = config.bandwidth_neg,
            const_pos_lo = const_pos.lo,
            const_pos_hi = const_pos.hi,
            const_neg_lo = const_neg.lo,
            const_neg_hi = const_neg.hi,
            "derived classification constants"
        );
        Ok(Self {
            kernels,
            const_pos,
            const_neg,
            counts,
            dim,
            threshold: t,
        })
    }

    /// Kernel for `class`.
    pub fn kernel(&self, class: Class) -> &Epanechnikov {
        &self.kernels[class]
    }

    /// Normalized positive-class constant range.
    pub fn const_pos(&self) -> Range {
        self.const_pos
    }

    /// Normalized negative-class constant range.
    pub fn const_neg(&self) -> Range {
        self.const_neg
    }

    /// Reference points of `class`.
    pub fn count(&self, class: Class) -> usize {
        self.counts[class]
    }

    /// Dimension of the data.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Decision threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Labels ruled in by bounded densities and priors: a singleton when one
    /// side provably wins, [`Labels::EITHER`] otherwise.
    pub fn decide(&self, density: &ByClass<Range>, pi_pos: Range, pi_neg: Range) -> Labels {
        let (pos, neg) = (density.positive, density.negative);
        if self.const_pos.lo * pos.lo * pi_pos.lo > self.const_neg.hi * neg.hi * pi_neg.hi {
            Labels::POSITIVE
        } else if self.const_neg.lo * neg.lo * pi_neg.lo > self.const_pos.hi * pos.hi * pi_pos.hi {
            Labels::NEGATIVE
        } else {
            Labels::EITHER
        }
    }

    /// [`decide`](Self::decide) for a single prior.
    pub fn decide_point(&self, density: &ByClass<Range>, prior: f64) -> Labels {
        self.decide(density, Range::point(prior), Range::point(1.0 - prior))
    }
}
