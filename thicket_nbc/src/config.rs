// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classifier configuration.

use crate::error::NbcError;
use crate::point::Class;

/// Parameters of a classification run.
///
/// ```
/// use thicket_nbc::NbcConfig;
///
/// let config = NbcConfig::default()
///     .with_bandwidths(0.4, 0.6)
///     .with_threshold(0.7);
/// assert!(config.validate().is_ok());
/// assert!(NbcConfig::default().with_threshold(1.0).validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NbcConfig {
    /// Kernel bandwidth for positive reference points.
    pub bandwidth_pos: f64,
    /// Kernel bandwidth for negative reference points.
    pub bandwidth_neg: f64,
    /// Posterior probability the positive class must exceed.
    pub threshold: f64,
    /// Relative margin around the threshold inside which a query stays
    /// undecided.
    pub tolerance: f64,
    /// Maximum number of points in a tree leaf.
    pub leaf_size: usize,
}

impl Default for NbcConfig {
    fn default() -> Self {
        Self {
            bandwidth_pos: 1.0,
            bandwidth_neg: 1.0,
            threshold: 0.5,
            tolerance: 1e-3,
            leaf_size: 32,
        }
    }
}

impl NbcConfig {
    /// Set both bandwidths.
    #[must_use]
    pub fn with_bandwidths(mut self, pos: f64, neg: f64) -> Self {
        self.bandwidth_pos = pos;
        self.bandwidth_neg = neg;
        self
    }

    /// Set the decision threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the relative tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the leaf size used when building trees.
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Bandwidth for `class`.
    pub fn bandwidth(&self, class: Class) -> f64 {
        match class {
            Class::Positive => self.bandwidth_pos,
            Class::Negative => self.bandwidth_neg,
        }
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// [`NbcError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> Result<(), NbcError> {
        let invalid = |field, reason| Err(NbcError::InvalidConfig { field, reason });
        for (field, h) in [
            ("bandwidth_pos", self.bandwidth_pos),
            ("bandwidth_neg", self.bandwidth_neg),
        ] {
            if !(h.is_finite() && h > 0.0) {
                return invalid(field, "must be finite and positive");
            }
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return invalid("threshold", "must lie strictly between 0 and 1");
        }
        if !(self.tolerance >= 0.0 && self.tolerance < 1.0) {
            return invalid("tolerance", "must lie in [0, 1)");
        }
        if self.leaf_size == 0 {
            return invalid("leaf_size", "must be at least 1");
        }
        Ok(())
    }
}
