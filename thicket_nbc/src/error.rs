// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classifier errors.

use thicket_dualtree::DualTreeError;
use thiserror::Error;

use crate::point::Class;

/// Errors reported by the classifier.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NbcError {
    /// A configuration field is out of range.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A point's payload is unusable.
    #[error("invalid point at index {index}: {reason}")]
    InvalidPoint {
        /// Position of the point in its input set.
        index: usize,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The reference set has no points of a class, so its density cannot be
    /// normalized.
    #[error("reference set has no {class} points")]
    MissingClass {
        /// The class with no reference points.
        class: Class,
    },
    /// The engine failed.
    #[error(transparent)]
    Engine(#[from] DualTreeError),
}
