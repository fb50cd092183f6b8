// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy shared by the engine and its problem instantiations.

use thiserror::Error;

/// Fatal conditions raised while building trees or traversing them.
///
/// The traversal is deterministic and exact, so none of these are retryable:
/// they either describe unusable input or a broken invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DualTreeError {
    /// The point set cannot be indexed (empty, mixed dimensions, non-finite
    /// coordinates, or a zero leaf size).
    #[error("degenerate input: {reason}")]
    DegenerateInput {
        /// What was wrong with the input.
        reason: &'static str,
    },
    /// Intersecting two label-candidate sets left nothing. Points to an
    /// unsound bound upstream.
    #[error("conflicting label sets {current:#06b} and {incoming:#06b} have no label in common")]
    ConflictingLabels {
        /// Bits of the set being narrowed.
        current: u32,
        /// Bits of the set it was intersected with.
        incoming: u32,
    },
    /// A closed-form contribution was requested from a summary holding no
    /// points.
    #[error("numeric degeneracy: {reason}")]
    NumericDegeneracy {
        /// Which computation hit the degenerate summary.
        reason: &'static str,
    },
    /// The traversal finished without producing a result for a query.
    #[error("query at tree position {index} was never resolved")]
    Unresolved {
        /// Tree position of the query point.
        index: usize,
    },
}

impl DualTreeError {
    pub(crate) const fn degenerate(reason: &'static str) -> Self {
        Self::DegenerateInput { reason }
    }
}
