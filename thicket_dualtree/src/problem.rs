// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability set a problem supplies to the dual-tree engine.
//!
//! A problem instantiation (kernel classification, range counting, ...)
//! implements [`DualTreeProblem`] and picks its own types for the pieces the
//! engine moves around:
//!
//! - [`Delta`]: provisional bound on one pair's contribution, summed over the
//!   reference nodes still pending for a query node.
//! - [`Postponed`]: lazily applied correction attached to a query node and
//!   pushed down to its children.
//! - [`GlobalResult`]: reduction over every finished query result.
//!
//! The engine never inspects these values; it only decides when to compute,
//! merge, and apply them.

use core::fmt::Debug;

use crate::error::DualTreeError;
use crate::tree::{NodeRef, Statistic, TreePoint};

/// Outcome of considering a (query node, reference node) pair.
#[derive(Clone, Debug, PartialEq)]
pub enum Consideration<D, C> {
    /// The reference node cannot contribute to any query below the node.
    Exclude,
    /// The reference node's contribution is folded in wholesale. The
    /// correction is merged into the query node's postponed correction.
    Include(C),
    /// Neither prune applies; the pair must be split further. The delta bounds
    /// the pair's contribution until then.
    Recurse(D),
}

/// Provisional bound on a pair's contribution.
///
/// `Default` must be the additive identity.
pub trait Delta: Clone + Debug + Default {
    /// Add another bound into this one.
    fn accumulate(&mut self, other: &Self);
}

/// A deferred, mergeable correction owned by a query node.
pub trait Postponed: Clone + Debug {
    /// Fold `other` into `self`.
    ///
    /// # Errors
    ///
    /// Implementations return [`DualTreeError::ConflictingLabels`] when the two
    /// corrections make incompatible claims.
    fn merge(&mut self, other: &Self) -> Result<(), DualTreeError>;

    /// Return to the identity correction.
    fn reset(&mut self);
}

/// Move a parent's correction into both children.
///
/// Each child merges a copy of the parent, then the parent is reset, so the
/// correction is only ever counted once on any root-to-leaf path.
///
/// # Errors
///
/// Propagates a conflict raised while merging into either child.
pub fn push_down<C: Postponed>(
    parent: &mut C,
    left: &mut C,
    right: &mut C,
) -> Result<(), DualTreeError> {
    left.merge(parent)?;
    right.merge(parent)?;
    parent.reset();
    Ok(())
}

/// Reduction over finished per-query results.
///
/// Must be associative and commutative so that the fold order does not change
/// the answer.
pub trait GlobalResult<P, R>: Default + Debug {
    /// Account for one finished query.
    fn accumulate(&mut self, point: &P, result: &R);

    /// Combine two partial reductions.
    fn merge(&mut self, other: &Self);
}

impl<P, R> GlobalResult<P, R> for () {
    fn accumulate(&mut self, _point: &P, _result: &R) {}

    fn merge(&mut self, _other: &Self) {}
}

/// One problem instantiation of the dual-tree engine.
///
/// The traversal calls these hooks in a fixed pattern:
///
/// 1. [`consider_pair`](Self::consider_pair) for every (query node,
///    reference node) pair it reaches.
/// 2. [`consider_termination`](Self::consider_termination) whenever a query
///    node's pending work changes; a `true` answer settles the whole subtree
///    through [`settled_result`](Self::settled_result).
/// 3. At query leaves, per point: [`start_point`](Self::start_point), then
///    alternating [`refine_point`](Self::refine_point) and
///    [`visit_leaf`](Self::visit_leaf) over the pending reference leaves
///    until [`is_settled`](Self::is_settled), then
///    [`finish_point`](Self::finish_point) if every leaf was visited.
pub trait DualTreeProblem {
    /// Query point type.
    type QPoint: TreePoint;
    /// Reference point type.
    type RPoint: TreePoint;
    /// Query node statistic.
    type QStat: Statistic<Self::QPoint>;
    /// Reference node statistic.
    type RStat: Statistic<Self::RPoint>;
    /// Provisional pair bound.
    type Delta: Delta;
    /// Deferred correction for query nodes.
    type Postponed: Postponed;
    /// Per-query result.
    type QResult: Clone + Debug;
    /// Reduction over all query results.
    type GlobalResult: GlobalResult<Self::QPoint, Self::QResult>;

    /// The identity correction a fresh query node starts with.
    fn empty_postponed(&self) -> Self::Postponed;

    /// Decide whether a pair is excluded, included wholesale, or split.
    ///
    /// # Errors
    ///
    /// Any [`DualTreeError`]; the traversal aborts.
    fn consider_pair(
        &self,
        q: NodeRef<'_, Self::QPoint, Self::QStat>,
        r: NodeRef<'_, Self::RPoint, Self::RStat>,
    ) -> Result<Consideration<Self::Delta, Self::Postponed>, DualTreeError>;

    /// Ordering key for pending reference nodes; smaller is visited first.
    fn heuristic(
        &self,
        q: NodeRef<'_, Self::QPoint, Self::QStat>,
        r: NodeRef<'_, Self::RPoint, Self::RStat>,
    ) -> f64 {
        r.bound().min_to_mid_sq(q.bound())
    }

    /// Try to settle every query below `q` at once.
    ///
    /// `postponed` holds everything included so far and `unvisited` bounds
    /// every reference node still pending. Returns `true` once the answer for
    /// the whole subtree is decided; the decision is recorded in `postponed`.
    ///
    /// # Errors
    ///
    /// Any [`DualTreeError`]; the traversal aborts.
    fn consider_termination(
        &self,
        q: NodeRef<'_, Self::QPoint, Self::QStat>,
        postponed: &mut Self::Postponed,
        unvisited: &Self::Delta,
    ) -> Result<bool, DualTreeError>;

    /// Result for a query point whose node was settled early.
    ///
    /// # Errors
    ///
    /// Any [`DualTreeError`]; the traversal aborts.
    fn settled_result(
        &self,
        q: &Self::QPoint,
        postponed: &Self::Postponed,
        unvisited: &Self::Delta,
    ) -> Result<Self::QResult, DualTreeError>;

    /// Initial result for a query point: the postponed correction applied
    /// exactly.
    ///
    /// # Errors
    ///
    /// Any [`DualTreeError`]; the traversal aborts.
    fn start_point(
        &self,
        q: &Self::QPoint,
        postponed: &Self::Postponed,
    ) -> Result<Self::QResult, DualTreeError>;

    /// Tighten a point's answer using what is known exactly plus the bound on
    /// what is still unvisited.
    ///
    /// # Errors
    ///
    /// Any [`DualTreeError`]; the traversal aborts.
    fn refine_point(
        &self,
        q: &Self::QPoint,
        result: &mut Self::QResult,
        unvisited: &Self::Delta,
    ) -> Result<(), DualTreeError>;

    /// Whether a point's answer can no longer change.
    fn is_settled(&self, result: &Self::QResult) -> bool;

    /// Exhaustive work of one query point against one reference leaf.
    ///
    /// # Errors
    ///
    /// Any [`DualTreeError`]; the traversal aborts.
    fn visit_leaf(
        &self,
        q: &Self::QPoint,
        result: &mut Self::QResult,
        r: NodeRef<'_, Self::RPoint, Self::RStat>,
    ) -> Result<(), DualTreeError>;

    /// Final step once every reference leaf has been visited for a point.
    ///
    /// # Errors
    ///
    /// Any [`DualTreeError`]; the traversal aborts.
    fn finish_point(
        &self,
        q: &Self::QPoint,
        result: &mut Self::QResult,
    ) -> Result<(), DualTreeError> {
        self.refine_point(q, result, &Self::Delta::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Tally(u32);

    impl Postponed for Tally {
        fn merge(&mut self, other: &Self) -> Result<(), DualTreeError> {
            self.0 += other.0;
            Ok(())
        }

        fn reset(&mut self) {
            self.0 = 0;
        }
    }

    #[test]
    fn push_down_moves_the_correction() {
        let mut parent = Tally(3);
        let mut left = Tally(1);
        let mut right = Tally::default();
        push_down(&mut parent, &mut left, &mut right).unwrap();
        assert_eq!(parent, Tally(0));
        assert_eq!(left, Tally(4));
        assert_eq!(right, Tally(3));
    }
}
