// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first dual-tree traversal.
//!
//! The driver walks the query tree with an explicit stack. Each frame carries
//! a query node, its postponed correction, and the reference nodes still
//! relevant to it. For a frame the driver:
//!
//! 1. re-decides every candidate reference node against the (tighter) query
//!    node: excluded nodes vanish, included nodes are merged into the
//!    correction, the rest stay pending with a delta bound;
//! 2. asks the problem whether the pending bounds already settle the whole
//!    query subtree, and splits the closest pending reference node that is
//!    larger than the query node until either the subtree settles or no such
//!    node remains;
//! 3. hands query leaves to the leaf visitor, or pushes the correction down
//!    to both query children and continues with them.
//!
//! Results are collected per query point and reduced into the global result
//! once the walk is over.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use tracing::{debug, trace};

use crate::error::DualTreeError;
use crate::problem::{Consideration, Delta, DualTreeProblem, GlobalResult, Postponed, push_down};
use crate::tree::{NodeIdx, NodeRef, SpatialTree};

/// Counters describing the work a traversal did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Pairs handed to [`DualTreeProblem::consider_pair`].
    pub pairs_considered: usize,
    /// Pairs dropped because the reference node cannot contribute.
    pub exclusions: usize,
    /// Pairs folded into a postponed correction in closed form.
    pub inclusions: usize,
    /// Pairs left pending with a delta bound.
    pub recursions: usize,
    /// Pending reference nodes replaced by their children.
    pub reference_splits: usize,
    /// Query nodes whose correction was pushed down to children.
    pub query_splits: usize,
    /// Query point × reference leaf visits in the leaf visitor.
    pub leaf_visits: usize,
    /// Query subtrees settled by the termination rule.
    pub settled_nodes: usize,
    /// Query points covered by settled subtrees.
    pub settled_points: usize,
    /// Query points that stopped visiting reference leaves early.
    pub short_circuits: usize,
}

/// Output of a finished traversal.
#[derive(Clone, Debug)]
pub struct Traversal<R, G> {
    /// One result per query point, in the order the points were given to
    /// [`SpatialTree::build`].
    pub results: Vec<R>,
    /// Reduction over `results`.
    pub global: G,
    /// Work counters.
    pub stats: TraversalStats,
}

struct Pending<D> {
    node: NodeIdx,
    delta: D,
    priority: f64,
}

struct Frame<C> {
    q: NodeIdx,
    postponed: C,
    candidates: Vec<NodeIdx>,
}

/// Dual-tree traversal of a query tree against a reference tree.
///
/// Passing the same tree twice runs the monochromatic variant.
pub struct DualTree<'a, Pr: DualTreeProblem> {
    problem: &'a Pr,
    query: &'a SpatialTree<Pr::QPoint, Pr::QStat>,
    reference: &'a SpatialTree<Pr::RPoint, Pr::RStat>,
}

impl<Pr: DualTreeProblem> Debug for DualTree<'_, Pr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DualTree")
            .field("query_points", &self.query.len())
            .field("reference_points", &self.reference.len())
            .finish_non_exhaustive()
    }
}

impl<'a, Pr: DualTreeProblem> DualTree<'a, Pr> {
    /// Pair a problem with its two trees.
    pub fn new(
        problem: &'a Pr,
        query: &'a SpatialTree<Pr::QPoint, Pr::QStat>,
        reference: &'a SpatialTree<Pr::RPoint, Pr::RStat>,
    ) -> Self {
        Self {
            problem,
            query,
            reference,
        }
    }

    /// Run the traversal to completion.
    ///
    /// # Errors
    ///
    /// [`DualTreeError::DegenerateInput`] if the trees disagree on dimension;
    /// otherwise whatever the problem hooks return.
    pub fn run(&self) -> Result<Traversal<Pr::QResult, Pr::GlobalResult>, DualTreeError> {
        if self.query.dim() != self.reference.dim() {
            return Err(DualTreeError::degenerate(
                "query and reference trees differ in dimension",
            ));
        }

        let n = self.query.len();
        let mut slots: Vec<Option<Pr::QResult>> = (0..n).map(|_| None).collect();
        let mut stats = TraversalStats::default();
        let mut stack = vec![Frame {
            q: self.query.root(),
            postponed: self.problem.empty_postponed(),
            candidates: vec![self.reference.root()],
        }];
        while let Some(frame) = stack.pop() {
            self.visit(frame, &mut stack, &mut slots, &mut stats)?;
        }

        let mut global = Pr::GlobalResult::default();
        let mut ordered: Vec<Option<Pr::QResult>> = (0..n).map(|_| None).collect();
        for (pos, slot) in slots.into_iter().enumerate() {
            let result = slot.ok_or(DualTreeError::Unresolved { index: pos })?;
            global.accumulate(&self.query.points()[pos], &result);
            ordered[self.query.original_index(pos)] = Some(result);
        }
        let results = ordered.into_iter().flatten().collect();

        debug!(
            queries = n,
            references = self.reference.len(),
            pairs = stats.pairs_considered,
            exclusions = stats.exclusions,
            inclusions = stats.inclusions,
            leaf_visits = stats.leaf_visits,
            settled_points = stats.settled_points,
            "dual-tree traversal finished"
        );
        Ok(Traversal {
            results,
            global,
            stats,
        })
    }

    fn visit(
        &self,
        frame: Frame<Pr::Postponed>,
        stack: &mut Vec<Frame<Pr::Postponed>>,
        slots: &mut [Option<Pr::QResult>],
        stats: &mut TraversalStats,
    ) -> Result<(), DualTreeError> {
        let Frame {
            q,
            mut postponed,
            candidates,
        } = frame;
        let q_node = self.query.node(q);

        let mut pending = Vec::with_capacity(candidates.len());
        for r in candidates {
            self.consider(q_node, r, &mut postponed, &mut pending, stats)?;
        }

        loop {
            let unvisited = sum_deltas(&pending);
            if self
                .problem
                .consider_termination(q_node, &mut postponed, &unvisited)?
            {
                trace!(node = q.get(), points = q_node.len(), "query subtree settled");
                stats.settled_nodes += 1;
                stats.settled_points += q_node.len();
                for (pos, point) in q_node.range().zip(q_node.points()) {
                    slots[pos] = Some(self.problem.settled_result(point, &postponed, &unvisited)?);
                }
                return Ok(());
            }
            let Some(i) = self.next_split(q_node, &pending) else {
                break;
            };
            let split = pending.swap_remove(i);
            stats.reference_splits += 1;
            if let Some((left, right)) = self.reference.node(split.node).children() {
                self.consider(q_node, left, &mut postponed, &mut pending, stats)?;
                self.consider(q_node, right, &mut postponed, &mut pending, stats)?;
            }
        }

        match q_node.children() {
            Some((left, right)) if !pending.is_empty() => {
                let mut left_postponed = self.problem.empty_postponed();
                let mut right_postponed = self.problem.empty_postponed();
                push_down(&mut postponed, &mut left_postponed, &mut right_postponed)?;
                stats.query_splits += 1;
                let candidates: Vec<NodeIdx> = pending.into_iter().map(|p| p.node).collect();
                stack.push(Frame {
                    q: right,
                    postponed: right_postponed,
                    candidates: candidates.clone(),
                });
                stack.push(Frame {
                    q: left,
                    postponed: left_postponed,
                    candidates,
                });
                Ok(())
            }
            // A leaf, or an internal node with nothing pending: the correction
            // can be applied straight to its points.
            _ => self.base_case(q_node, &postponed, pending, slots, stats),
        }
    }

    fn consider(
        &self,
        q_node: NodeRef<'a, Pr::QPoint, Pr::QStat>,
        r: NodeIdx,
        postponed: &mut Pr::Postponed,
        pending: &mut Vec<Pending<Pr::Delta>>,
        stats: &mut TraversalStats,
    ) -> Result<(), DualTreeError> {
        let r_node = self.reference.node(r);
        stats.pairs_considered += 1;
        match self.problem.consider_pair(q_node, r_node)? {
            Consideration::Exclude => {
                trace!(q = q_node.idx().get(), r = r.get(), "exclusion");
                stats.exclusions += 1;
            }
            Consideration::Include(correction) => {
                trace!(q = q_node.idx().get(), r = r.get(), "inclusion");
                stats.inclusions += 1;
                postponed.merge(&correction)?;
            }
            Consideration::Recurse(delta) => {
                stats.recursions += 1;
                pending.push(Pending {
                    node: r,
                    delta,
                    priority: self.problem.heuristic(q_node, r_node),
                });
            }
        }
        Ok(())
    }

    /// The closest pending reference node that should be split before the
    /// query node is: every internal one when the query node is a leaf,
    /// otherwise internal ones holding at least as many points.
    fn next_split(
        &self,
        q_node: NodeRef<'a, Pr::QPoint, Pr::QStat>,
        pending: &[Pending<Pr::Delta>],
    ) -> Option<usize> {
        pending
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                let r_node = self.reference.node(p.node);
                !r_node.is_leaf() && (q_node.is_leaf() || r_node.len() >= q_node.len())
            })
            .min_by(|(_, a), (_, b)| a.priority.total_cmp(&b.priority))
            .map(|(i, _)| i)
    }

    fn base_case(
        &self,
        q_node: NodeRef<'a, Pr::QPoint, Pr::QStat>,
        postponed: &Pr::Postponed,
        mut pending: Vec<Pending<Pr::Delta>>,
        slots: &mut [Option<Pr::QResult>],
        stats: &mut TraversalStats,
    ) -> Result<(), DualTreeError> {
        pending.sort_by(|a, b| a.priority.total_cmp(&b.priority));

        // remaining[k] bounds everything from pending[k] onwards.
        let mut remaining = vec![Pr::Delta::default(); pending.len() + 1];
        for k in (0..pending.len()).rev() {
            let mut d = remaining[k + 1].clone();
            d.accumulate(&pending[k].delta);
            remaining[k] = d;
        }

        for (pos, point) in q_node.range().zip(q_node.points()) {
            let mut result = self.problem.start_point(point, postponed)?;
            let mut complete = true;
            for (k, p) in pending.iter().enumerate() {
                self.problem.refine_point(point, &mut result, &remaining[k])?;
                if self.problem.is_settled(&result) {
                    stats.short_circuits += 1;
                    complete = false;
                    break;
                }
                self.problem
                    .visit_leaf(point, &mut result, self.reference.node(p.node))?;
                stats.leaf_visits += 1;
            }
            if complete {
                self.problem.finish_point(point, &mut result)?;
            }
            slots[pos] = Some(result);
        }
        Ok(())
    }
}

fn sum_deltas<D: Delta>(pending: &[Pending<D>]) -> D {
    let mut total = D::default();
    for p in pending {
        total.accumulate(&p.delta);
    }
    total
}

/// Build-and-run shorthand for [`DualTree::run`].
///
/// # Errors
///
/// See [`DualTree::run`].
pub fn run<Pr: DualTreeProblem>(
    problem: &Pr,
    query: &SpatialTree<Pr::QPoint, Pr::QStat>,
    reference: &SpatialTree<Pr::RPoint, Pr::RStat>,
) -> Result<Traversal<Pr::QResult, Pr::GlobalResult>, DualTreeError> {
    DualTree::new(problem, query, reference).run()
}
