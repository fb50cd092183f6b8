// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Dual-Tree: a generic branch-and-bound engine over pairs of spatial
//! trees.
//!
//! Many statistics over two point sets (kernel sums, neighbor counts, nearest
//! neighbors, classification by density) are sums of pairwise interactions.
//! This crate evaluates them without touching every pair:
//!
//! - [`SpatialTree`] partitions each point set into nested bounding boxes and
//!   keeps a monoid [`Statistic`] per node.
//! - A [`DualTreeProblem`] decides, for a (query node, reference node) pair,
//!   whether the reference side can be dropped, folded in wholesale through a
//!   [`Postponed`] correction, or must be split further.
//! - The [`DualTree`] driver walks both trees depth-first, keeps a provable
//!   bound on every query's answer, settles whole query subtrees as soon as the
//!   bound decides them, and falls back to exhaustive leaf × leaf work only
//!   where nothing can be pruned.
//!
//! The engine is exact: pruning only ever discards contributions the problem
//! proved irrelevant, so the answers match an exhaustive evaluation.
//!
//! # Example
//!
//! Counting reference points within a radius of each query point:
//!
//! ```rust
//! use thicket_dualtree::{
//!     Consideration, Delta, DualTreeError, DualTreeProblem, NodeRef, Postponed, SpatialTree,
//! };
//!
//! #[derive(Clone, Debug, Default)]
//! struct Count(usize);
//!
//! impl Delta for Count {
//!     fn accumulate(&mut self, other: &Self) {
//!         self.0 += other.0;
//!     }
//! }
//!
//! impl Postponed for Count {
//!     fn merge(&mut self, other: &Self) -> Result<(), DualTreeError> {
//!         self.0 += other.0;
//!         Ok(())
//!     }
//!     fn reset(&mut self) {
//!         self.0 = 0;
//!     }
//! }
//!
//! struct Within(f64);
//!
//! impl DualTreeProblem for Within {
//!     type QPoint = [f64; 2];
//!     type RPoint = [f64; 2];
//!     type QStat = ();
//!     type RStat = ();
//!     type Delta = Count;
//!     type Postponed = Count;
//!     type QResult = usize;
//!     type GlobalResult = ();
//!
//!     fn empty_postponed(&self) -> Count {
//!         Count(0)
//!     }
//!
//!     fn consider_pair(
//!         &self,
//!         q: NodeRef<'_, [f64; 2], ()>,
//!         r: NodeRef<'_, [f64; 2], ()>,
//!     ) -> Result<Consideration<Count, Count>, DualTreeError> {
//!         let r2 = self.0 * self.0;
//!         Ok(if q.bound().min_distance_sq(r.bound()) > r2 {
//!             Consideration::Exclude
//!         } else if q.bound().max_distance_sq(r.bound()) <= r2 {
//!             Consideration::Include(Count(r.len()))
//!         } else {
//!             Consideration::Recurse(Count(r.len()))
//!         })
//!     }
//!
//!     fn consider_termination(
//!         &self,
//!         _q: NodeRef<'_, [f64; 2], ()>,
//!         _postponed: &mut Count,
//!         _unvisited: &Count,
//!     ) -> Result<bool, DualTreeError> {
//!         Ok(false)
//!     }
//!
//!     fn settled_result(
//!         &self,
//!         _q: &[f64; 2],
//!         c: &Count,
//!         _u: &Count,
//!     ) -> Result<usize, DualTreeError> {
//!         Ok(c.0)
//!     }
//!
//!     fn start_point(&self, _q: &[f64; 2], c: &Count) -> Result<usize, DualTreeError> {
//!         Ok(c.0)
//!     }
//!
//!     fn refine_point(
//!         &self,
//!         _q: &[f64; 2],
//!         _n: &mut usize,
//!         _u: &Count,
//!     ) -> Result<(), DualTreeError> {
//!         Ok(())
//!     }
//!
//!     fn is_settled(&self, _n: &usize) -> bool {
//!         false
//!     }
//!
//!     fn visit_leaf(
//!         &self,
//!         q: &[f64; 2],
//!         n: &mut usize,
//!         r: NodeRef<'_, [f64; 2], ()>,
//!     ) -> Result<(), DualTreeError> {
//!         for p in r.points() {
//!             let (dx, dy) = (p[0] - q[0], p[1] - q[1]);
//!             if dx * dx + dy * dy <= self.0 * self.0 {
//!                 *n += 1;
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let pts: Vec<[f64; 2]> = (0..100).map(|i| [(i % 10) as f64, (i / 10) as f64]).collect();
//! let tree = SpatialTree::<_, ()>::build(pts, 4).unwrap();
//! let out = thicket_dualtree::run(&Within(1.0), &tree, &tree).unwrap();
//! // A corner point sees itself and its two axis neighbors.
//! assert_eq!(out.results[0], 3);
//! // An interior point sees itself and four neighbors.
//! assert_eq!(out.results[55], 5);
//! ```
//!
//! # Float semantics
//!
//! Coordinates must be finite; [`SpatialTree::build`] rejects NaN and
//! infinities.

#![no_std]

extern crate alloc;

pub mod bound;
pub mod error;
pub mod problem;
pub mod traversal;
pub mod tree;

pub use bound::{HRect, Range};
pub use error::DualTreeError;
pub use problem::{Consideration, Delta, DualTreeProblem, GlobalResult, Postponed, push_down};
pub use traversal::{DualTree, Traversal, TraversalStats, run};
pub use tree::{NodeIdx, NodeRef, SpatialTree, Statistic, TreePoint};
