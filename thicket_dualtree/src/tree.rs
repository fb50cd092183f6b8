// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static spatial tree over a point set, with a monoid statistic per node.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeIdx`]. Points
//! are permuted at build time so that every node, leaf or internal, owns a
//! contiguous range of the backing storage.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::bound::HRect;
use crate::error::DualTreeError;

/// A point that can be indexed: a fixed-dimension coordinate vector.
pub trait TreePoint {
    /// Coordinates of the point. Every point of a tree has the same length.
    fn coords(&self) -> &[f64];
}

impl TreePoint for Vec<f64> {
    fn coords(&self) -> &[f64] {
        self
    }
}

impl<const N: usize> TreePoint for [f64; N] {
    fn coords(&self) -> &[f64] {
        self
    }
}

/// Per-node summary computed bottom-up.
///
/// Must be a commutative monoid: folding points one at a time and folding
/// whole subtrees with [`accumulate`](Statistic::accumulate) give the same
/// value regardless of order.
pub trait Statistic<P>: Clone + Debug {
    /// The identity: a summary of no points in `dim` dimensions.
    fn empty(dim: usize) -> Self;

    /// Fold a single point in.
    fn accumulate_point(&mut self, point: &P);

    /// Fold another summary in.
    fn accumulate(&mut self, other: &Self);
}

impl<P> Statistic<P> for () {
    fn empty(_dim: usize) -> Self {}

    fn accumulate_point(&mut self, _point: &P) {}

    fn accumulate(&mut self, _other: &Self) {}
}

/// Index of a node in a [`SpatialTree`] arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    /// Position of the node in the arena. The root is `0` and children always
    /// come after their parent.
    pub const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug)]
enum Kind {
    Leaf,
    Internal { left: NodeIdx, right: NodeIdx },
}

#[derive(Clone, Debug)]
struct Node<S> {
    bound: HRect,
    stat: S,
    begin: usize,
    end: usize,
    parent: Option<NodeIdx>,
    kind: Kind,
}

/// Binary space-partitioning tree (kd-tree with midpoint splits).
pub struct SpatialTree<P, S> {
    dim: usize,
    leaf_size: usize,
    arena: Vec<Node<S>>,
    points: Vec<P>,
    original: Vec<usize>,
}

impl<P: TreePoint, S: Statistic<P>> SpatialTree<P, S> {
    /// Build a tree over `points`, splitting until a node holds at most
    /// `leaf_size` points.
    ///
    /// Each split cuts the widest dimension of the node's bounding box at its
    /// midpoint. When every point falls on one side of the midpoint the node is
    /// split at the median along that dimension instead. Nodes whose points all
    /// coincide stay leaves whatever their size.
    ///
    /// # Errors
    ///
    /// [`DualTreeError::DegenerateInput`] if `points` is empty, `leaf_size` is
    /// zero, the points have zero or differing dimensions, or a coordinate is
    /// not finite.
    pub fn build(points: Vec<P>, leaf_size: usize) -> Result<Self, DualTreeError> {
        if leaf_size == 0 {
            return Err(DualTreeError::degenerate("leaf size must be positive"));
        }
        let Some(first) = points.first() else {
            return Err(DualTreeError::degenerate("empty point set"));
        };
        let dim = first.coords().len();
        if dim == 0 {
            return Err(DualTreeError::degenerate("points have no coordinates"));
        }
        for p in &points {
            let c = p.coords();
            if c.len() != dim {
                return Err(DualTreeError::degenerate("points disagree on dimension"));
            }
            if c.iter().any(|v| !v.is_finite()) {
                return Err(DualTreeError::degenerate("non-finite coordinate"));
            }
        }

        let n = points.len();
        let mut items: Vec<(usize, P)> = points.into_iter().enumerate().collect();
        let mut arena = Vec::new();
        arena.push(Node {
            bound: bound_of(&items, dim),
            stat: S::empty(dim),
            begin: 0,
            end: n,
            parent: None,
            kind: Kind::Leaf,
        });

        let mut stack = alloc::vec![NodeIdx::new(0)];
        while let Some(idx) = stack.pop() {
            let node = &arena[idx.get()];
            let (begin, end) = (node.begin, node.end);
            if end - begin <= leaf_size {
                continue;
            }
            let (d, width) = node.bound.widest_dim();
            if width <= 0.0 {
                continue;
            }
            let mid = node.bound.ranges()[d].mid();
            let slice = &mut items[begin..end];
            let mut split = partition_in_place(slice, |(_, p)| p.coords()[d] < mid);
            if split == 0 || split == slice.len() {
                split = slice.len() / 2;
                let _ = slice.select_nth_unstable_by(split, |(_, a), (_, b)| {
                    a.coords()[d].total_cmp(&b.coords()[d])
                });
            }
            let split = begin + split;

            let left = NodeIdx::new(arena.len());
            let right = NodeIdx::new(arena.len() + 1);
            for (b, e) in [(begin, split), (split, end)] {
                arena.push(Node {
                    bound: bound_of(&items[b..e], dim),
                    stat: S::empty(dim),
                    begin: b,
                    end: e,
                    parent: Some(idx),
                    kind: Kind::Leaf,
                });
            }
            arena[idx.get()].kind = Kind::Internal { left, right };
            stack.push(right);
            stack.push(left);
        }

        // Children follow their parent in the arena, so a reverse sweep sees
        // every child summary before the parent needs it.
        for i in (0..arena.len()).rev() {
            let stat = match arena[i].kind {
                Kind::Leaf => {
                    let mut s = S::empty(dim);
                    for (_, p) in &items[arena[i].begin..arena[i].end] {
                        s.accumulate_point(p);
                    }
                    s
                }
                Kind::Internal { left, right } => {
                    let mut s = arena[left.get()].stat.clone();
                    s.accumulate(&arena[right.get()].stat);
                    s
                }
            };
            arena[i].stat = stat;
        }

        let (original, points) = items.into_iter().unzip();
        Ok(Self {
            dim,
            leaf_size,
            arena,
            points,
            original,
        })
    }
}

impl<P, S> SpatialTree<P, S> {
    /// Root node handle.
    pub const fn root(&self) -> NodeIdx {
        NodeIdx::new(0)
    }

    /// Borrowed view of a node.
    pub fn node(&self, idx: NodeIdx) -> NodeRef<'_, P, S> {
        debug_assert!(idx.get() < self.arena.len(), "node index out of range");
        NodeRef { tree: self, idx }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: building rejects empty point sets.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimension of every point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Leaf threshold the tree was built with.
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Points in tree (leaf-contiguous) order.
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// Input position of the point stored at tree position `pos`.
    pub fn original_index(&self, pos: usize) -> usize {
        self.original[pos]
    }

    /// Iterate over all node handles, root first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_, P, S>> + '_ {
        (0..self.arena.len()).map(move |i| self.node(NodeIdx::new(i)))
    }
}

impl<P, S> Debug for SpatialTree<P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let leaves = self
            .arena
            .iter()
            .filter(|n| matches!(n.kind, Kind::Leaf))
            .count();
        f.debug_struct("SpatialTree")
            .field("dim", &self.dim)
            .field("leaf_size", &self.leaf_size)
            .field("points", &self.points.len())
            .field("nodes", &self.arena.len())
            .field("leaves", &leaves)
            .finish_non_exhaustive()
    }
}

/// Borrowed handle to one node of a [`SpatialTree`].
pub struct NodeRef<'a, P, S> {
    tree: &'a SpatialTree<P, S>,
    idx: NodeIdx,
}

impl<P, S> Clone for NodeRef<'_, P, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, S> Copy for NodeRef<'_, P, S> {}

impl<'a, P, S> NodeRef<'a, P, S> {
    fn raw(&self) -> &'a Node<S> {
        &self.tree.arena[self.idx.get()]
    }

    /// Arena index of this node.
    pub fn idx(&self) -> NodeIdx {
        self.idx
    }

    /// Bounding box of every point below this node.
    pub fn bound(&self) -> &'a HRect {
        &self.raw().bound
    }

    /// Summary statistic of the subtree.
    pub fn stat(&self) -> &'a S {
        &self.raw().stat
    }

    /// Points below this node, contiguous in tree order.
    pub fn points(&self) -> &'a [P] {
        let n = self.raw();
        &self.tree.points[n.begin..n.end]
    }

    /// Tree positions covered by this node.
    pub fn range(&self) -> core::ops::Range<usize> {
        let n = self.raw();
        n.begin..n.end
    }

    /// Number of points below this node.
    pub fn len(&self) -> usize {
        let n = self.raw();
        n.end - n.begin
    }

    /// Nodes are never empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self.raw().kind, Kind::Leaf)
    }

    /// Left and right children of an internal node.
    pub fn children(&self) -> Option<(NodeIdx, NodeIdx)> {
        match self.raw().kind {
            Kind::Leaf => None,
            Kind::Internal { left, right } => Some((left, right)),
        }
    }

    /// Parent of this node, `None` at the root.
    pub fn parent(&self) -> Option<NodeIdx> {
        self.raw().parent
    }
}

impl<P, S: Debug> Debug for NodeRef<'_, P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeRef")
            .field("idx", &self.idx)
            .field("range", &self.range())
            .field("leaf", &self.is_leaf())
            .field("stat", self.stat())
            .finish()
    }
}

fn bound_of<P: TreePoint>(items: &[(usize, P)], dim: usize) -> HRect {
    let mut b = HRect::empty(dim);
    for (_, p) in items {
        b.expand_point(p.coords());
    }
    b
}

/// Stable-for-the-prefix partition: moves items satisfying `pred` to the front
/// and returns how many there are.
fn partition_in_place<T>(slice: &mut [T], mut pred: impl FnMut(&T) -> bool) -> usize {
    let mut i = 0;
    for j in 0..slice.len() {
        if pred(&slice[j]) {
            slice.swap(i, j);
            i += 1;
        }
    }
    i
}
