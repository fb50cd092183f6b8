// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entry points: tree building and classification runs.

use alloc::vec::Vec;

use thicket_dualtree::{SpatialTree, TraversalStats};
use tracing::debug;

use crate::config::NbcConfig;
use crate::error::NbcError;
use crate::labels::Labels;
use crate::param::NbcParam;
use crate::point::{Class, NbcPoint};
use crate::problem::Nbc;
use crate::result::{NbcResult, NbcTally};
use crate::stat::NbcStat;

/// Spatial tree over classifier points.
pub type NbcTree = SpatialTree<NbcPoint, NbcStat>;

/// Output of a classification run.
#[derive(Clone, Debug)]
pub struct Classification {
    /// Label set per query, in input order.
    pub labels: Vec<Labels>,
    /// Full result per query, in input order.
    pub results: Vec<NbcResult>,
    /// Counts per outcome.
    pub tally: NbcTally,
    /// Traversal work counters.
    pub stats: TraversalStats,
}

/// Classify every point of `query` against `reference`.
///
/// Pass the same tree twice for a monochromatic run, where every point is
/// classified by a density that includes itself.
///
/// # Errors
///
/// - [`NbcError::InvalidConfig`] for a bad configuration.
/// - [`NbcError::InvalidPoint`] for a query prior outside `[0, 1]`, indexed
///   by the point's position in the input to [`SpatialTree::build`].
/// - [`NbcError::MissingClass`] if `reference` lacks a class.
/// - [`NbcError::Engine`] for mismatched dimensions or a broken invariant.
pub fn run_traversal(
    query: &NbcTree,
    reference: &NbcTree,
    config: &NbcConfig,
) -> Result<Classification, NbcError> {
    for (pos, point) in query.points().iter().enumerate() {
        check_prior(query.original_index(pos), point)?;
    }
    let root = reference.node(reference.root()).stat();
    let param = NbcParam::new(
        config,
        reference.dim(),
        root.count(Class::Positive),
        root.count(Class::Negative),
    )?;
    let out = thicket_dualtree::run(&Nbc::new(param), query, reference)?;
    let tally = out.global;
    debug!(
        positive = tally.positive,
        negative = tally.negative,
        undecided = tally.undecided,
        "classification finished"
    );
    Ok(Classification {
        labels: out.results.iter().map(|r| r.labels).collect(),
        results: out.results,
        tally,
        stats: out.stats,
    })
}

/// Validated configuration plus tree building.
///
/// ```
/// use thicket_nbc::{Class, Classifier, NbcConfig, NbcPoint};
///
/// let mut points = Vec::new();
/// for i in 0..5 {
///     let y = i as f64 * 0.1;
///     points.push(NbcPoint::reference(vec![0.0, y], Class::Positive));
///     points.push(NbcPoint::reference(vec![8.0, y], Class::Negative));
/// }
/// let classifier = Classifier::new(NbcConfig::default().with_leaf_size(2)).unwrap();
/// let out = classifier.classify_monochromatic(points).unwrap();
/// assert_eq!(out.results[0].label(), Some(Class::Positive));
/// assert_eq!(out.results[1].label(), Some(Class::Negative));
/// assert_eq!(out.tally.undecided, 0);
/// ```
#[derive(Clone, Debug)]
pub struct Classifier {
    config: NbcConfig,
}

impl Classifier {
    /// Wrap a configuration after validating it.
    ///
    /// # Errors
    ///
    /// [`NbcError::InvalidConfig`].
    pub fn new(config: NbcConfig) -> Result<Self, NbcError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &NbcConfig {
        &self.config
    }

    /// Check priors and build a tree with the configured leaf size.
    ///
    /// # Errors
    ///
    /// [`NbcError::InvalidPoint`] for a prior outside `[0, 1]`, and
    /// [`NbcError::Engine`] for points the tree rejects (empty set, mixed
    /// dimensions, non-finite coordinates).
    pub fn build_tree(&self, points: Vec<NbcPoint>) -> Result<NbcTree, NbcError> {
        validate_priors(&points)?;
        Ok(SpatialTree::build(points, self.config.leaf_size)?)
    }

    /// Classify `query` against `reference`.
    ///
    /// # Errors
    ///
    /// See [`build_tree`](Self::build_tree) and [`run_traversal`].
    pub fn classify(
        &self,
        query: Vec<NbcPoint>,
        reference: Vec<NbcPoint>,
    ) -> Result<Classification, NbcError> {
        let query = self.build_tree(query)?;
        let reference = self.build_tree(reference)?;
        run_traversal(&query, &reference, &self.config)
    }

    /// Classify every point against the whole set, itself included.
    ///
    /// # Errors
    ///
    /// See [`build_tree`](Self::build_tree) and [`run_traversal`].
    pub fn classify_monochromatic(
        &self,
        points: Vec<NbcPoint>,
    ) -> Result<Classification, NbcError> {
        let tree = self.build_tree(points)?;
        run_traversal(&tree, &tree, &self.config)
    }
}

pub(crate) fn validate_priors(points: &[NbcPoint]) -> Result<(), NbcError> {
    for (index, p) in points.iter().enumerate() {
        check_prior(index, p)?;
    }
    Ok(())
}

fn check_prior(index: usize, point: &NbcPoint) -> Result<(), NbcError> {
    if (0.0..=1.0).contains(&point.prior) {
        Ok(())
    } else {
        Err(NbcError::InvalidPoint {
            index,
            reason: "prior must lie in [0, 1]",
        })
    }
}
