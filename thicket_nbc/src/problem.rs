// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The classifier as a dual-tree problem.
//!
//! Pair rule, per class present in the reference node:
//!
//! - if no class's box comes within its bandwidth of the query region, the
//!   pair is excluded;
//! - if every class's box lies strictly within its bandwidth of the whole
//!   query region, the reference moments are included and later evaluated in
//!   closed form;
//! - otherwise the pair recurses with a density interval from the box
//!   distances.
//!
//! A query subtree settles once the node-level density intervals decide its
//! label for every prior in the subtree.

use thicket_dualtree::{Consideration, DualTreeError, DualTreeProblem, NodeRef, Range};
use tracing::trace;

use crate::labels::Labels;
use crate::param::NbcParam;
use crate::point::{ByClass, Class, NbcPoint};
use crate::result::{NbcDelta, NbcPostponed, NbcResult, NbcTally};
use crate::stat::{NbcStat, dist_sq};

/// Two-class nonparametric Bayes classification.
#[derive(Clone, Debug)]
pub struct Nbc {
    param: NbcParam,
}

impl Nbc {
    /// Classifier for the given run constants.
    pub fn new(param: NbcParam) -> Self {
        Self { param }
    }

    /// The run constants.
    pub fn param(&self) -> &NbcParam {
        &self.param
    }

    /// Exact contribution of postponed moments at `q`.
    fn exact_postponed(
        &self,
        q: &NbcPoint,
        postponed: &NbcPostponed,
    ) -> Result<ByClass<Range>, DualTreeError> {
        let mut density = ByClass::<Range>::default();
        for class in Class::ALL {
            let moments = &postponed.moments[class];
            if !moments.is_empty() {
                density[class] += moments.kernel_sum(self.param.kernel(class), &q.coords)?;
            }
        }
        Ok(density)
    }
}

impl DualTreeProblem for Nbc {
    type QPoint = NbcPoint;
    type RPoint = NbcPoint;
    type QStat = NbcStat;
    type RStat = NbcStat;
    type Delta = NbcDelta;
    type Postponed = NbcPostponed;
    type QResult = NbcResult;
    type GlobalResult = NbcTally;

    fn empty_postponed(&self) -> NbcPostponed {
        NbcPostponed::empty(self.param.dim())
    }

    fn consider_pair(
        &self,
        q: NodeRef<'_, NbcPoint, NbcStat>,
        r: NodeRef<'_, NbcPoint, NbcStat>,
    ) -> Result<Consideration<NbcDelta, NbcPostponed>, DualTreeError> {
        let region = q.bound();
        let stat = r.stat();
        let mut delta = NbcDelta::default();
        let mut reaches = false;
        let mut within = true;
        for class in Class::ALL {
            if stat.count(class) == 0 {
                continue;
            }
            let kernel = self.param.kernel(class);
            let bound = &stat.class(class).bound;
            let n = stat.count(class) as f64;
            let near = kernel.eval_unnorm_on_sq(bound.min_distance_sq(region));
            let max_dist_sq = bound.max_distance_sq(region);
            reaches |= near > 0.0;
            within &= max_dist_sq < kernel.bandwidth_sq();
            delta.density[class] =
                Range::new(n * kernel.eval_unnorm_on_sq(max_dist_sq), n * near);
        }

        Ok(if !reaches {
            Consideration::Exclude
        } else if within {
            Consideration::Include(NbcPostponed {
                moments: ByClass::from_fn(|c| stat.class(c).moments.clone()),
                labels: Labels::EITHER,
            })
        } else {
            Consideration::Recurse(delta)
        })
    }

    fn consider_termination(
        &self,
        q: NodeRef<'_, NbcPoint, NbcStat>,
        postponed: &mut NbcPostponed,
        unvisited: &NbcDelta,
    ) -> Result<bool, DualTreeError> {
        if postponed.labels.is_decided() {
            return Ok(true);
        }
        let mut density = unvisited.density.clone();
        for class in Class::ALL {
            let moments = &postponed.moments[class];
            if !moments.is_empty() {
                density[class] +=
                    moments.kernel_sum_range(self.param.kernel(class), q.bound())?;
            }
        }
        let verdict = self.param.decide(&density, q.stat().pi_pos(), q.stat().pi_neg());
        if verdict == Labels::EITHER {
            return Ok(false);
        }
        trace!(
            node = q.idx().get(),
            points = q.len(),
            positive = verdict == Labels::POSITIVE,
            "query subtree decided"
        );
        postponed.labels.narrow(verdict)?;
        Ok(true)
    }

    fn settled_result(
        &self,
        q: &NbcPoint,
        postponed: &NbcPostponed,
        unvisited: &NbcDelta,
    ) -> Result<NbcResult, DualTreeError> {
        let mut density = self.exact_postponed(q, postponed)?;
        for class in Class::ALL {
            density[class] += unvisited.density[class];
        }
        Ok(NbcResult {
            density,
            labels: postponed.labels,
        })
    }

    fn start_point(
        &self,
        q: &NbcPoint,
        postponed: &NbcPostponed,
    ) -> Result<NbcResult, DualTreeError> {
        Ok(NbcResult {
            density: self.exact_postponed(q, postponed)?,
            labels: postponed.labels,
        })
    }

    fn refine_point(
        &self,
        q: &NbcPoint,
        result: &mut NbcResult,
        unvisited: &NbcDelta,
    ) -> Result<(), DualTreeError> {
        let mut total = result.density.clone();
        for class in Class::ALL {
            total[class] += unvisited.density[class];
        }
        if !result.labels.is_decided() {
            let verdict = self.param.decide_point(&total, q.prior);
            if verdict == Labels::EITHER {
                return Ok(());
            }
            result.labels.narrow(verdict)?;
        }
        // Decided: nothing more is visited, so keep the full interval.
        result.density = total;
        Ok(())
    }

    fn is_settled(&self, result: &NbcResult) -> bool {
        result.labels.is_decided()
    }

    fn visit_leaf(
        &self,
        q: &NbcPoint,
        result: &mut NbcResult,
        r: NodeRef<'_, NbcPoint, NbcStat>,
    ) -> Result<(), DualTreeError> {
        let stat = r.stat();
        let mut pairwise = ByClass {
            positive: false,
            negative: false,
        };
        for class in Class::ALL {
            if stat.count(class) == 0 {
                continue;
            }
            let kernel = self.param.kernel(class);
            let summary = stat.class(class);
            if summary.bound.min_distance_sq_point(&q.coords) >= kernel.bandwidth_sq() {
                continue;
            }
            if summary.bound.max_distance_sq_point(&q.coords) < kernel.bandwidth_sq() {
                result.density[class] += summary.moments.kernel_sum(kernel, &q.coords)?;
            } else {
                pairwise[class] = true;
            }
        }
        if !(pairwise.positive || pairwise.negative) {
            return Ok(());
        }

        let mut sums = ByClass {
            positive: 0.0,
            negative: 0.0,
        };
        for p in r.points() {
            if pairwise[p.class] {
                sums[p.class] += self
                    .param
                    .kernel(p.class)
                    .eval_unnorm_on_sq(dist_sq(&q.coords, &p.coords));
            }
        }
        for class in Class::ALL {
            result.density[class] += sums[class];
        }
        Ok(())
    }
}
