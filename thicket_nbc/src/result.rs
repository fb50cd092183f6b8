// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values the classifier moves through the traversal.

use core::fmt;

use thicket_dualtree::{Delta, DualTreeError, GlobalResult, Postponed, Range};

use crate::labels::Labels;
use crate::point::{ByClass, Class, NbcPoint};
use crate::stat::MomentInfo;

/// Bound on the unnormalized density a pending reference node adds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NbcDelta {
    /// Density interval per class.
    pub density: ByClass<Range>,
}

impl Delta for NbcDelta {
    fn accumulate(&mut self, other: &Self) {
        for class in Class::ALL {
            self.density[class] += other.density[class];
        }
    }
}

/// Correction owned by a query node: the moments of every reference node
/// included wholesale, plus the labels already ruled out.
#[derive(Clone, Debug, PartialEq)]
pub struct NbcPostponed {
    /// Included reference moments per class.
    pub moments: ByClass<MomentInfo>,
    /// Labels still possible for every query below the node.
    pub labels: Labels,
}

impl NbcPostponed {
    /// The identity correction in `dim` dimensions.
    pub fn empty(dim: usize) -> Self {
        Self {
            moments: ByClass::from_fn(|_| MomentInfo::empty(dim)),
            labels: Labels::EITHER,
        }
    }
}

impl Postponed for NbcPostponed {
    fn merge(&mut self, other: &Self) -> Result<(), DualTreeError> {
        self.labels.narrow(other.labels)?;
        for class in Class::ALL {
            self.moments[class].add(&other.moments[class]);
        }
        Ok(())
    }

    fn reset(&mut self) {
        for class in Class::ALL {
            self.moments[class].reset();
        }
        self.labels = Labels::EITHER;
    }
}

/// Outcome for one query point.
#[derive(Clone, Debug, PartialEq)]
pub struct NbcResult {
    /// Unnormalized density per class. Exact (`lo == hi`) unless the query
    /// was decided before every reference point was accounted for.
    pub density: ByClass<Range>,
    /// Remaining label candidates.
    pub labels: Labels,
}

impl NbcResult {
    /// The decided class, or `None` if undecided.
    pub fn label(&self) -> Option<Class> {
        self.labels.decision()
    }
}

/// Counts of decided and undecided queries.
///
/// Its [`Display`](fmt::Display) implementation is the run report:
///
/// ```
/// use thicket_nbc::NbcTally;
///
/// let tally = NbcTally { positive: 3, negative: 1, undecided: 0, total: 4 };
/// assert!(tally.to_string().starts_with("count_pos: 3\npercent_pos: 75.00000\n"));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NbcTally {
    /// Queries labeled positive.
    pub positive: usize,
    /// Queries labeled negative.
    pub negative: usize,
    /// Queries left undecided.
    pub undecided: usize,
    /// All queries.
    pub total: usize,
}

impl NbcTally {
    /// Account for one finished query.
    pub fn record(&mut self, result: &NbcResult) {
        match result.label() {
            Some(Class::Positive) => self.positive += 1,
            Some(Class::Negative) => self.negative += 1,
            None => self.undecided += 1,
        }
        self.total += 1;
    }

    /// Tally a batch of results.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a NbcResult>) -> Self {
        let mut tally = Self::default();
        for r in results {
            tally.record(r);
        }
        tally
    }

    /// Percentage of queries labeled positive.
    pub fn percent_positive(&self) -> f64 {
        self.percent(self.positive)
    }

    /// Percentage of queries left undecided.
    pub fn percent_undecided(&self) -> f64 {
        self.percent(self.undecided)
    }

    fn percent(&self, n: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            n as f64 / self.total as f64 * 100.0
        }
    }
}

impl GlobalResult<NbcPoint, NbcResult> for NbcTally {
    fn accumulate(&mut self, _point: &NbcPoint, result: &NbcResult) {
        self.record(result);
    }

    fn merge(&mut self, other: &Self) {
        self.positive += other.positive;
        self.negative += other.negative;
        self.undecided += other.undecided;
        self.total += other.total;
    }
}

impl fmt::Display for NbcTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count_pos: {}", self.positive)?;
        writeln!(f, "percent_pos: {:.5}", self.percent_positive())?;
        writeln!(f, "count_neg: {}", self.negative)?;
        writeln!(f, "count_unknown: {}", self.undecided)?;
        write!(f, "percent_unknown: {:.5}", self.percent_undecided())
    }
}
