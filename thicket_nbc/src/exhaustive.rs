// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadratic reference classifier.

use alloc::vec::Vec;

use thicket_dualtree::{DualTreeError, Range};

use crate::classifier::validate_priors;
use crate::config::NbcConfig;
use crate::error::NbcError;
use crate::param::NbcParam;
use crate::point::{ByClass, Class, NbcPoint};
use crate::result::{NbcResult, NbcTally};
use crate::stat::dist_sq;

/// Classify every query by summing the kernel over every reference point,
/// with the same decision rule as the tree-based run.
///
/// Useful as ground truth and as a baseline for small inputs.
///
/// # Errors
///
/// The same validation errors as
/// [`Classifier::classify`](crate::Classifier::classify).
pub fn classify_exhaustive(
    query: &[NbcPoint],
    reference: &[NbcPoint],
    config: &NbcConfig,
) -> Result<(Vec<NbcResult>, NbcTally), NbcError> {
    if query.is_empty() {
        return Err(DualTreeError::DegenerateInput {
            reason: "empty point set",
        }
        .into());
    }
    let Some(first) = reference.first() else {
        return Err(DualTreeError::DegenerateInput {
            reason: "empty point set",
        }
        .into());
    };
    let dim = first.coords.len();
    if query
        .iter()
        .chain(reference)
        .any(|p| p.coords.len() != dim)
    {
        return Err(DualTreeError::DegenerateInput {
            reason: "query and reference points differ in dimension",
        }
        .into());
    }
    if query
        .iter()
        .chain(reference)
        .any(|p| p.coords.iter().any(|c| !c.is_finite()))
    {
        return Err(DualTreeError::DegenerateInput {
            reason: "non-finite coordinate",
        }
        .into());
    }
    validate_priors(query)?;

    let count = |class| reference.iter().filter(|p| p.class == class).count();
    let param = NbcParam::new(config, dim, count(Class::Positive), count(Class::Negative))?;

    let results: Vec<NbcResult> = query
        .iter()
        .map(|q| {
            let mut sums = ByClass {
                positive: 0.0,
                negative: 0.0,
            };
            for r in reference {
                sums[r.class] += param
                    .kernel(r.class)
                    .eval_unnorm_on_sq(dist_sq(&q.coords, &r.coords));
            }
            let density = ByClass::from_fn(|c| Range::point(sums[c]));
            NbcResult {
                labels: param.decide_point(&density, q.prior),
                density,
            }
        })
        .collect();
    let tally = NbcTally::from_results(&results);
    Ok((results, tally))
}
