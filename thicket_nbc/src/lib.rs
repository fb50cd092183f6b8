// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket NBC: two-class nonparametric Bayes classification on the Thicket
//! dual-tree engine.
//!
//! Each class's density at a query is an Epanechnikov kernel density estimate
//! over that class's reference points. A query is labeled positive when the
//! prior-weighted positive density clears a threshold on the posterior, with
//! a small tolerance band around the threshold in which it stays undecided.
//!
//! The classifier never needs the densities themselves, only which side of
//! the threshold they fall on. The dual-tree traversal therefore keeps an
//! interval on each density and stops as soon as the interval settles the
//! label, for single queries and for whole query subtrees alike. Labels match
//! an exhaustive evaluation ([`classify_exhaustive`]).
//!
//! - [`NbcConfig`]: bandwidths, threshold, tolerance, and leaf size.
//! - [`Classifier`]: builds trees and runs classifications.
//! - [`run_traversal`]: classification over prebuilt trees.
//! - [`Nbc`]: the [`DualTreeProblem`](thicket_dualtree::DualTreeProblem)
//!   implementation, for callers driving the engine directly.
//!
//! # Example
//!
//! ```rust
//! use thicket_nbc::{Class, Classifier, NbcConfig, NbcPoint};
//!
//! let reference = vec![
//!     NbcPoint::reference(vec![0.0, 0.0], Class::Positive),
//!     NbcPoint::reference(vec![0.2, 0.1], Class::Positive),
//!     NbcPoint::reference(vec![3.0, 3.0], Class::Negative),
//!     NbcPoint::reference(vec![3.1, 2.9], Class::Negative),
//! ];
//! let query = vec![
//!     NbcPoint::query(vec![0.1, 0.1], 0.5),
//!     NbcPoint::query(vec![2.9, 3.0], 0.5),
//!     NbcPoint::query(vec![10.0, 10.0], 0.5),
//! ];
//!
//! let classifier = Classifier::new(NbcConfig::default()).unwrap();
//! let out = classifier.classify(query, reference).unwrap();
//! assert_eq!(out.results[0].label(), Some(Class::Positive));
//! assert_eq!(out.results[1].label(), Some(Class::Negative));
//! // Out of reach of every reference point.
//! assert_eq!(out.results[2].label(), None);
//! println!("{}", out.tally);
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`NbcConfig`], [`NbcTally`] and
//!   [`Class`].

#![no_std]

extern crate alloc;

mod classifier;
mod config;
mod error;
mod exhaustive;
pub mod kernel;
mod labels;
mod param;
mod point;
mod problem;
mod result;
mod stat;

pub use classifier::{Classification, Classifier, NbcTree, run_traversal};
pub use config::NbcConfig;
pub use error::NbcError;
pub use exhaustive::classify_exhaustive;
pub use kernel::Epanechnikov;
pub use labels::Labels;
pub use param::NbcParam;
pub use point::{ByClass, Class, NbcPoint};
pub use problem::Nbc;
pub use result::{NbcDelta, NbcPostponed, NbcResult, NbcTally};
pub use stat::{ClassSummary, MomentInfo, NbcStat};
