// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Points, classes, and per-class storage.

use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

use thicket_dualtree::TreePoint;

/// One of the two classes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Class {
    /// The positive class; its prior is the point's `prior`.
    Positive,
    /// The negative class; its prior is `1 - prior`.
    Negative,
}

impl Class {
    /// Both classes, positive first.
    pub const ALL: [Self; 2] = [Self::Positive, Self::Negative];
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        })
    }
}

/// A value per class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ByClass<T> {
    /// Value for [`Class::Positive`].
    pub positive: T,
    /// Value for [`Class::Negative`].
    pub negative: T,
}

impl<T> ByClass<T> {
    /// Build from one value per class.
    pub fn from_fn(mut f: impl FnMut(Class) -> T) -> Self {
        Self {
            positive: f(Class::Positive),
            negative: f(Class::Negative),
        }
    }
}

impl<T> Index<Class> for ByClass<T> {
    type Output = T;

    fn index(&self, class: Class) -> &T {
        match class {
            Class::Positive => &self.positive,
            Class::Negative => &self.negative,
        }
    }
}

impl<T> IndexMut<Class> for ByClass<T> {
    fn index_mut(&mut self, class: Class) -> &mut T {
        match class {
            Class::Positive => &mut self.positive,
            Class::Negative => &mut self.negative,
        }
    }
}

/// A labeled point with a positive-class prior.
///
/// Reference points contribute density to their `class`; query points are
/// classified using their `prior`. In monochromatic runs every point plays
/// both roles.
#[derive(Clone, Debug, PartialEq)]
pub struct NbcPoint {
    /// Coordinates.
    pub coords: Vec<f64>,
    /// Class, meaningful for reference points.
    pub class: Class,
    /// Prior of the positive class in `[0, 1]`, meaningful for query points.
    pub prior: f64,
}

impl NbcPoint {
    /// A point with every field given.
    pub fn new(coords: Vec<f64>, class: Class, prior: f64) -> Self {
        Self {
            coords,
            class,
            prior,
        }
    }

    /// A reference point with a neutral prior.
    pub fn reference(coords: Vec<f64>, class: Class) -> Self {
        Self::new(coords, class, 0.5)
    }

    /// A query point. Its class is never read.
    pub fn query(coords: Vec<f64>, prior: f64) -> Self {
        Self::new(coords, Class::Negative, prior)
    }

    /// Prior of `class` at this point.
    pub fn prior_of(&self, class: Class) -> f64 {
        match class {
            Class::Positive => self.prior,
            Class::Negative => 1.0 - self.prior,
        }
    }
}

impl TreePoint for NbcPoint {
    fn coords(&self) -> &[f64] {
        &self.coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn by_class_indexes_each_side() {
        let mut v = ByClass::from_fn(|c| if c == Class::Positive { 1 } else { 2 });
        v[Class::Negative] += 5;
        assert_eq!(v[Class::Positive], 1);
        assert_eq!(v[Class::Negative], 7);
    }

    #[test]
    fn priors_are_complementary() {
        let p = NbcPoint::query(vec![0.0], 0.25);
        assert_eq!(p.prior_of(Class::Positive), 0.25);
        assert_eq!(p.prior_of(Class::Negative), 0.75);
        assert_eq!(Class::Negative.to_string(), "negative");
    }
}
