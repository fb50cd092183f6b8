// Copyright 2025 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The label-candidate set.

use thicket_dualtree::DualTreeError;
use tracing::error;

use crate::point::Class;

bitflags::bitflags! {
    /// Labels a query can still receive.
    ///
    /// Starts at [`EITHER`](Self::EITHER) and only ever shrinks. A singleton
    /// is a final answer; `EITHER` at the end of a run means undecided. The
    /// empty set is never a legitimate state, see [`narrow`](Self::narrow).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Labels: u8 {
        /// The query may be positive.
        const POSITIVE = 0b01;
        /// The query may be negative.
        const NEGATIVE = 0b10;
        /// Nothing decided yet.
        const EITHER = Self::POSITIVE.bits() | Self::NEGATIVE.bits();
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::EITHER
    }
}

impl Labels {
    /// The singleton for `class`.
    pub const fn only(class: Class) -> Self {
        match class {
            Class::Positive => Self::POSITIVE,
            Class::Negative => Self::NEGATIVE,
        }
    }

    /// Intersect with `other`.
    ///
    /// # Errors
    ///
    /// [`DualTreeError::ConflictingLabels`] if nothing would remain; the set
    /// is left unchanged.
    pub fn narrow(&mut self, other: Self) -> Result<(), DualTreeError> {
        let narrowed = *self & other;
        if narrowed.is_empty() {
            error!(
                current = self.bits(),
                incoming = other.bits(),
                "label candidates narrowed to nothing"
            );
            return Err(DualTreeError::ConflictingLabels {
                current: u32::from(self.bits()),
                incoming: u32::from(other.bits()),
            });
        }
        *self = narrowed;
        Ok(())
    }

    /// Whether exactly one label remains.
    pub fn is_decided(self) -> bool {
        self == Self::POSITIVE || self == Self::NEGATIVE
    }

    /// The remaining label, if only one does.
    pub fn decision(self) -> Option<Class> {
        if self == Self::POSITIVE {
            Some(Class::Positive)
        } else if self == Self::NEGATIVE {
            Some(Class::Negative)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_keeps_the_intersection() {
        let mut l = Labels::default();
        assert!(!l.is_decided());
        l.narrow(Labels::EITHER).unwrap();
        assert_eq!(l, Labels::EITHER);
        l.narrow(Labels::only(Class::Negative)).unwrap();
        assert_eq!(l.decision(), Some(Class::Negative));
        l.narrow(Labels::NEGATIVE).unwrap();
        assert!(l.is_decided());
    }

    #[test]
    fn empty_intersection_is_an_error() {
        let mut l = Labels::POSITIVE;
        let err = l.narrow(Labels::NEGATIVE).unwrap_err();
        assert_eq!(
            err,
            DualTreeError::ConflictingLabels {
                current: 0b01,
                incoming: 0b10
            }
        );
        assert_eq!(l, Labels::POSITIVE);
    }
}
