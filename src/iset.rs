// SPDX-License-Identifier: MPL-2.0

//! Interval sets are unions of disjoint half-open intervals `[lo, hi)`
//! over a totally ordered point type.
//!
//! They are the reference building block for concrete
//! [Requirement](crate::Requirement) implementations: any version-range
//! language whose points are `Ord` can be modeled as an interval set.
//!
//! The representation is a flat, sorted list holding an even number of
//! points `[p0, p1, p2, p3, ...]`, denoting `[p0,p1) ∪ [p2,p3) ∪ ...`.
//! All set operations keep that invariant.

use std::fmt::{Debug, Display, Formatter};

use thiserror::Error;

/// Error returned when an interval is malformed, i.e. its high endpoint
/// is below its low endpoint. This is a caller bug and fatal for the
/// construction that produced it.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("invalid interval: high endpoint {high} is below low endpoint {low}")]
pub struct InvalidIntervalError {
    /// Debug rendering of the offending low endpoint.
    pub low: String,
    /// Debug rendering of the offending high endpoint.
    pub high: String,
}

/// A set of disjoint half-open intervals over a totally ordered point
/// type.
///
/// Interval sets are immutable value objects: hashable, comparable and
/// cheap to clone. Set operations are closed over the representation.
/// Callers needing a custom point order wrap their points in a newtype
/// with the desired [Ord].
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct IntervalSet<P> {
    points: Vec<P>,
}

impl<P> IntervalSet<P> {
    /// The empty set.
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// `true` if no point is contained in the set.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate the component intervals `[lo, hi)` from least to
    /// greatest. Each yielded interval is disjoint from the others.
    pub fn intervals(&self) -> impl Iterator<Item = (&P, &P)> {
        self.points.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }
}

impl<P: Ord + Clone + Debug> IntervalSet<P> {
    /// Build a set from the union of the given intervals.
    ///
    /// Intervals may be given in any order and may overlap. A zero-width
    /// interval (`lo == hi`) denotes the empty set and contributes
    /// nothing. An interval with `hi < lo` is rejected.
    pub fn new(
        intervals: impl IntoIterator<Item = (P, P)>,
    ) -> Result<Self, InvalidIntervalError> {
        let mut set = Self::empty();
        for (lo, hi) in intervals {
            if hi < lo {
                return Err(InvalidIntervalError {
                    low: format!("{:?}", lo),
                    high: format!("{:?}", hi),
                });
            }
            set.insert_interval(lo, hi);
        }
        Ok(set)
    }

    /// The set containing the single interval `[lo, hi)`.
    pub fn interval(lo: P, hi: P) -> Result<Self, InvalidIntervalError> {
        Self::new([(lo, hi)])
    }

    /// `true` if the given point lies within any component interval.
    ///
    /// A point is inside exactly when an odd number of boundary points
    /// sit at or below it.
    pub fn contains(&self, p: &P) -> bool {
        self.points.partition_point(|x| x <= p) % 2 == 1
    }

    /// The union of two sets: every point of `self` and every point of
    /// `other`.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (lo, hi) in other.intervals() {
            out.insert_interval(lo.clone(), hi.clone());
        }
        out
    }

    /// The intersection of two sets: only the points contained by both.
    pub fn intersection(&self, other: &Self) -> Self {
        let a = &self.points;
        let b = &other.points;
        let mut out = Self::empty();
        let (mut i, mut j) = (0, 0);
        // Two-pointer merge over the sorted interval lists: emit each
        // overlap and drop whichever interval ends first.
        while i < a.len() && j < b.len() {
            let (a_lo, a_hi) = (&a[i], &a[i + 1]);
            let (b_lo, b_hi) = (&b[j], &b[j + 1]);
            let lo = a_lo.max(b_lo);
            let hi = a_hi.min(b_hi);
            if lo < hi {
                out.insert_interval(lo.clone(), hi.clone());
            }
            if a_hi <= b_hi {
                i += 2;
            }
            if b_hi <= a_hi {
                j += 2;
            }
        }
        out
    }

    /// The difference `self \ other`: the points of `self` not contained
    /// in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (lo, hi) in other.intervals() {
            out.remove_interval(lo, hi);
        }
        out
    }

    /// Splice `[lo, hi)` into the point list so that every point of the
    /// interval is covered afterwards.
    ///
    /// `left` counts the points at or below `lo`, `right` the points
    /// strictly below `hi`; their parities say whether each boundary
    /// currently falls inside the set, which decides which boundaries
    /// survive the splice.
    fn insert_interval(&mut self, lo: P, hi: P) {
        if hi <= lo {
            return;
        }
        let left = self.points.partition_point(|x| *x <= lo);
        let right = self.points.partition_point(|x| *x < hi);
        let starts_within = left % 2 == 1;
        let ends_within = right % 2 == 1;
        match (starts_within, ends_within) {
            (true, true) => {
                self.points.splice(left..right, std::iter::empty());
            }
            (true, false) => {
                self.points.splice(left..right, [hi]);
            }
            (false, true) => {
                self.points.splice(left..right, [lo]);
            }
            (false, false) => {
                self.points.splice(left..right, [lo, hi]);
            }
        }
    }

    /// Remove every point of `[lo, hi)` from the set. Dual of
    /// [insert_interval](Self::insert_interval), with the splice choices
    /// mirrored by parity.
    fn remove_interval(&mut self, lo: &P, hi: &P) {
        if hi <= lo {
            return;
        }
        let left = self.points.partition_point(|x| x <= lo);
        let right = self.points.partition_point(|x| x < hi);
        let starts_within = left % 2 == 1;
        let ends_within = right % 2 == 1;
        match (starts_within, ends_within) {
            (true, true) => {
                self.points.splice(left..right, [lo.clone(), hi.clone()]);
            }
            (true, false) => {
                self.points.splice(left..right, [lo.clone()]);
            }
            (false, true) => {
                self.points.splice(left..right, [hi.clone()]);
            }
            (false, false) => {
                self.points.splice(left..right, std::iter::empty());
            }
        }
        // Removing along an existing boundary leaves zero-width chunks
        // behind; the representation keeps only real intervals.
        let mut idx = 0;
        while idx + 1 < self.points.len() {
            if self.points[idx] == self.points[idx + 1] {
                self.points.drain(idx..idx + 2);
            } else {
                idx += 2;
            }
        }
    }
}

// REPORT ######################################################################

impl<P: Display> Display for IntervalSet<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.points.is_empty() {
            return write!(f, "∅");
        }
        for (idx, pair) in self.points.chunks_exact(2).enumerate() {
            if idx > 0 {
                write!(f, " ∪ ")?;
            }
            write!(f, "[{}, {})", pair[0], pair[1])?;
        }
        Ok(())
    }
}

// SERIALIZATION ###############################################################

#[cfg(feature = "serde")]
impl<'de, P: serde::Deserialize<'de> + Ord> serde::Deserialize<'de> for IntervalSet<P> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        let points: Vec<P> = serde::Deserialize::deserialize(deserializer)?;
        if points.len() % 2 != 0 {
            return Err(D::Error::custom("odd number of interval boundary points"));
        }
        if !points.windows(2).all(|w| w[0] <= w[1]) {
            return Err(D::Error::custom("interval boundary points out of order"));
        }
        Ok(IntervalSet { points })
    }
}

// TESTS #######################################################################
