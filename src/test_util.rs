// SPDX-License-Identifier: MPL-2.0

//! Requirement implementation shared by the unit tests: a package name
//! plus an interval set of admissible versions.

use std::fmt;

use crate::iset::IntervalSet;
use crate::requirement::Requirement;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub(crate) struct Req {
    pub(crate) key: &'static str,
    pub(crate) versions: IntervalSet<u32>,
}

impl Req {
    pub(crate) fn new(key: &'static str, versions: IntervalSet<u32>) -> Self {
        Self { key, versions }
    }

    /// Requirement over explicit intervals.
    pub(crate) fn ranges(key: &'static str, intervals: &[(u32, u32)]) -> Self {
        Self::new(key, IntervalSet::new(intervals.iter().copied()).unwrap())
    }

    /// Requirement over a discrete version set.
    pub(crate) fn versions(key: &'static str, versions: &[u32]) -> Self {
        Self::new(
            key,
            IntervalSet::new(versions.iter().map(|&v| (v, v + 1))).unwrap(),
        )
    }
}

impl fmt::Display for Req {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.versions)
    }
}

impl Requirement for Req {
    type Key = &'static str;

    fn key(&self) -> &Self::Key {
        &self.key
    }

    fn implied_by(&self, other: &Self) -> bool {
        other.versions.difference(&self.versions).is_empty()
    }

    fn intersection(&self, other: &Self) -> Self {
        Self::new(self.key, self.versions.intersection(&other.versions))
    }

    fn union(&self, other: &Self) -> Self {
        Self::new(self.key, self.versions.union(&other.versions))
    }

    fn difference(&self, other: &Self) -> Self {
        Self::new(self.key, self.versions.difference(&other.versions))
    }

    fn is_unsatisfiable(&self) -> bool {
        self.versions.is_empty()
    }
}
