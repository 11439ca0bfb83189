// SPDX-License-Identifier: MPL-2.0

//! Trait describing the requirement objects manipulated by the solver.
//!
//! A requirement is a predicate over an opaque version space, grouped
//! with other requirements on the same package by a shared [key](Requirement::key).
//! Implement this trait to customize the types the solver works on;
//! the bundled [IntervalSet](crate::IntervalSet) is the reference
//! building block for concrete implementations.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A predicate set over the versions of one package.
///
/// Requirements are value objects: immutable, equality-comparable and
/// cheaply cloneable. The set operators must only ever be applied to two
/// requirements sharing the same key; the solver guarantees this.
pub trait Requirement: Clone + Eq + Debug + Display {
    /// Identifier shared by every requirement over the same package.
    type Key: Clone + Eq + Ord + Hash + Debug;

    /// The key grouping this requirement with its siblings.
    fn key(&self) -> &Self::Key;

    /// `true` iff any version satisfying `other` also satisfies `self`,
    /// i.e. `other ⊆ self`.
    fn implied_by(&self, other: &Self) -> bool;

    /// The set of versions satisfying both `self` and `other`.
    fn intersection(&self, other: &Self) -> Self;

    /// The set of versions satisfying `self`, `other`, or both.
    fn union(&self, other: &Self) -> Self;

    /// The set of versions satisfying `self` but not `other`.
    fn difference(&self, other: &Self) -> Self;

    /// `true` if no version at all can satisfy this requirement
    /// (the empty set).
    fn is_unsatisfiable(&self) -> bool;

    /// `true` if `self` and `other` are mutually exclusive.
    fn excludes(&self, other: &Self) -> bool {
        self.intersection(other).is_unsatisfiable()
    }
}
