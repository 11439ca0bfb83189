// SPDX-License-Identifier: MPL-2.0

//! A term is the fundamental unit of operation of the solving algorithm.
//! It is a positive or negative expression regarding a requirement.

use std::fmt;

use crate::requirement::Requirement;

/// A positive or negative expression regarding a requirement.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Term<R: Requirement> {
    /// For example, "1.0.0 <= v < 2.0.0" is a positive expression
    /// that is evaluated true if a version is selected
    /// and comprised between version 1.0.0 and version 2.0.0.
    Positive(R),
    /// The term "not v < 3.0.0" is a negative expression
    /// that is evaluated true if a version is selected >= 3.0.0
    /// or if no version is selected at all.
    Negative(R),
}

/// Base methods.
impl<R: Requirement> Term<R> {
    /// The key of the underlying requirement.
    pub fn key(&self) -> &R::Key {
        self.requirement().key()
    }

    /// The underlying requirement, sign stripped.
    pub fn requirement(&self) -> &R {
        match self {
            Self::Positive(req) => req,
            Self::Negative(req) => req,
        }
    }

    /// Simply check if a term is positive.
    pub fn is_positive(&self) -> bool {
        match self {
            Self::Positive(_) => true,
            Self::Negative(_) => false,
        }
    }

    /// Negate a term.
    /// Evaluation of a negated term always returns
    /// the opposite of the evaluation of the original one.
    pub fn negate(&self) -> Self {
        match self {
            Self::Positive(req) => Self::Negative(req.clone()),
            Self::Negative(req) => Self::Positive(req.clone()),
        }
    }

    /// A term that no version can ever satisfy. A negative term over the
    /// empty requirement is the tautology instead, satisfied by anything.
    pub fn is_unsatisfiable(&self) -> bool {
        match self {
            Self::Positive(req) => req.is_unsatisfiable(),
            Self::Negative(_) => false,
        }
    }
}

/// Set operations with terms.
impl<R: Requirement> Term<R> {
    /// Compute the intersection of two terms.
    /// If at least one term is positive, the intersection is also positive.
    pub fn intersection(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Positive(r1), Self::Positive(r2)) => Self::Positive(r1.intersection(r2)),
            (Self::Positive(r1), Self::Negative(r2)) => Self::Positive(r1.difference(r2)),
            (Self::Negative(r1), Self::Positive(r2)) => Self::Positive(r2.difference(r1)),
            (Self::Negative(r1), Self::Negative(r2)) => {
                let union = r1.union(r2);
                // A union covering the whole version space has no
                // negative-term representation. The algorithm never
                // intersects two negatives whose union is total, so only
                // the observable half of that precondition is checked.
                assert!(
                    !union.is_unsatisfiable(),
                    "unrepresentable intersection of negative terms over {:?}",
                    r1.key(),
                );
                Self::Negative(union)
            }
        }
    }

    /// Compute the difference `self \ other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.intersection(&other.negate())
    }

    /// `true` iff `self` must hold whenever `other` holds.
    pub fn implied_by(&self, other: &Self) -> bool {
        if self.key() != other.key() {
            return false;
        }
        match (self, other) {
            (Self::Positive(r1), Self::Positive(r2)) => r1.implied_by(r2),
            // No negative term can entail a selection.
            (Self::Positive(_), Self::Negative(_)) => false,
            (Self::Negative(r1), Self::Positive(r2)) => r1.excludes(r2),
            (Self::Negative(r1), Self::Negative(r2)) => r2.implied_by(r1),
        }
    }

    /// `true` iff `other` must hold whenever `self` holds.
    pub fn implies(&self, other: &Self) -> bool {
        other.implied_by(self)
    }

    /// `true` iff no selection (or absence of one) can satisfy both terms.
    pub fn excludes(&self, other: &Self) -> bool {
        if self.key() != other.key() {
            // Unrelated terms cannot exclude each other.
            return false;
        }
        match (self, other) {
            (Self::Positive(r1), Self::Positive(r2)) => r1.excludes(r2),
            (Self::Positive(_), Self::Negative(_)) => other.excludes(self),
            (Self::Negative(r1), Self::Positive(r2)) => r1.implied_by(r2),
            // Two negative terms are both satisfied by selecting nothing.
            (Self::Negative(_), Self::Negative(_)) => false,
        }
    }

    /// Compare this term to another term over the same key.
    pub fn relation_to(&self, other: &Self) -> SetRelation {
        if self.implies(other) {
            SetRelation::Subset
        } else if self.excludes(other) {
            SetRelation::Disjoint
        } else {
            SetRelation::Overlap
        }
    }
}

/// How one term relates to another, viewed as sets of admissible
/// selections.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SetRelation {
    /// The terms cannot be satisfied together.
    Disjoint,
    /// The terms share some admissible selections, but neither contains
    /// the other.
    Overlap,
    /// Every selection admissible for the first term is admissible for
    /// the second.
    Subset,
}

// REPORT ######################################################################

impl<R: Requirement> fmt::Display for Term<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive(req) => write!(f, "{}", req),
            Self::Negative(req) => write!(f, "not ( {} )", req),
        }
    }
}

// TESTS #######################################################################
