// SPDX-License-Identifier: MPL-2.0

//! An incompatibility is a set of terms for different packages
//! that should never be satisfied all together.

use std::fmt;
use std::sync::Arc;

use crate::requirement::Requirement;
use crate::term::Term;

/// An incompatibility is a conjunction of terms, at most one per key,
/// that should never be satisfied all together.
///
/// An incompatibility usually originates from a package dependency. For
/// example, if package A at version 1 depends on package B at version 2,
/// you can never have both terms `A = 1` and `not B = 2` satisfied at the
/// same time in a partial solution: that would mean A 1 is selected but
/// B 2 is not, contradicting the dependency. The set
/// `{ A = 1, not B = 2 }` is therefore an incompatibility.
///
/// Incompatibilities are also derived from two other incompatibilities
/// during conflict resolution; the chain of derivations forms the DAG
/// walked by the [report generator](crate::report::generate_report).
#[derive(Debug, Clone)]
pub struct Incompatibility<R: Requirement> {
    terms: Vec<Term<R>>,
    cause: Cause<R>,
}

/// The provenance of an incompatibility.
#[derive(Debug, Clone)]
pub enum Cause<R: Requirement> {
    /// States that a root requirement must be satisfied
    /// (a single negative term over the root requirement).
    Root,
    /// The provider has no candidate for this requirement
    /// (a single positive term).
    Unavailable,
    /// A selected parent implies a child requirement (a positive term on
    /// the parent, a negative term on the child).
    Dependency,
    /// Derived from two prior incompatibilities during conflict
    /// resolution.
    Conflict {
        /// The incompatibility being resolved.
        left: Arc<Incompatibility<R>>,
        /// The cause of the satisfier that was resolved away.
        right: Arc<Incompatibility<R>>,
    },
}

impl<R: Requirement> Incompatibility<R> {
    /// Build an incompatibility from terms, folding terms sharing a key
    /// into their intersection.
    pub fn new(terms: impl IntoIterator<Item = Term<R>>, cause: Cause<R>) -> Self {
        let mut terms: Vec<Term<R>> = terms.into_iter().collect();
        terms.sort_by(|a, b| a.key().cmp(b.key()));
        let mut folded: Vec<Term<R>> = Vec::with_capacity(terms.len());
        for term in terms {
            if let Some(prev) = folded.last_mut() {
                if prev.key() == term.key() {
                    *prev = prev.intersection(&term);
                    // An empty fold would make the conjunction trivially
                    // true, which no caller should ever construct.
                    debug_assert!(!prev.is_unsatisfiable());
                    continue;
                }
            }
            folded.push(term);
        }
        Self {
            terms: folded,
            cause,
        }
    }

    /// The terms of the conjunction, ordered by key.
    pub fn terms(&self) -> &[Term<R>] {
        &self.terms
    }

    /// The provenance of this incompatibility.
    pub fn cause(&self) -> &Cause<R> {
        &self.cause
    }

    /// `true` if this incompatibility was produced by conflict
    /// resolution rather than by an external fact.
    pub fn is_derived(&self) -> bool {
        matches!(self.cause, Cause::Conflict { .. })
    }

    /// Get the term related to a given key, if any.
    pub fn get(&self, key: &R::Key) -> Option<&Term<R>> {
        self.terms
            .binary_search_by(|term| term.key().cmp(key))
            .ok()
            .map(|idx| &self.terms[idx])
    }
}

impl<R: Requirement> fmt::Display for Incompatibility<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, term) in self.terms.iter().enumerate() {
            if idx > 0 {
                write!(f, " ∧ ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, "}}")
    }
}

// TESTS #######################################################################
