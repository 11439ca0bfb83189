// SPDX-License-Identifier: MPL-2.0

//! Entry points of the solving algorithm.
//!
//! [solve] finds a set of selections satisfying all the constraints of
//! the given root requirements, or explains as clearly as possible why
//! that is impossible. The requirement space is abstract: anything
//! implementing [Requirement] works, and candidates are supplied by a
//! [CandidateProvider].
//!
//! ```
//! # use pinion::{solve, CandidateProvider, IntervalSet, Requirement};
//! # use std::fmt;
//! #[derive(Debug, Clone, Eq, PartialEq)]
//! struct Dep {
//!     name: &'static str,
//!     versions: IntervalSet<u32>,
//! }
//! # impl fmt::Display for Dep {
//! #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//! #         write!(f, "{} {}", self.name, self.versions)
//! #     }
//! # }
//!
//! impl Requirement for Dep {
//!     type Key = &'static str;
//!     fn key(&self) -> &Self::Key {
//!         &self.name
//!     }
//!     // ...
//! #     fn implied_by(&self, other: &Self) -> bool {
//! #         other.versions.difference(&self.versions).is_empty()
//! #     }
//! #     fn intersection(&self, other: &Self) -> Self {
//! #         Dep { name: self.name, versions: self.versions.intersection(&other.versions) }
//! #     }
//! #     fn union(&self, other: &Self) -> Self {
//! #         Dep { name: self.name, versions: self.versions.union(&other.versions) }
//! #     }
//! #     fn difference(&self, other: &Self) -> Self {
//! #         Dep { name: self.name, versions: self.versions.difference(&other.versions) }
//! #     }
//! #     fn is_unsatisfiable(&self) -> bool {
//! #         self.versions.is_empty()
//! #     }
//! }
//!
//! /// One package at one version, with its dependencies.
//! struct Repo(Vec<(Dep, Vec<Dep>)>);
//!
//! impl CandidateProvider<Dep> for Repo {
//!     fn best_candidate(&self, req: &Dep) -> Option<(Dep, Vec<Dep>)> {
//!         self.0
//!             .iter()
//!             .find(|(cand, _)| req.implied_by(cand))
//!             .cloned()
//!     }
//! }
//!
//! let repo = Repo(vec![(
//!     Dep { name: "foo", versions: IntervalSet::interval(2, 3).unwrap() },
//!     vec![],
//! )]);
//! let req = Dep { name: "foo", versions: IntervalSet::interval(1, 5).unwrap() };
//! let solution = solve([req], &repo).unwrap();
//! assert_eq!(solution.len(), 1);
//! ```

use crate::error::SolveError;
use crate::incompatibility::Incompatibility;
use crate::internal::State;
use crate::requirement::Requirement;
use crate::term::Term;

/// Supplies candidate selections for requirements.
///
/// Implementations typically consult a package index, a filesystem or a
/// remote registry. The solver calls this synchronously, one requirement
/// at a time, in a deterministic order.
pub trait CandidateProvider<R: Requirement> {
    /// Find the selection that best matches the given requirement,
    /// together with that selection's own dependencies.
    ///
    /// The returned requirement must satisfy `req`
    /// (`req.implied_by(&chosen)`), must share its key, and should match
    /// as few versions as possible, ideally exactly one. Returning
    /// `None` states that no candidate exists for `req`; the solver
    /// records that fact and works around it or fails with a proof.
    ///
    /// The order of the dependency sequence is preserved. A dependency
    /// carrying the candidate's own key is a usage error.
    fn best_candidate(&self, req: &R) -> Option<(R, Vec<R>)>;
}

/// Observer of solver events.
///
/// All callbacks default to doing nothing; implement the ones of
/// interest. [TraceLogger] forwards everything onto the `log` facade.
#[allow(unused_variables)]
pub trait Logger<R: Requirement> {
    /// A candidate was retrieved for a requirement.
    fn on_consider(&mut self, candidate: &R, requirement: &R) {}

    /// A candidate was pinned as a decision.
    fn on_select(&mut self, candidate: &R, requirement: &R) {}

    /// A dependency of the considered candidate was registered.
    fn on_dependency(&mut self, dependent: &R, dependency: &R) {}

    /// An incompatibility was found to be violated.
    fn on_conflict(&mut self, incompatibility: &Incompatibility<R>) {}

    /// A term was derived by unit propagation.
    fn on_derive(&mut self, term: &Term<R>) {}

    /// The given satisfier term is being backtracked over.
    fn on_backtrack(&mut self, satisfier: &Term<R>) {}

    /// The set of pinned selections changed.
    fn on_partial_solution(&mut self, selections: &[R]) {}
}

/// The default logger: ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl<R: Requirement> Logger<R> for NullLogger {}

/// A logger forwarding every event onto the `log` facade at debug
/// level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceLogger;

impl<R: Requirement> Logger<R> for TraceLogger {
    fn on_consider(&mut self, candidate: &R, requirement: &R) {
        log::debug!("consider {} to satisfy {}", candidate, requirement);
    }

    fn on_select(&mut self, candidate: &R, requirement: &R) {
        log::debug!("select {} to satisfy {}", candidate, requirement);
    }

    fn on_dependency(&mut self, dependent: &R, dependency: &R) {
        log::debug!("dependency: {} depends on {}", dependent, dependency);
    }

    fn on_conflict(&mut self, incompatibility: &Incompatibility<R>) {
        log::debug!("conflict: {}", incompatibility);
    }

    fn on_derive(&mut self, term: &Term<R>) {
        log::debug!("derive {}", term);
    }

    fn on_backtrack(&mut self, satisfier: &Term<R>) {
        log::debug!("backtrack over {}", satisfier);
    }

    fn on_partial_solution(&mut self, selections: &[R]) {
        log::debug!("{} selections pinned", selections.len());
    }
}

/// Main function of the library: find selections satisfying every root
/// requirement and all their transitive dependencies.
///
/// The solution lists the selections in decision order, at most one per
/// key. On failure, [SolveError::Unsolvable] carries the proof.
pub fn solve<R: Requirement>(
    requirements: impl IntoIterator<Item = R>,
    provider: &impl CandidateProvider<R>,
) -> Result<Vec<R>, SolveError<R>> {
    solve_with_logger(requirements, provider, &mut NullLogger)
}

/// Same as [solve], reporting solver events to the given logger.
pub fn solve_with_logger<R: Requirement>(
    requirements: impl IntoIterator<Item = R>,
    provider: &impl CandidateProvider<R>,
    logger: &mut impl Logger<R>,
) -> Result<Vec<R>, SolveError<R>> {
    let mut state = State::new();
    for requirement in requirements {
        state.preload_root(requirement);
    }
    while state.has_changes() {
        state.unit_propagation(logger)?;
        state.speculate(provider, logger)?;
    }
    Ok(state.partial.solution())
}
