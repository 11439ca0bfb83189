// SPDX-License-Identifier: MPL-2.0

//! Version solving for abstract requirement spaces.
//!
//! Version solving consists in efficiently finding a set of package
//! selections that satisfy all the constraints of a given set of root
//! requirements. In addition, when that is not possible, we should try
//! to provide a very clear explanation as to why that failed.
//!
//! # Requirements and providers
//!
//! The solver knows nothing about versions, ranges or package names. It
//! manipulates opaque *requirements*: values implementing the
//! [Requirement] trait, which groups requirements on the same package
//! under a shared key and gives the solver set algebra over them. The
//! bundled [IntervalSet], a union of half-open intervals over any
//! ordered point type, is the reference building block for concrete
//! requirement types; the solver works just as well over semver ranges
//! or any other version-range language.
//!
//! Candidates come from a [CandidateProvider]: given a requirement, it
//! returns a narrowed selection (ideally one single version) together
//! with that selection's own dependencies. Providers decide candidate
//! preference; the solver only guarantees it queries them in a
//! deterministic order.
//!
//! See [solve] for a complete worked example.
//!
//! # Explaining failures
//!
//! When no selection can satisfy every requirement,
//! [solve] returns [SolveError::Unsolvable] carrying an
//! [Incompatibility]: the root of a derivation DAG accumulated while
//! solving. [generate_report] linearizes that DAG into a
//! [Premise](ReportItem::Premise) / [Conclusion](ReportItem::Conclusion)
//! stream ready for rendering:
//!
//! ```text
//! premise:    foo 1 depends on shared [200, 300)
//! premise:    bar 1 depends on shared [290, 400)
//! conclusion: no version of shared can be selected
//! ```
//!
//! The stream is restartable, so renderers may take several passes.

#![warn(missing_docs)]

mod error;
mod incompatibility;
mod iset;
mod report;
mod requirement;
mod solver;
mod term;

pub use error::SolveError;
pub use incompatibility::{Cause, Incompatibility};
pub use iset::{IntervalSet, InvalidIntervalError};
pub use report::{generate_report, Clause, Report, ReportItem};
pub use requirement::Requirement;
pub use solver::{
    solve, solve_with_logger, CandidateProvider, Logger, NullLogger, TraceLogger,
};
pub use term::{SetRelation, Term};

mod internal;

#[cfg(test)]
mod test_util;
