// SPDX-License-Identifier: MPL-2.0

//! Handling solver errors.

use thiserror::Error;

use crate::incompatibility::Incompatibility;
use crate::requirement::Requirement;

/// Errors that may occur while solving requirements.
#[derive(Error, Debug)]
pub enum SolveError<R: Requirement> {
    /// There is no selection satisfying every requirement. The attached
    /// incompatibility is the root of the derivation DAG explaining why;
    /// feed it to [generate_report](crate::report::generate_report) to
    /// linearize the proof.
    #[error("version solving failed")]
    Unsolvable(Incompatibility<R>),

    /// The provider returned a dependency carrying the candidate's own
    /// key. This is a usage error in the provider, not a property of the
    /// requirements.
    #[error("candidate {dependent} depends on its own key")]
    SelfDependency {
        /// The candidate whose dependencies were being registered.
        dependent: R,
        /// The offending dependency.
        dependency: R,
    },
}
