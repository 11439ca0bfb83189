// SPDX-License-Identifier: MPL-2.0

//! Core state and functions driving the solving algorithm: unit
//! propagation, speculation and conflict resolution.

use std::sync::Arc;

use crate::error::SolveError;
use crate::incompatibility::{Cause, Incompatibility};
use crate::internal::{ConflictCheck, IncompatibilityStore, PartialSolution};
use crate::requirement::Requirement;
use crate::solver::{CandidateProvider, Logger};
use crate::term::Term;

/// Current state of the algorithm.
pub(crate) struct State<R: Requirement> {
    store: IncompatibilityStore<R>,
    pub(crate) partial: PartialSolution<R>,
    /// Keys whose accumulated term changed and whose incompatibilities
    /// must be revisited. A LIFO stack: local implications drain fully
    /// before older ones are revisited.
    changed: Vec<R::Key>,
}

impl<R: Requirement> State<R> {
    pub(crate) fn new() -> Self {
        Self {
            store: IncompatibilityStore::new(),
            partial: PartialSolution::new(),
            changed: Vec::new(),
        }
    }

    /// Assert that a root requirement must be satisfied.
    pub(crate) fn preload_root(&mut self, requirement: R) {
        let key = requirement.key().clone();
        self.store
            .add(Incompatibility::new([Term::Negative(requirement)], Cause::Root));
        self.changed.push(key);
    }

    pub(crate) fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Drain the changed stack, deriving everything the stored
    /// incompatibilities entail, resolving conflicts along the way.
    pub(crate) fn unit_propagation(
        &mut self,
        logger: &mut impl Logger<R>,
    ) -> Result<(), SolveError<R>> {
        while let Some(key) = self.changed.pop() {
            self.propagate_for_key(&key, logger)?;
        }
        Ok(())
    }

    fn propagate_for_key(
        &mut self,
        key: &R::Key,
        logger: &mut impl Logger<R>,
    ) -> Result<(), SolveError<R>> {
        // Conflict resolution appends to the store mid-loop, so iterate
        // over a snapshot of the per-key list.
        let incompats: Vec<Arc<Incompatibility<R>>> = self.store.for_key(key).to_vec();
        for incompat in incompats {
            if !self.propagate_incompat(&incompat, logger)? {
                break;
            }
        }
        Ok(())
    }

    /// Handle a single incompatibility; `Ok(false)` aborts the per-key
    /// loop because a conflict reset the changed stack.
    fn propagate_incompat(
        &mut self,
        incompat: &Arc<Incompatibility<R>>,
        logger: &mut impl Logger<R>,
    ) -> Result<bool, SolveError<R>> {
        match self.partial.check_conflict(incompat) {
            ConflictCheck::AlmostConflict(term) => {
                let derived = term.negate();
                logger.on_derive(&derived);
                self.changed.push(derived.key().clone());
                self.partial.record_derivation(derived, Arc::clone(incompat));
                Ok(true)
            }
            ConflictCheck::Conflict => {
                let cause = self.resolve_conflict(Arc::clone(incompat), logger)?;
                let ConflictCheck::AlmostConflict(term) = self.partial.check_conflict(&cause)
                else {
                    unreachable!(
                        "conflict resolution must leave a unit incompatibility \
                         to derive from, got {}",
                        cause,
                    )
                };
                let derived = term.negate();
                logger.on_derive(&derived);
                self.partial.record_derivation(derived.clone(), cause);
                self.changed.clear();
                self.changed.push(derived.key().clone());
                Ok(false)
            }
            ConflictCheck::NoConflict => Ok(true),
        }
    }

    /// Ask the provider about the next unsatisfied requirement and
    /// either pin a candidate or record why none fits.
    pub(crate) fn speculate(
        &mut self,
        provider: &impl CandidateProvider<R>,
        logger: &mut impl Logger<R>,
    ) -> Result<(), SolveError<R>> {
        let Some(requirement) = self.partial.next_unsatisfied_requirement() else {
            return Ok(());
        };
        let Some((chosen, deps)) = provider.best_candidate(&requirement) else {
            log::debug!("no candidate for {}", requirement);
            let key = requirement.key().clone();
            self.store.add(Incompatibility::new(
                [Term::Positive(requirement)],
                Cause::Unavailable,
            ));
            self.changed.push(key);
            return Ok(());
        };
        logger.on_consider(&chosen, &requirement);

        let mut found_conflict = false;
        for dep in deps {
            logger.on_dependency(&chosen, &dep);
            if dep.key() == chosen.key() {
                return Err(SolveError::SelfDependency {
                    dependent: chosen,
                    dependency: dep,
                });
            }
            let incompat = self.store.add(Incompatibility::new(
                [Term::Positive(chosen.clone()), Term::Negative(dep)],
                Cause::Dependency,
            ));
            // The new incompatibility conflicts right away if every term
            // either belongs to the candidate itself or is already
            // satisfied; the next propagation pass will discover it.
            let conflicts = incompat
                .terms()
                .iter()
                .all(|term| term.key() == chosen.key() || self.partial.satisfies(term));
            if conflicts {
                logger.on_conflict(&incompat);
                found_conflict = true;
            }
        }

        if !found_conflict {
            logger.on_select(&chosen, &requirement);
            log::info!("decision: {}", chosen);
            self.partial.record_decision(Term::Positive(chosen.clone()));
            logger.on_partial_solution(&self.partial.solution());
        }
        self.changed.push(chosen.key().clone());
        Ok(())
    }

    /// Given a violated incompatibility, learn its root cause: backtrack
    /// and return the incompatibility to derive from, or fail when the
    /// contradiction reaches the root level.
    fn resolve_conflict(
        &mut self,
        mut incompat: Arc<Incompatibility<R>>,
        logger: &mut impl Logger<R>,
    ) -> Result<Arc<Incompatibility<R>>, SolveError<R>> {
        logger.on_conflict(&incompat);
        log::debug!(
            "resolving conflict {} against {} stored incompatibilities",
            incompat,
            self.store.len(),
        );
        loop {
            let Some(info) = self.partial.create_backtrack_info(&incompat) else {
                return Err(SolveError::Unsolvable((*incompat).clone()));
            };
            if info.satisfier.is_decision() || info.prev_sat_level < info.satisfier_level {
                logger.on_backtrack(info.satisfier.term());
                log::debug!("backtracking to level {}", info.prev_sat_level.0);
                self.partial.backtrack_to(info.prev_sat_level);
                debug_assert_eq!(self.partial.decision_level(), info.prev_sat_level);
                return Ok(incompat);
            }
            let satisfier_cause = info
                .satisfier
                .cause()
                .expect("a non-decision satisfier is a derivation and has a cause");
            let mut terms: Vec<Term<R>> = incompat
                .terms()
                .iter()
                .filter(|term| term.key() != info.term.key())
                .cloned()
                .collect();
            if let Some(difference) = &info.difference {
                terms.push(difference.negate());
            }
            debug_assert!(
                terms.iter().all(|term| self.partial.satisfies(term)),
                "a resolved incompatibility must stay fully violated",
            );
            let next = self.store.add(Incompatibility::new(
                terms,
                Cause::Conflict {
                    left: Arc::clone(&incompat),
                    right: Arc::clone(satisfier_cause),
                },
            ));
            debug_assert!(matches!(
                self.partial.check_conflict(&next),
                ConflictCheck::Conflict
            ));
            incompat = next;
        }
    }
}
