// SPDX-License-Identifier: MPL-2.0

//! The partial solution is the current state of the solution being
//! built by the algorithm: an ordered ledger of decisions and
//! derivations, with per-key accumulated intersections for fast
//! relation queries.

use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::incompatibility::Incompatibility;
use crate::requirement::Requirement;
use crate::term::{SetRelation, Term};

type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
pub(crate) struct DecisionLevel(pub(crate) u32);

impl DecisionLevel {
    pub(crate) fn increment(self) -> Self {
        Self(self.0 + 1)
    }
}

/// An assignment is either a decision, a chosen single-version
/// selection, or a derivation, a term entailed by unit propagation
/// together with the incompatibility that caused it.
#[derive(Debug, Clone)]
pub(crate) enum Assignment<R: Requirement> {
    Decision {
        term: Term<R>,
    },
    Derivation {
        term: Term<R>,
        cause: Arc<Incompatibility<R>>,
    },
}

impl<R: Requirement> Assignment<R> {
    pub(crate) fn term(&self) -> &Term<R> {
        match self {
            Self::Decision { term } => term,
            Self::Derivation { term, .. } => term,
        }
    }

    pub(crate) fn is_decision(&self) -> bool {
        matches!(self, Self::Decision { .. })
    }

    pub(crate) fn cause(&self) -> Option<&Arc<Incompatibility<R>>> {
        match self {
            Self::Decision { .. } => None,
            Self::Derivation { cause, .. } => Some(cause),
        }
    }
}

/// A ledger entry: the assignment plus the decision level it was made
/// at. The entry's position in the ledger is its assignment index.
#[derive(Debug, Clone)]
struct DatedAssignment<R: Requirement> {
    level: DecisionLevel,
    assignment: Assignment<R>,
}

/// Accumulated knowledge about one key: the intersection of every
/// assignment term seen for it, and whether a decision was taken.
#[derive(Debug, Clone)]
enum KeyRecord<R: Requirement> {
    Decided(Term<R>),
    Derived(Term<R>),
}

impl<R: Requirement> KeyRecord<R> {
    fn term(&self) -> &Term<R> {
        match self {
            Self::Decided(term) => term,
            Self::Derived(term) => term,
        }
    }
}

/// Outcome of checking an incompatibility against the partial solution.
#[derive(Debug, Clone)]
pub(crate) enum ConflictCheck<R: Requirement> {
    /// Some term is disjoint from the partial solution (the
    /// incompatibility is already falsified), or more than one term is
    /// still free; nothing can be concluded.
    NoConflict,
    /// Every term except this one is satisfied: its inverse is entailed.
    AlmostConflict(Term<R>),
    /// Every term is satisfied; the incompatibility is violated.
    Conflict,
}

/// What conflict resolution needs to know about the satisfier of a
/// violated incompatibility.
pub(crate) struct BacktrackInfo<R: Requirement> {
    pub(crate) satisfier: Assignment<R>,
    pub(crate) satisfier_level: DecisionLevel,
    /// Highest level strictly below the satisfier's at which the
    /// incompatibility minus the satisfier is already satisfied.
    pub(crate) prev_sat_level: DecisionLevel,
    /// What remains of the satisfier term once the incompatibility term
    /// is accounted for, if anything.
    pub(crate) difference: Option<Term<R>>,
    /// The incompatibility term matching the satisfier's key.
    pub(crate) term: Term<R>,
}

/// The partial solution: a succession of assignments, historically
/// ordered, plus the accumulated term for each key.
pub(crate) struct PartialSolution<R: Requirement> {
    history: Vec<DatedAssignment<R>>,
    level: DecisionLevel,
    records: FxIndexMap<R::Key, KeyRecord<R>>,
}

impl<R: Requirement> PartialSolution<R> {
    pub(crate) fn new() -> Self {
        Self {
            history: Vec::new(),
            level: DecisionLevel(0),
            records: FxIndexMap::default(),
        }
    }

    pub(crate) fn decision_level(&self) -> DecisionLevel {
        self.level
    }

    /// Select a version: record a positive single-version term at a new
    /// decision level.
    pub(crate) fn record_decision(&mut self, term: Term<R>) {
        debug_assert!(term.is_positive(), "a decision selects a version");
        if let Some(record) = self.records.get(term.key()) {
            match record {
                KeyRecord::Decided(_) => unreachable!("key is already decided"),
                KeyRecord::Derived(acc) => debug_assert!(
                    acc.implied_by(&term),
                    "decision {} escapes the accumulated term {}",
                    term,
                    acc,
                ),
            }
        }
        self.level = self.level.increment();
        self.push(DatedAssignment {
            level: self.level,
            assignment: Assignment::Decision { term },
        });
    }

    /// Record a term entailed by unit propagation at the current level.
    pub(crate) fn record_derivation(&mut self, term: Term<R>, cause: Arc<Incompatibility<R>>) {
        self.push(DatedAssignment {
            level: self.level,
            assignment: Assignment::Derivation { term, cause },
        });
    }

    fn push(&mut self, dated: DatedAssignment<R>) {
        Self::apply(&mut self.records, &dated.assignment);
        self.history.push(dated);
    }

    /// Fold one assignment into the per-key records.
    fn apply(records: &mut FxIndexMap<R::Key, KeyRecord<R>>, assignment: &Assignment<R>) {
        use indexmap::map::Entry;
        let term = assignment.term();
        if assignment.is_decision() {
            records.insert(term.key().clone(), KeyRecord::Decided(term.clone()));
            return;
        }
        match records.entry(term.key().clone()) {
            Entry::Occupied(mut occupied) => match occupied.get_mut() {
                KeyRecord::Decided(_) => {
                    unreachable!("no derivation can follow a decision for {:?}", term.key())
                }
                KeyRecord::Derived(acc) => *acc = acc.intersection(term),
            },
            Entry::Vacant(vacant) => {
                vacant.insert(KeyRecord::Derived(term.clone()));
            }
        }
    }

    /// Compare a term against the accumulated term of its key. Keys
    /// never assigned are unconstrained.
    pub(crate) fn relation_to(&self, term: &Term<R>) -> SetRelation {
        match self.records.get(term.key()) {
            Some(record) => record.term().relation_to(term),
            None => SetRelation::Overlap,
        }
    }

    /// `true` when the accumulated knowledge entails the term.
    pub(crate) fn satisfies(&self, term: &Term<R>) -> bool {
        self.relation_to(term) == SetRelation::Subset
    }

    /// The next requirement to ask the provider about: the first key in
    /// insertion order that is positively required but not yet decided.
    pub(crate) fn next_unsatisfied_requirement(&self) -> Option<R> {
        self.records.values().find_map(|record| match record {
            KeyRecord::Derived(term) if term.is_positive() => Some(term.requirement().clone()),
            _ => None,
        })
    }

    /// Check an incompatibility against the accumulated terms.
    pub(crate) fn check_conflict(&self, incompat: &Incompatibility<R>) -> ConflictCheck<R> {
        let mut unit: Option<&Term<R>> = None;
        for term in incompat.terms() {
            match self.relation_to(term) {
                SetRelation::Disjoint => return ConflictCheck::NoConflict,
                SetRelation::Overlap => {
                    if unit.is_some() {
                        return ConflictCheck::NoConflict;
                    }
                    unit = Some(term);
                }
                SetRelation::Subset => {}
            }
        }
        match unit {
            Some(term) => ConflictCheck::AlmostConflict(term.clone()),
            None => ConflictCheck::Conflict,
        }
    }

    /// Locate the satisfier of a fully violated incompatibility and
    /// compute what conflict resolution needs from it.
    ///
    /// Returns `None` when there is nothing to backtrack over: the
    /// incompatibility has no terms, which is a contradiction at the
    /// root level.
    pub(crate) fn create_backtrack_info(
        &self,
        incompat: &Incompatibility<R>,
    ) -> Option<BacktrackInfo<R>> {
        let mut accum = Self::fresh_accumulator(incompat);
        let idx = Self::find_satisfier(incompat, &mut accum, &self.history)?;
        let satisfier = &self.history[idx];
        let satisfier_term = satisfier.assignment.term().clone();
        let term = incompat
            .get(satisfier_term.key())
            .expect("the satisfier key belongs to the incompatibility")
            .clone();

        // Re-run the search over the earlier prefix with the satisfier's
        // own term already granted; where that prefix ends is the level
        // to keep when backtracking.
        let mut seeded = Self::fresh_accumulator(incompat);
        seeded.insert(
            satisfier_term.key().clone(),
            (satisfier_term.implies(&term), Some(satisfier_term.clone())),
        );
        let prev_sat_level = Self::find_satisfier(incompat, &mut seeded, &self.history[..idx])
            .map(|prev| self.history[prev].level)
            .unwrap_or(DecisionLevel(0));

        let difference = if term.implied_by(&satisfier_term) {
            None
        } else {
            Some(satisfier_term.difference(&term))
        };

        Some(BacktrackInfo {
            satisfier: satisfier.assignment.clone(),
            satisfier_level: satisfier.level,
            prev_sat_level,
            difference,
            term,
        })
    }

    fn fresh_accumulator(
        incompat: &Incompatibility<R>,
    ) -> FxIndexMap<R::Key, (bool, Option<Term<R>>)> {
        incompat
            .terms()
            .iter()
            .map(|term| (term.key().clone(), (false, None)))
            .collect()
    }

    /// Walk the ledger in order, intersecting each assignment into the
    /// accumulator of its key, until every incompatibility term is
    /// satisfied. Returns the index of the assignment completing the
    /// satisfaction, the satisfier.
    fn find_satisfier(
        incompat: &Incompatibility<R>,
        accum: &mut FxIndexMap<R::Key, (bool, Option<Term<R>>)>,
        history: &[DatedAssignment<R>],
    ) -> Option<usize> {
        if accum.is_empty() {
            return None;
        }
        for (idx, dated) in history.iter().enumerate() {
            let assigned = dated.assignment.term();
            let Some(ic_term) = incompat.get(assigned.key()) else {
                continue;
            };
            let (satisfied, acc) = accum
                .get_mut(assigned.key())
                .expect("every incompatibility key is tracked");
            if *satisfied {
                continue;
            }
            let next = match acc.take() {
                None => assigned.clone(),
                Some(prev) => prev.intersection(assigned),
            };
            *satisfied = next.implies(ic_term);
            let done = *satisfied;
            *acc = Some(next);
            if done && accum.values().all(|(satisfied, _)| *satisfied) {
                return Some(idx);
            }
        }
        None
    }

    /// Drop every assignment above the given level and rebuild the
    /// per-key records from the survivors.
    pub(crate) fn backtrack_to(&mut self, level: DecisionLevel) {
        let keep = self.history.partition_point(|dated| dated.level <= level);
        self.history.truncate(keep);
        self.level = level;
        self.records.clear();
        for dated in &self.history {
            Self::apply(&mut self.records, &dated.assignment);
        }
    }

    /// The selected requirements, in decision order.
    pub(crate) fn solution(&self) -> Vec<R> {
        self.history
            .iter()
            .filter_map(|dated| match &dated.assignment {
                Assignment::Decision { term } => Some(term.requirement().clone()),
                Assignment::Derivation { .. } => None,
            })
            .collect()
    }
}

impl<R: Requirement> fmt::Display for PartialSolution<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "level {}", self.level.0)?;
        for (key, record) in &self.records {
            let tag = match record {
                KeyRecord::Decided(_) => "decided",
                KeyRecord::Derived(_) => "derived",
            };
            writeln!(f, "  {:?}: {} ({})", key, record.term(), tag)?;
        }
        Ok(())
    }
}

// TESTS #######################################################################
