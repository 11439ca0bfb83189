// SPDX-License-Identifier: MPL-2.0

//! Turn the incompatibility DAG explaining a failed solve into a flat
//! stream of premises and conclusions that a renderer can print as a
//! readable proof.
//!
//! Leaves of the DAG are incompatibilities with an external cause
//! ([Root](crate::incompatibility::Cause::Root),
//! [Unavailable](crate::incompatibility::Cause::Unavailable),
//! [Dependency](crate::incompatibility::Cause::Dependency)); internal
//! nodes were derived during conflict resolution. The traversal walks
//! top-down, flattening where a flatter rendering reads better.

use crate::incompatibility::{Cause, Incompatibility};
use crate::requirement::Requirement;
use crate::term::Term;

/// What one incompatibility states, extracted from its term shape.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Clause<R: Requirement> {
    /// Selecting the dependent forces the dependency.
    Dependency {
        /// The selection imposing the requirement.
        dependent: R,
        /// What it requires.
        requires: R,
    },
    /// The two selections cannot be made together.
    Conflict(R, R),
    /// No selection matching the requirement is allowed.
    Disallowed(R),
    /// The provider has no candidate for the requirement.
    Unavailable(R),
    /// The requirement must be satisfied.
    Needed(R),
    /// The two selections jointly force the third requirement.
    Compromise(R, R, R),
    /// Nothing at all can be selected: the proof is complete.
    NoSolution,
}

/// One element of the report stream.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ReportItem<R: Requirement> {
    /// A fact the following conclusion builds on.
    Premise(Clause<R>),
    /// What the preceding premises establish.
    Conclusion(Clause<R>),
    /// A paragraph break between independent sub-proofs.
    Separator,
}

/// A restartable view over the proof stream: every call to
/// [iter](Report::iter) (or every `for` loop over a reference) starts a
/// fresh traversal.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a, R: Requirement> {
    root: &'a Incompatibility<R>,
}

/// Linearize the derivation DAG rooted at the given incompatibility,
/// typically the payload of
/// [SolveError::Unsolvable](crate::error::SolveError::Unsolvable).
pub fn generate_report<R: Requirement>(incompatibility: &Incompatibility<R>) -> Report<'_, R> {
    Report {
        root: incompatibility,
    }
}

impl<'a, R: Requirement> Report<'a, R> {
    /// Run a fresh traversal and iterate its items.
    pub fn iter(&self) -> std::vec::IntoIter<ReportItem<R>> {
        let mut items = Vec::new();
        if self.root.is_derived() {
            emit_derived(self.root, &mut items);
        } else {
            items.push(ReportItem::Conclusion(clause(self.root)));
        }
        items.into_iter()
    }
}

impl<'a, R: Requirement> IntoIterator for &Report<'a, R> {
    type Item = ReportItem<R>;
    type IntoIter = std::vec::IntoIter<ReportItem<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn premise<R: Requirement>(incompat: &Incompatibility<R>) -> ReportItem<R> {
    let clause = clause(incompat);
    debug_assert!(
        clause != Clause::NoSolution,
        "only a conclusion can state that nothing is selectable",
    );
    ReportItem::Premise(clause)
}

fn conclusion<R: Requirement>(incompat: &Incompatibility<R>) -> ReportItem<R> {
    ReportItem::Conclusion(clause(incompat))
}

/// The two parents of a derived incompatibility.
fn parents<R: Requirement>(
    incompat: &Incompatibility<R>,
) -> (&Incompatibility<R>, &Incompatibility<R>) {
    match incompat.cause() {
        Cause::Conflict { left, right } => (left, right),
        _ => unreachable!("only derived incompatibilities appear inside the proof DAG"),
    }
}

fn emit_derived<R: Requirement>(incompat: &Incompatibility<R>, out: &mut Vec<ReportItem<R>>) {
    let (left, right) = parents(incompat);
    match (left.is_derived(), right.is_derived()) {
        (true, true) => emit_both_derived(incompat, left, right, out),
        (true, false) => emit_one_derived(incompat, left, right, out),
        (false, true) => emit_one_derived(incompat, right, left, out),
        (false, false) => {
            out.push(premise(left));
            out.push(premise(right));
            out.push(conclusion(incompat));
        }
    }
}

/// One parent is derived, the other external. When the derived parent
/// itself mixes a derived and an external child, the derived grandchild
/// is pulled up and the external one threaded as a local premise, for a
/// flatter rendering.
fn emit_one_derived<R: Requirement>(
    incompat: &Incompatibility<R>,
    derived: &Incompatibility<R>,
    external: &Incompatibility<R>,
    out: &mut Vec<ReportItem<R>>,
) {
    let (inner_left, inner_right) = parents(derived);
    if inner_left.is_derived() && !inner_right.is_derived() {
        emit_derived(inner_left, out);
        out.push(premise(inner_right));
        out.push(premise(external));
        out.push(conclusion(incompat));
    } else if inner_left.is_derived() && inner_right.is_derived() {
        emit_derived(inner_right, out);
        out.push(premise(inner_left));
        out.push(premise(external));
        out.push(conclusion(incompat));
    } else {
        emit_derived(derived, out);
        out.push(premise(external));
        out.push(conclusion(incompat));
    }
}

/// Both parents are derived. A parent whose own children are both
/// external can be emitted inline for a tidier tree; otherwise the two
/// sub-proofs are separated and the left one restated as a premise.
fn emit_both_derived<R: Requirement>(
    incompat: &Incompatibility<R>,
    left: &Incompatibility<R>,
    right: &Incompatibility<R>,
    out: &mut Vec<ReportItem<R>>,
) {
    let (left_left, left_right) = parents(left);
    let (right_left, right_right) = parents(right);
    if !left_left.is_derived() && !left_right.is_derived() {
        emit_derived(right, out);
        emit_derived(left, out);
        out.push(conclusion(incompat));
    } else if !right_left.is_derived() && !right_right.is_derived() {
        emit_derived(left, out);
        emit_derived(right, out);
        out.push(conclusion(incompat));
    } else {
        emit_derived(left, out);
        out.push(ReportItem::Separator);
        emit_derived(right, out);
        out.push(ReportItem::Separator);
        out.push(premise(left));
        out.push(conclusion(incompat));
    }
}

/// Read a clause off an incompatibility's term shape.
fn clause<R: Requirement>(incompat: &Incompatibility<R>) -> Clause<R> {
    match incompat.terms() {
        [] => Clause::NoSolution,
        [Term::Positive(req)] => match incompat.cause() {
            Cause::Unavailable => Clause::Unavailable(req.clone()),
            _ => Clause::Disallowed(req.clone()),
        },
        [Term::Negative(req)] => Clause::Needed(req.clone()),
        [Term::Positive(dependent), Term::Negative(requires)]
        | [Term::Negative(requires), Term::Positive(dependent)] => Clause::Dependency {
            dependent: dependent.clone(),
            requires: requires.clone(),
        },
        [Term::Positive(a), Term::Positive(b)] => Clause::Conflict(a.clone(), b.clone()),
        terms @ [_, _, _] => {
            let positive: Vec<&R> = terms
                .iter()
                .filter(|t| t.is_positive())
                .map(Term::requirement)
                .collect();
            let negative: Vec<&R> = terms
                .iter()
                .filter(|t| !t.is_positive())
                .map(Term::requirement)
                .collect();
            match (positive.as_slice(), negative.as_slice()) {
                ([a, b], [c]) => Clause::Compromise((*a).clone(), (*b).clone(), (*c).clone()),
                _ => unreachable!("unexplainable three-term incompatibility {}", incompat),
            }
        }
        _ => unreachable!("unexplainable incompatibility shape {}", incompat),
    }
}

// TESTS #######################################################################

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_util::Req;

    fn needed(req: Req) -> Incompatibility<Req> {
        Incompatibility::new([Term::Negative(req)], Cause::Root)
    }

    fn unavailable(req: Req) -> Incompatibility<Req> {
        Incompatibility::new([Term::Positive(req)], Cause::Unavailable)
    }

    fn derived(
        terms: Vec<Term<Req>>,
        left: Incompatibility<Req>,
        right: Incompatibility<Req>,
    ) -> Incompatibility<Req> {
        Incompatibility::new(
            terms,
            Cause::Conflict {
                left: Arc::new(left),
                right: Arc::new(right),
            },
        )
    }

    #[test]
    fn two_external_parents_become_two_premises() {
        let foo = Req::versions("foo", &[1]);
        let root = derived(Vec::new(), unavailable(foo.clone()), needed(foo.clone()));
        let report = generate_report(&root);
        let items: Vec<_> = report.iter().collect();
        assert_eq!(
            items,
            vec![
                ReportItem::Premise(Clause::Unavailable(foo.clone())),
                ReportItem::Premise(Clause::Needed(foo)),
                ReportItem::Conclusion(Clause::NoSolution),
            ]
        );
    }

    #[test]
    fn iteration_restarts_from_the_top() {
        let foo = Req::versions("foo", &[1]);
        let root = derived(Vec::new(), unavailable(foo.clone()), needed(foo));
        let report = generate_report(&root);
        let first: Vec<_> = report.iter().collect();
        let second: Vec<_> = report.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn dependency_clause_orients_towards_the_positive_term() {
        let parent = Req::versions("foo", &[1]);
        let child = Req::versions("bar", &[2, 3]);
        let ic = Incompatibility::new(
            [
                Term::Positive(parent.clone()),
                Term::Negative(child.clone()),
            ],
            Cause::Dependency,
        );
        assert_eq!(
            clause(&ic),
            Clause::Dependency {
                dependent: parent,
                requires: child,
            }
        );
    }

    #[test]
    fn nested_derivation_recurses_before_concluding() {
        let foo = Req::versions("foo", &[1]);
        let bar = Req::versions("bar", &[2]);
        let inner = derived(
            vec![Term::Positive(bar.clone())],
            unavailable(foo.clone()),
            needed(foo),
        );
        let root = derived(Vec::new(), inner, needed(bar.clone()));
        let items: Vec<_> = generate_report(&root).iter().collect();
        assert_eq!(
            items,
            vec![
                ReportItem::Premise(Clause::Unavailable(Req::versions("foo", &[1]))),
                ReportItem::Premise(Clause::Needed(Req::versions("foo", &[1]))),
                ReportItem::Conclusion(Clause::Disallowed(bar.clone())),
                ReportItem::Premise(Clause::Needed(bar)),
                ReportItem::Conclusion(Clause::NoSolution),
            ]
        );
    }
}
