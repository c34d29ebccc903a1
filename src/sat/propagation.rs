#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Simplification passes run between decisions.
//!
//! Two rules are implemented, both as fixpoint passes over a
//! [`Formula`]/[`Assignment`] pair with every mutation logged on the
//! [`Trail`]:
//!
//! 1.  **Unit propagation.** A clause with a single remaining literal forces
//!     that literal. All units visible in one scan are applied before the
//!     next scan, and scanning repeats because striking a falsified literal
//!     can shorten other clauses to units. The pass stops at a fixpoint or
//!     as soon as a clause becomes empty.
//! 2.  **Pure-literal elimination.** A literal whose negation occurs in no
//!     live clause can be made true without falsifying anything, so every
//!     clause containing it is dropped. Dropping clauses can make further
//!     literals pure, so this pass also repeats until nothing is pure.
//!
//! The [`Propagator`] trait packages the passes for the search; two
//! configurations exist, with and without pure-literal elimination.

use crate::sat::assignment::Assignment;
use crate::sat::formula::Formula;
use crate::sat::literal::Literal;
use crate::sat::log::targets::{PROPAGATION, PURE_LITERALS};
use crate::sat::trail::{Change, Trail};
use clap::ValueEnum;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::fmt::{self, Debug, Display};

/// Outcome of one propagation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// A clause lost all of its literals.
    Conflict,
    /// The formula was simplified; the caller should re-check it.
    Progress,
    /// Nothing applied; the search has to branch.
    Fixpoint,
}

/// Makes `lit` true: assigns its variable, drops the clauses it satisfies and
/// strikes its negation from the rest.
pub fn satisfy(lit: Literal, formula: &mut Formula, assignment: &mut Assignment, trail: &mut Trail) {
    assignment.assign(lit);
    trail.push(Change::Assigned(lit.variable()));
    formula.remove_clauses_containing(lit, trail);
    formula.strike_literal(lit, trail);
}

/// Runs unit propagation to a fixpoint.
///
/// Returns the number of variables assigned, or `Err` with that number if
/// an empty clause appeared.
///
/// # Errors
///
/// When propagation produces a conflict. The formula then contains an empty
/// clause and the caller is expected to backtrack.
pub fn unit_propagate(
    formula: &mut Formula,
    assignment: &mut Assignment,
    trail: &mut Trail,
) -> Result<usize, usize> {
    let mut assigned = 0;
    loop {
        if formula.has_conflict() {
            return Err(assigned);
        }
        let units = formula.unit_literals().collect_vec();
        if units.is_empty() {
            return Ok(assigned);
        }
        for lit in units {
            if formula.has_conflict() {
                break;
            }
            match assignment.literal_value(lit) {
                // the same unit occurred in several clauses
                Some(true) => continue,
                Some(false) => {
                    debug_assert!(false, "unit {lit} is already falsified");
                    continue;
                }
                None => {}
            }
            log::trace!(target: PROPAGATION, "unit {lit}");
            satisfy(lit, formula, assignment, trail);
            assigned += 1;
        }
    }
}

/// Literals whose negation occurs in no live clause, sorted.
#[must_use]
pub fn find_pure_literals(formula: &Formula) -> Vec<Literal> {
    let mut pures = FxHashSet::default();
    let mut impures = FxHashSet::default();

    for lit in formula.literals() {
        if impures.contains(&lit.variable()) {
            continue;
        }
        if pures.remove(&lit.negated()) {
            impures.insert(lit.variable());
            continue;
        }
        pures.insert(lit);
    }

    pures.into_iter().sorted().collect()
}

/// Runs pure-literal elimination to a fixpoint and returns the number of
/// literals fixed.
pub fn eliminate_pure_literals(
    formula: &mut Formula,
    assignment: &mut Assignment,
    trail: &mut Trail,
) -> usize {
    let mut eliminated = 0;
    loop {
        let pures = find_pure_literals(formula);
        if pures.is_empty() {
            return eliminated;
        }
        for lit in pures {
            log::trace!(target: PURE_LITERALS, "pure {lit}");
            assignment.assign(lit);
            trail.push(Change::Assigned(lit.variable()));
            formula.remove_clauses_containing(lit, trail);
            eliminated += 1;
        }
    }
}

/// A simplification strategy run by the search before every decision.
pub trait Propagator: Debug + Clone {
    /// Simplifies `formula` as far as this strategy can.
    fn propagate(
        &mut self,
        formula: &mut Formula,
        assignment: &mut Assignment,
        trail: &mut Trail,
    ) -> Propagation;

    /// Variables assigned by unit propagation so far.
    fn num_propagations(&self) -> usize;

    /// Variables assigned by pure-literal elimination so far.
    fn num_pure_literals(&self) -> usize {
        0
    }
}

/// Unit propagation only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitPropagation {
    propagations: usize,
}

impl Propagator for UnitPropagation {
    fn propagate(
        &mut self,
        formula: &mut Formula,
        assignment: &mut Assignment,
        trail: &mut Trail,
    ) -> Propagation {
        match unit_propagate(formula, assignment, trail) {
            Err(n) => {
                self.propagations += n;
                Propagation::Conflict
            }
            Ok(0) => Propagation::Fixpoint,
            Ok(n) => {
                self.propagations += n;
                Propagation::Progress
            }
        }
    }

    fn num_propagations(&self) -> usize {
        self.propagations
    }
}

/// Unit propagation to a fixpoint followed by pure-literal elimination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitPropagationWithPureLiterals {
    units: UnitPropagation,
    pure_literals: usize,
}

impl Propagator for UnitPropagationWithPureLiterals {
    fn propagate(
        &mut self,
        formula: &mut Formula,
        assignment: &mut Assignment,
        trail: &mut Trail,
    ) -> Propagation {
        let units = self.units.propagate(formula, assignment, trail);
        if units == Propagation::Conflict {
            return units;
        }

        let pures = eliminate_pure_literals(formula, assignment, trail);
        self.pure_literals += pures;

        if pures > 0 || units == Propagation::Progress {
            Propagation::Progress
        } else {
            Propagation::Fixpoint
        }
    }

    fn num_propagations(&self) -> usize {
        self.units.num_propagations()
    }

    fn num_pure_literals(&self) -> usize {
        self.pure_literals
    }
}

/// Runtime choice between the propagators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagatorImpls {
    UnitPropagation(UnitPropagation),
    UnitPropagationWithPureLiterals(UnitPropagationWithPureLiterals),
}

impl Default for PropagatorImpls {
    fn default() -> Self {
        Self::UnitPropagationWithPureLiterals(UnitPropagationWithPureLiterals::default())
    }
}

impl Propagator for PropagatorImpls {
    fn propagate(
        &mut self,
        formula: &mut Formula,
        assignment: &mut Assignment,
        trail: &mut Trail,
    ) -> Propagation {
        match self {
            Self::UnitPropagation(p) => p.propagate(formula, assignment, trail),
            Self::UnitPropagationWithPureLiterals(p) => p.propagate(formula, assignment, trail),
        }
    }

    fn num_propagations(&self) -> usize {
        match self {
            Self::UnitPropagation(p) => p.num_propagations(),
            Self::UnitPropagationWithPureLiterals(p) => p.num_propagations(),
        }
    }

    fn num_pure_literals(&self) -> usize {
        match self {
            Self::UnitPropagation(p) => p.num_pure_literals(),
            Self::UnitPropagationWithPureLiterals(p) => p.num_pure_literals(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PropagatorType {
    /// Unit propagation only.
    Units,
    /// Unit propagation followed by pure-literal elimination.
    #[default]
    UnitsAndPureLiterals,
}

impl Display for PropagatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Units => write!(f, "units"),
            Self::UnitsAndPureLiterals => write!(f, "units-and-pure-literals"),
        }
    }
}

impl PropagatorType {
    #[must_use]
    pub fn to_impl(self) -> PropagatorImpls {
        match self {
            Self::Units => PropagatorImpls::UnitPropagation(UnitPropagation::default()),
            Self::UnitsAndPureLiterals => PropagatorImpls::UnitPropagationWithPureLiterals(
                UnitPropagationWithPureLiterals::default(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::cnf::Cnf;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v).unwrap()
    }

    fn setup(clauses: Vec<Vec<i32>>) -> (Formula, Assignment, Trail) {
        let cnf = Cnf::from_clauses(clauses);
        (Formula::new(&cnf), Assignment::new(cnf.num_vars), Trail::new())
    }

    #[test]
    fn test_unit_chain() {
        let (mut f, mut a, mut t) = setup(vec![vec![1], vec![-1, 2]]);
        assert_eq!(unit_propagate(&mut f, &mut a, &mut t), Ok(2));
        assert!(f.is_empty());
        assert_eq!(a.var_value(1), Some(true));
        assert_eq!(a.var_value(2), Some(true));
    }

    #[test]
    fn test_unit_negative_strikes_positive() {
        let (mut f, mut a, mut t) = setup(vec![vec![1, 2], vec![-1]]);
        assert_eq!(unit_propagate(&mut f, &mut a, &mut t), Ok(2));
        assert!(f.is_empty());
        assert_eq!(a.var_value(1), Some(false));
        assert_eq!(a.var_value(2), Some(true));
    }

    #[test]
    fn test_unit_conflict() {
        let (mut f, mut a, mut t) = setup(vec![vec![1], vec![-1]]);
        assert_eq!(unit_propagate(&mut f, &mut a, &mut t), Err(1));
        assert!(f.has_conflict());
    }

    #[test]
    fn test_duplicate_units_assign_once() {
        let (mut f, mut a, mut t) = setup(vec![vec![3], vec![3], vec![-3, 1, 2]]);
        assert_eq!(unit_propagate(&mut f, &mut a, &mut t), Ok(1));
        assert_eq!(f.num_clauses(), 1);
    }

    #[test]
    fn test_unit_fixpoint_and_idempotence() {
        let (mut f, mut a, mut t) =
            setup(vec![vec![1], vec![-1, 2, 3], vec![-2, 4], vec![-1, -3], vec![4, 5, 6]]);
        assert!(unit_propagate(&mut f, &mut a, &mut t).is_ok());
        assert!(f.has_conflict() || f.unit_literals().next().is_none());

        let len = t.len();
        let snapshot = f.clone();
        assert_eq!(unit_propagate(&mut f, &mut a, &mut t), Ok(0));
        assert_eq!(t.len(), len);
        assert_eq!(f, snapshot);
    }

    #[test]
    fn test_find_pure_literals() {
        let (f, _, _) = setup(vec![vec![1, 2], vec![-2, 3], vec![1, -3]]);
        assert_eq!(find_pure_literals(&f), vec![lit(1)]);
    }

    #[test]
    fn test_all_pure() {
        let (mut f, mut a, mut t) = setup(vec![vec![1, 2, 3]]);
        assert_eq!(eliminate_pure_literals(&mut f, &mut a, &mut t), 3);
        assert!(f.is_empty());
        assert_eq!(a.get_solutions().to_dimacs(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pure_elimination_reaches_fixpoint() {
        // Dropping the clauses of pure 1 leaves -2 pure.
        let (mut f, mut a, mut t) = setup(vec![vec![1, 2], vec![-2, 3], vec![-2, -3]]);
        let n = eliminate_pure_literals(&mut f, &mut a, &mut t);
        assert!(n >= 2);
        assert!(find_pure_literals(&f).is_empty());
        assert!(f.is_empty());

        let len = t.len();
        assert_eq!(eliminate_pure_literals(&mut f, &mut a, &mut t), 0);
        assert_eq!(t.len(), len);
    }

    #[test]
    fn test_pure_elimination_leaves_mixed_variables() {
        let (mut f, mut a, mut t) = setup(vec![vec![1, 2], vec![-1, -2], vec![1, -2], vec![-1, 2]]);
        assert_eq!(eliminate_pure_literals(&mut f, &mut a, &mut t), 0);
        assert_eq!(f.num_clauses(), 4);
        assert_eq!(a.num_assigned(), 0);
    }

    #[test]
    fn test_propagators() {
        let (mut f, mut a, mut t) = setup(vec![vec![1, 2], vec![1, -2], vec![3, 4], vec![-3, -4]]);
        let mut units = UnitPropagation::default();
        assert_eq!(units.propagate(&mut f, &mut a, &mut t), Propagation::Fixpoint);

        let mut both = UnitPropagationWithPureLiterals::default();
        assert_eq!(both.propagate(&mut f, &mut a, &mut t), Propagation::Progress);
        assert_eq!(both.num_pure_literals(), 1);
        assert_eq!(a.var_value(1), Some(true));
        assert_eq!(both.propagate(&mut f, &mut a, &mut t), Propagation::Fixpoint);
    }

    #[test]
    fn test_propagator_reports_conflict() {
        let (mut f, mut a, mut t) = setup(vec![vec![2], vec![-2, 1], vec![-1, -2]]);
        let mut p = PropagatorType::UnitsAndPureLiterals.to_impl();
        assert_eq!(p.propagate(&mut f, &mut a, &mut t), Propagation::Conflict);
        assert!(p.num_propagations() >= 1);
    }
}
