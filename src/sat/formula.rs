#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The working clause store of the search.
//!
//! A [`Formula`] starts as a copy of the input clauses and is pruned as the
//! search assigns variables: satisfied clauses leave the live set and
//! falsified literals are struck from the clauses that remain. Nothing is
//! ever physically deleted. A removed clause is only flagged, and a struck
//! literal is swapped behind the clause's active prefix, so both can be
//! restored in O(1) when the [`Trail`] unwinds.
//!
//! Invariant: every literal in the active prefix of a live clause belongs to
//! an unassigned variable. Assigning `l` removes every clause containing `l`
//! and strikes `-l` everywhere else, which re-establishes it.

use crate::sat::clause::LiteralStorage;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::trail::{Change, Trail};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClauseSlot {
    literals: LiteralStorage,
    /// Literals `literals[..active]` are still in the clause.
    active: usize,
    satisfied: bool,
}

impl ClauseSlot {
    fn new(literals: LiteralStorage) -> Self {
        let active = literals.len();
        Self {
            literals,
            active,
            satisfied: false,
        }
    }

    fn active(&self) -> &[Literal] {
        &self.literals[..self.active]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    num_vars: usize,
    clauses: Vec<ClauseSlot>,
    /// Clause indices per literal, indexed by [`Literal::index`].
    occurrences: Vec<Vec<usize>>,
    /// Number of clauses not yet satisfied.
    live: usize,
    /// Number of live clauses with no literal left.
    empty: usize,
}

impl Formula {
    /// # Panics
    ///
    /// If a clause mentions a variable above `cnf.num_vars`.
    #[must_use]
    pub fn new(cnf: &Cnf) -> Self {
        let mut formula = Self {
            num_vars: cnf.num_vars,
            clauses: Vec::with_capacity(cnf.num_clauses()),
            occurrences: vec![Vec::new(); 2 * (cnf.num_vars + 1)],
            live: 0,
            empty: 0,
        };
        for clause in cnf.iter() {
            formula.push_clause(clause.literals().iter().copied().collect());
        }
        formula
    }

    fn push_clause(&mut self, literals: LiteralStorage) -> usize {
        let idx = self.clauses.len();
        for lit in &literals {
            assert!(
                lit.variable() as usize <= self.num_vars,
                "literal {lit} outside of the {} variable universe",
                self.num_vars
            );
            self.occurrences[lit.index()].push(idx);
        }
        if literals.is_empty() {
            self.empty += 1;
        }
        self.live += 1;
        self.clauses.push(ClauseSlot::new(literals));
        idx
    }

    #[must_use]
    pub const fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Number of live (not yet satisfied) clauses.
    #[must_use]
    pub const fn num_clauses(&self) -> usize {
        self.live
    }

    /// Number of literals left across all live clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses().map(<[Literal]>::len).sum()
    }

    /// No live clause is left: the formula is satisfied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Some live clause has lost all of its literals.
    #[must_use]
    pub const fn has_conflict(&self) -> bool {
        self.empty > 0
    }

    /// The remaining literals of every live clause.
    pub fn clauses(&self) -> impl Iterator<Item = &[Literal]> {
        self.clauses
            .iter()
            .filter(|c| !c.satisfied)
            .map(ClauseSlot::active)
    }

    /// Every remaining literal occurrence, clause by clause.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.clauses().flat_map(|c| c.iter().copied())
    }

    /// The sole literal of every live unit clause.
    pub fn unit_literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.clauses().filter_map(|c| match c {
            [lit] => Some(*lit),
            _ => None,
        })
    }

    /// Drops every live clause containing `lit`, as it is now satisfied.
    ///
    /// Returns the number of clauses removed.
    pub fn remove_clauses_containing(&mut self, lit: Literal, trail: &mut Trail) -> usize {
        let mut removed = 0;
        for &idx in &self.occurrences[lit.index()] {
            let slot = &mut self.clauses[idx];
            if slot.satisfied || !slot.active().contains(&lit) {
                continue;
            }
            slot.satisfied = true;
            self.live -= 1;
            trail.push(Change::ClauseRemoved(idx));
            removed += 1;
        }
        removed
    }

    /// Strikes `-lit` from every live clause, as it can no longer be true.
    ///
    /// Returns the number of clauses shortened.
    pub fn strike_literal(&mut self, lit: Literal, trail: &mut Trail) -> usize {
        let falsified = lit.negated();
        let mut struck = 0;
        for &idx in &self.occurrences[falsified.index()] {
            let slot = &mut self.clauses[idx];
            if slot.satisfied {
                continue;
            }
            let Some(pos) = slot.active().iter().position(|&l| l == falsified) else {
                continue;
            };
            slot.active -= 1;
            slot.literals.swap(pos, slot.active);
            if slot.active == 0 {
                self.empty += 1;
            }
            trail.push(Change::LiteralStruck(idx));
            struck += 1;
        }
        struck
    }

    /// Adds the clause `{lit}`, letting propagation derive the consequences
    /// of a decision the same way it does for input units.
    pub fn append_unit_clause(&mut self, lit: Literal, trail: &mut Trail) {
        let mut literals = LiteralStorage::new();
        literals.push(lit);
        self.push_clause(literals);
        trail.push(Change::UnitAppended);
    }

    pub(crate) fn restore_clause(&mut self, idx: usize) {
        let slot = &mut self.clauses[idx];
        debug_assert!(slot.satisfied, "restoring clause {idx} which is live");
        slot.satisfied = false;
        self.live += 1;
    }

    /// Puts back the literal most recently struck from clause `idx`. The
    /// trail unwinds newest first, so that literal sits right behind the
    /// active prefix.
    pub(crate) fn restore_literal(&mut self, idx: usize) {
        let slot = &mut self.clauses[idx];
        debug_assert!(slot.active < slot.literals.len());
        if slot.active == 0 {
            self.empty -= 1;
        }
        slot.active += 1;
    }

    pub(crate) fn drop_appended_unit(&mut self) {
        let Some(slot) = self.clauses.pop() else {
            return;
        };
        debug_assert!(!slot.satisfied, "dropping a satisfied appended unit");
        if let Some(&lit) = slot.literals.first() {
            self.occurrences[lit.index()].pop();
        }
        if slot.active == 0 {
            self.empty -= 1;
        }
        self.live -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clause::Clause;
    use itertools::Itertools;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v).unwrap()
    }

    fn sorted(formula: &Formula) -> Vec<Vec<i32>> {
        formula
            .clauses()
            .map(|c| c.iter().map(|l| l.to_i32()).sorted().collect())
            .sorted()
            .collect()
    }

    #[test]
    fn test_structural_queries() {
        let formula = Formula::new(&Cnf::from_clauses(vec![vec![1, 2], vec![-2]]));
        assert_eq!(formula.num_vars(), 2);
        assert_eq!(formula.num_clauses(), 2);
        assert_eq!(formula.num_literals(), 3);
        assert!(!formula.is_empty());
        assert!(!formula.has_conflict());
        assert_eq!(formula.unit_literals().collect_vec(), vec![lit(-2)]);
    }

    #[test]
    fn test_empty_input_clause_is_conflict() {
        let formula = Formula::new(&Cnf::new(1, vec![Clause::from(vec![1]), Clause::default()]));
        assert!(formula.has_conflict());
        assert!(!formula.is_empty());
    }

    #[test]
    fn test_no_clauses_is_empty() {
        let formula = Formula::new(&Cnf::new(3, vec![]));
        assert!(formula.is_empty());
        assert!(!formula.has_conflict());
    }

    #[test]
    fn test_remove_clauses_containing() {
        let mut formula =
            Formula::new(&Cnf::from_clauses(vec![vec![1, 2], vec![-1, 3], vec![1, -3]]));
        let mut trail = Trail::new();
        assert_eq!(formula.remove_clauses_containing(lit(1), &mut trail), 2);
        assert_eq!(sorted(&formula), vec![vec![-1, 3]]);
        assert_eq!(formula.remove_clauses_containing(lit(1), &mut trail), 0);
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_strike_literal_creates_conflict() {
        let mut formula = Formula::new(&Cnf::from_clauses(vec![vec![-1], vec![-1, 2]]));
        let mut trail = Trail::new();
        assert_eq!(formula.strike_literal(lit(1), &mut trail), 2);
        assert!(formula.has_conflict());
        assert_eq!(sorted(&formula), vec![vec![], vec![2]]);

        formula.restore_literal(0);
        assert!(!formula.has_conflict());
    }

    #[test]
    fn test_strike_skips_satisfied_clauses() {
        let mut formula = Formula::new(&Cnf::from_clauses(vec![vec![2, -1], vec![-1, 3]]));
        let mut trail = Trail::new();
        formula.remove_clauses_containing(lit(2), &mut trail);
        assert_eq!(formula.strike_literal(lit(1), &mut trail), 1);
        assert_eq!(sorted(&formula), vec![vec![3]]);
    }

    #[test]
    fn test_append_unit_clause() {
        let mut formula = Formula::new(&Cnf::from_clauses(vec![vec![1, 2]]));
        let mut trail = Trail::new();
        formula.append_unit_clause(lit(-2), &mut trail);
        assert_eq!(formula.num_clauses(), 2);
        assert_eq!(formula.unit_literals().collect_vec(), vec![lit(-2)]);

        formula.drop_appended_unit();
        assert_eq!(formula.num_clauses(), 1);
        assert_eq!(formula.unit_literals().count(), 0);
    }

    #[test]
    fn test_restore_order_reinstates_clause_contents() {
        let mut formula = Formula::new(&Cnf::from_clauses(vec![vec![-1, -2, 3]]));
        let before = sorted(&formula);
        let mut trail = Trail::new();
        formula.strike_literal(lit(1), &mut trail);
        formula.strike_literal(lit(2), &mut trail);
        assert_eq!(formula.unit_literals().collect_vec(), vec![lit(3)]);
        formula.restore_literal(0);
        formula.restore_literal(0);
        assert_eq!(sorted(&formula), before);
    }

    #[test]
    #[should_panic(expected = "outside of the 1 variable universe")]
    fn test_out_of_range_literal_panics() {
        let cnf = Cnf {
            num_vars: 1,
            clauses: vec![Clause::from(vec![2])],
        };
        let _ = Formula::new(&cnf);
    }
}
