#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The parsed input formula.
//!
//! `Cnf` is the immutable hand-off between the reader and the solver: a
//! variable universe size plus the clause list, exactly as read. The solver
//! never mutates it; search works on a [`Formula`](crate::sat::formula::Formula)
//! built from it. `Cnf` also hosts the verifier used to re-check a witness
//! against the original clauses.

use crate::sat::assignment::Solutions;
use crate::sat::clause::Clause;
use crate::sat::literal::Literal;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    /// Size of the variable universe; valid variables are `1..=num_vars`.
    pub num_vars: usize,
    pub clauses: Vec<Clause>,
}

impl Cnf {
    /// Creates a formula over `num_vars` variables.
    ///
    /// # Panics
    ///
    /// If any literal mentions a variable above `num_vars`. Readers are
    /// expected to reject such input before building a `Cnf`.
    #[must_use]
    pub fn new(num_vars: usize, clauses: Vec<Clause>) -> Self {
        if let Some(clause) = clauses
            .iter()
            .find(|c| c.max_variable() as usize > num_vars)
        {
            panic!("clause `{clause}` mentions a variable above {num_vars}");
        }
        Self { num_vars, clauses }
    }

    /// Builds a formula from DIMACS-style integer clauses, sizing the variable
    /// universe to the largest variable mentioned.
    #[must_use]
    pub fn from_clauses<I, C>(clauses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        let clauses: Vec<Clause> = clauses.into_iter().map(Into::into).collect();
        let num_vars = clauses
            .iter()
            .map(|c| c.max_variable() as usize)
            .max()
            .unwrap_or(0);
        Self { num_vars, clauses }
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Total number of literal occurrences.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Checks a witness against every clause: each clause needs at least one
    /// literal whose variable is assigned the literal's polarity. A variable
    /// missing from `solutions` satisfies nothing.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|&lit| solutions.literal_value(lit) == Some(true))
        })
    }

    /// Returns the first clause the witness leaves unsatisfied.
    #[must_use]
    pub fn first_unsatisfied(&self, solutions: &Solutions) -> Option<&Clause> {
        self.clauses.iter().find(|clause| {
            !clause
                .iter()
                .any(|&lit| solutions.literal_value(lit) == Some(true))
        })
    }

    /// Every literal occurring in the formula, in clause order.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.clauses.iter().flat_map(|c| c.iter().copied())
    }
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

/// Writes the formula in DIMACS form.
impl fmt::Display for Cnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}
