#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Defines the main DPLL (Davis-Putnam-Logemann-Loveland) SAT solver.
//!
//! This module provides the `Dpll` struct, a classical DPLL search over a
//! CNF formula. If the formula is satisfiable it also produces a model: an
//! assignment of truth values to all variables that satisfies every clause.
//!
//! The `Dpll` solver is generic over a `SolverConfig`, which selects the
//! propagation strategy and the branching heuristic. `DefaultConfig` uses
//! unit propagation with pure-literal elimination and Jeroslow-Wang
//! branching.
//!
//! Each iteration of the search loop does the following:
//! 1.  If some clause is empty, the current branch has failed: backtrack.
//! 2.  If no clause is left, the formula is satisfied.
//! 3.  Run the propagator. A conflict backtracks, any simplification goes
//!     back to step 1.
//! 4.  Otherwise ask the variable selector for a literal `l` and open a new
//!     decision level with the unit clause `{l}` added.
//!
//! Backtracking unwinds the trail to the most recent decision still in its
//! first phase and retries it with `{-l}`. The `true` branch is therefore
//! always explored completely before the `false` branch, and the first
//! satisfying branch ends the search. When no such decision is left the
//! formula is unsatisfiable.
//!
//! Branches are isolated through the [`Trail`] rather than by cloning: each
//! mutation of the formula or the assignment is recorded with its decision
//! level and reversed on backtrack. Decisions live on an explicit stack, so
//! search depth is not limited by the call stack.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::formula::Formula;
use crate::sat::literal::Literal;
use crate::sat::log::targets::{BACKTRACK, DECISION};
use crate::sat::propagation::{Propagation, Propagator};
use crate::sat::solver::{DefaultConfig, SolutionStats, Solutions, Solver, SolverConfig};
use crate::sat::trail::{DecisionLevel, Trail};
use crate::sat::variable_selection::{DEFAULT_SEED, VariableSelection};

/// Where the search stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchState {
    #[default]
    Undetermined,
    Satisfiable,
    Unsatisfiable,
}

/// Which side of a split a decision is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Phase {
    /// The chosen literal; its negation is still to be tried.
    First,
    /// The negation of the chosen literal; nothing left to try.
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Decision {
    literal: Literal,
    level: DecisionLevel,
    phase: Phase,
}

/// Represents a DPLL SAT solver.
///
/// The solver owns a working copy of the formula together with the
/// assignment and the trail that records how both were changed. The input
/// `Cnf` is kept untouched for reporting and verification.
#[derive(Debug, Clone)]
pub struct Dpll<Config: SolverConfig = DefaultConfig> {
    /// The formula as given.
    pub cnf: Cnf,
    /// The clauses left under the current partial assignment.
    pub formula: Formula,
    pub assignment: Assignment,
    /// Undo log of every change to `formula` and `assignment`.
    pub trail: Trail,
    /// The branching heuristic.
    pub selector: Config::VariableSelector,
    /// Simplification run before every decision.
    pub propagator: Config::Propagator,
    decisions: Vec<Decision>,
    state: SearchState,
    stats: SolutionStats,
}

impl<Config: SolverConfig> Solver<Config> for Dpll<Config> {
    fn new(cnf: Cnf) -> Self {
        Self::with_seed(cnf, DEFAULT_SEED)
    }

    /// Runs the search to completion.
    ///
    /// Calling `solve` again returns the same answer without searching.
    fn solve(&mut self) -> Option<Solutions> {
        if self.state == SearchState::Undetermined {
            self.state = self.search();
            log::debug!(
                target: DECISION,
                "search finished: {:?} after {} decisions and {} conflicts",
                self.state,
                self.stats.decisions,
                self.stats.conflicts
            );
        }

        match self.state {
            SearchState::Satisfiable => Some(self.solutions()),
            _ => None,
        }
    }

    /// Unassigned variables are reported with
    /// [`UNCONSTRAINED_DEFAULT`](crate::sat::assignment::UNCONSTRAINED_DEFAULT).
    fn solutions(&self) -> Solutions {
        self.assignment.get_solutions()
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            propagations: self.propagator.num_propagations(),
            pure_literals: self.propagator.num_pure_literals(),
            ..self.stats
        }
    }
}

impl<Config: SolverConfig> Dpll<Config> {
    /// Creates a solver whose randomised heuristics are seeded with `seed`.
    #[must_use]
    pub fn with_seed(cnf: Cnf, seed: u64) -> Self {
        Self::from_parts(
            cnf,
            Config::VariableSelector::new(seed),
            Config::Propagator::default(),
        )
    }

    /// Creates a solver from explicitly constructed components.
    #[must_use]
    pub fn from_parts(
        cnf: Cnf,
        selector: Config::VariableSelector,
        propagator: Config::Propagator,
    ) -> Self {
        let formula = Formula::new(&cnf);
        let assignment = Assignment::new(cnf.num_vars);
        let trail = Trail::with_capacity(cnf.num_literals() + cnf.num_vars);

        Self {
            cnf,
            formula,
            assignment,
            trail,
            selector,
            propagator,
            decisions: Vec::new(),
            state: SearchState::Undetermined,
            stats: SolutionStats::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SearchState {
        self.state
    }

    fn search(&mut self) -> SearchState {
        loop {
            if self.formula.has_conflict() {
                if !self.backtrack() {
                    return SearchState::Unsatisfiable;
                }
                continue;
            }

            if self.formula.is_empty() {
                return SearchState::Satisfiable;
            }

            match self.propagator.propagate(
                &mut self.formula,
                &mut self.assignment,
                &mut self.trail,
            ) {
                Propagation::Conflict | Propagation::Progress => {}
                Propagation::Fixpoint => match self.selector.pick(&self.formula) {
                    Some(lit) => self.decide(lit, Phase::First),
                    // Live clauses without literals are all empty, which the
                    // conflict check picks up.
                    None => debug_assert!(self.formula.has_conflict()),
                },
            }
        }
    }

    /// Opens a decision level and adds the unit clause `{lit}`.
    fn decide(&mut self, lit: Literal, phase: Phase) {
        let level = self.trail.new_decision_level();
        self.stats.decisions += 1;
        self.stats.max_depth = self.stats.max_depth.max(level);

        log::debug!(target: DECISION, "level {level}: branch on {lit} ({phase:?})");

        self.decisions.push(Decision {
            literal: lit,
            level,
            phase,
        });
        self.formula.append_unit_clause(lit, &mut self.trail);
    }

    /// Undoes the failed branch and switches the most recent decision still
    /// in its first phase to its second phase.
    ///
    /// Returns `false` when every decision has been tried both ways.
    fn backtrack(&mut self) -> bool {
        self.stats.conflicts += 1;

        while let Some(decision) = self.decisions.pop() {
            let undone = self.trail.backtrack_to(
                decision.level,
                &mut self.formula,
                &mut self.assignment,
            );
            log::debug!(
                target: BACKTRACK,
                "undid {undone} steps of level {} ({})",
                decision.level,
                decision.literal
            );

            if decision.phase == Phase::First {
                self.decide(decision.literal.negated(), Phase::Second);
                return true;
            }
        }

        false
    }
}
