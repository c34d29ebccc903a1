#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver interface and its type-level configuration.

use crate::sat::cnf::Cnf;
use crate::sat::propagation::{Propagator, PropagatorImpls, UnitPropagationWithPureLiterals};
use crate::sat::variable_selection::{JeroslowWang, VariableSelection, VariableSelectionImpls};
use std::fmt::Debug;

pub use crate::sat::assignment::Solutions;

/// Picks the components a solver is built from.
pub trait SolverConfig: Debug + Clone {
    type VariableSelector: VariableSelection;
    type Propagator: Propagator + Default;
}

/// Jeroslow-Wang branching with unit propagation and pure-literal
/// elimination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultConfig;

impl SolverConfig for DefaultConfig {
    type VariableSelector = JeroslowWang;
    type Propagator = UnitPropagationWithPureLiterals;
}

/// Components chosen at runtime, e.g. from command line options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DynamicConfig;

impl SolverConfig for DynamicConfig {
    type VariableSelector = VariableSelectionImpls;
    type Propagator = PropagatorImpls;
}

/// Counters collected during a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolutionStats {
    /// Branching decisions, counting both phases of a split.
    pub decisions: usize,
    /// Branches abandoned because a clause became empty.
    pub conflicts: usize,
    /// Variables assigned by unit propagation.
    pub propagations: usize,
    /// Variables assigned by pure-literal elimination.
    pub pure_literals: usize,
    /// Deepest decision level reached.
    pub max_depth: usize,
}

pub trait Solver<Config: SolverConfig = DefaultConfig> {
    /// Creates a solver for `cnf` with default components.
    fn new(cnf: Cnf) -> Self;

    /// Decides the formula. `Some` holds a satisfying assignment covering
    /// every variable of the formula, `None` means unsatisfiable.
    fn solve(&mut self) -> Option<Solutions>;

    /// The current assignment as a total witness.
    fn solutions(&self) -> Solutions;

    fn stats(&self) -> SolutionStats;
}
