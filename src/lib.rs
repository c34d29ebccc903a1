//! This crate provides a DPLL solver for the Boolean satisfiability problem,
//! together with a reader for DIMACS CNF files.

/// The `sat` module implements the solver: the formula representation, the
/// propagation rules, branching heuristics and the backtracking search.
pub mod sat;
