#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The undo log of the search.
//!
//! Every mutation the search performs on the [`Formula`] or the
//! [`Assignment`] is recorded here together with the decision level it was
//! made at. Backtracking to a level pops and reverses exactly the entries
//! recorded at that level or deeper, so a failed branch leaves no trace on
//! the state its sibling branch starts from.

use crate::sat::assignment::Assignment;
use crate::sat::formula::Formula;
use crate::sat::literal::Variable;
use core::ops::Index;

pub type DecisionLevel = usize;

/// A single reversible mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// A variable received a value.
    Assigned(Variable),
    /// The clause at this index was satisfied and dropped from the live set.
    ClauseRemoved(usize),
    /// A falsified literal was struck from the clause at this index.
    LiteralStruck(usize),
    /// A unit clause was appended to materialise a decision.
    UnitAppended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub change: Change,
    pub decision_level: DecisionLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    steps: Vec<Step>,
    decision_level: DecisionLevel,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            steps: Vec::with_capacity(capacity),
            decision_level: 0,
        }
    }

    #[must_use]
    pub const fn decision_level(&self) -> DecisionLevel {
        self.decision_level
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Opens a new decision level and returns it.
    pub fn new_decision_level(&mut self) -> DecisionLevel {
        self.decision_level += 1;
        self.decision_level
    }

    /// Records `change` at the current decision level.
    pub fn push(&mut self, change: Change) {
        self.steps.push(Step {
            change,
            decision_level: self.decision_level,
        });
    }

    /// Reverses every step made at `level` or deeper, newest first, and
    /// leaves the trail at `level - 1`.
    ///
    /// Returns the number of steps undone.
    pub fn backtrack_to(
        &mut self,
        level: DecisionLevel,
        formula: &mut Formula,
        assignment: &mut Assignment,
    ) -> usize {
        let mut undone = 0;
        while let Some(step) = self.steps.last().copied() {
            if step.decision_level < level {
                break;
            }
            self.steps.pop();
            match step.change {
                Change::Assigned(var) => assignment.unassign(var),
                Change::ClauseRemoved(idx) => formula.restore_clause(idx),
                Change::LiteralStruck(idx) => formula.restore_literal(idx),
                Change::UnitAppended => formula.drop_appended_unit(),
            }
            undone += 1;
        }
        self.decision_level = level.saturating_sub(1);
        undone
    }
}
