#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The assignment store and the witness handed back to callers.

use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use itertools::Itertools;
use std::fmt;

/// Value given to variables the search never had to assign.
///
/// A variable stays unassigned when it occurs in no clause, or when every
/// clause mentioning it was satisfied by something else first. Any value
/// works for such a variable; `false` is used so witnesses are stable.
pub const UNCONSTRAINED_DEFAULT: bool = false;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

/// One [`VarState`] per variable, indexed by variable id. Slot 0 is unused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment(Vec<VarState>);

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.0[index as usize]
    }
}

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self(vec![VarState::Unassigned; num_vars + 1])
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Makes `lit` true.
    ///
    /// # Panics
    ///
    /// If the variable is already assigned. Within a branch every variable is
    /// written at most once; a second write means propagation or the search
    /// handed out a literal that was no longer free.
    pub fn assign(&mut self, lit: Literal) {
        let slot = &mut self.0[lit.variable() as usize];
        assert!(
            slot.is_unassigned(),
            "variable {} assigned twice (now {lit}, was {slot:?})",
            lit.variable()
        );
        *slot = VarState::Assigned(lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        self.0[var as usize] = VarState::Unassigned;
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        self.0.get(var as usize).copied().and_then(VarState::value)
    }

    /// `Some(true)` if `lit` is satisfied, `Some(false)` if falsified.
    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| b == lit.polarity())
    }

    #[must_use]
    pub fn num_assigned(&self) -> usize {
        self.0.iter().filter(|s| s.is_assigned()).count()
    }

    /// Total witness over `1..=num_vars`, filling unassigned variables with
    /// [`UNCONSTRAINED_DEFAULT`].
    #[must_use]
    pub fn get_solutions(&self) -> Solutions {
        (1..self.0.len())
            .filter_map(|var| Variable::try_from(var).ok())
            .map(|var| {
                Literal::new(
                    var,
                    self[var].value().unwrap_or(UNCONSTRAINED_DEFAULT),
                )
            })
            .collect()
    }
}

/// A satisfying assignment as a list of true literals, sorted by variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solutions(Vec<Literal>);

impl Solutions {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.0.iter()
    }

    /// Value of `var`, `None` if the witness does not mention it.
    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.0
            .binary_search_by_key(&var, |lit| lit.variable())
            .ok()
            .map(|i| self.0[i].polarity())
    }

    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.value(lit.variable()).map(|b| b == lit.polarity())
    }

    #[must_use]
    pub fn to_dimacs(&self) -> Vec<i32> {
        self.0.iter().map(|lit| lit.to_i32()).collect()
    }
}

impl FromIterator<Literal> for Solutions {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .sorted_by_key(|lit| lit.variable())
                .dedup_by(|a, b| a.variable() == b.variable())
                .collect(),
        )
    }
}

impl From<Vec<i32>> for Solutions {
    fn from(values: Vec<i32>) -> Self {
        values.into_iter().filter_map(Literal::from_i32).collect()
    }
}

impl fmt::Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::from_i32(v).unwrap()
    }

    #[test]
    fn test_assign_and_unassign() {
        let mut a = Assignment::new(3);
        assert_eq!(a.num_vars(), 3);
        a.assign(lit(-2));
        assert_eq!(a.var_value(2), Some(false));
        assert_eq!(a.literal_value(lit(2)), Some(false));
        assert_eq!(a.literal_value(lit(-2)), Some(true));
        assert_eq!(a.literal_value(lit(1)), None);
        assert_eq!(a.num_assigned(), 1);

        a.unassign(2);
        assert!(a[2].is_unassigned());
        assert_eq!(a.num_assigned(), 0);
    }

    #[test]
    #[should_panic(expected = "variable 1 assigned twice")]
    fn test_double_assign_panics() {
        let mut a = Assignment::new(1);
        a.assign(lit(1));
        a.assign(lit(-1));
    }

    #[test]
    fn test_solutions_fill_default() {
        let mut a = Assignment::new(3);
        a.assign(lit(2));
        let sol = a.get_solutions();
        assert_eq!(sol.to_dimacs(), vec![-1, 2, -3]);
        assert_eq!(sol.to_string(), "-1 2 -3");
    }

    #[test]
    fn test_solutions_lookup() {
        let sol = Solutions::from(vec![3, -1, 2]);
        assert_eq!(sol.value(1), Some(false));
        assert_eq!(sol.value(3), Some(true));
        assert_eq!(sol.value(4), None);
        assert_eq!(sol.literal_value(lit(-1)), Some(true));
        assert_eq!(sol.literal_value(lit(1)), Some(false));
        assert_eq!(sol.len(), 3);
    }
}
