#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A disjunction of literals as it appears in the input formula.

use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;

/// Inline capacity of a clause before it spills to the heap.
pub const INLINE_LITERALS: usize = 8;

pub type LiteralStorage = SmallVec<[Literal; INLINE_LITERALS]>;

/// An unordered set of literals. Duplicates are removed on construction, the
/// first occurrence keeps its position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    literals: LiteralStorage,
}

impl Clause {
    #[must_use]
    pub fn new<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        Self {
            literals: literals.into_iter().unique().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// Largest variable id mentioned by the clause, `0` for the empty clause.
    #[must_use]
    pub fn max_variable(&self) -> Variable {
        self.literals
            .iter()
            .map(|lit| lit.variable())
            .max()
            .unwrap_or(0)
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<T: IntoIterator<Item = Literal>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self::new(literals)
    }
}

/// Builds a clause from DIMACS integers, dropping any `0`.
impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        literals.into_iter().filter_map(Literal::from_i32).collect()
    }
}

impl From<&[i32]> for Clause {
    fn from(literals: &[i32]) -> Self {
        literals.iter().copied().filter_map(Literal::from_i32).collect()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in &self.literals {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let clause = Clause::from(vec![1, 2, 3]);
        assert_eq!(clause.len(), 3);
        assert!(!clause.is_unit());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let clause = Clause::from(vec![2, -1, 2, -1]);
        assert_eq!(clause.len(), 2);
        assert_eq!(clause[0].to_i32(), 2);
        assert_eq!(clause[1].to_i32(), -1);
    }

    #[test]
    fn test_zero_dropped() {
        let clause = Clause::from(vec![4, 0]);
        assert!(clause.is_unit());
        assert_eq!(clause.max_variable(), 4);
    }

    #[test]
    fn test_empty_clause() {
        let empty = Clause::from(Vec::<i32>::new());
        assert!(empty.is_empty());
        assert_eq!(empty.max_variable(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Clause::from(vec![1, -3]).to_string(), "1 -3 0");
        assert_eq!(Clause::default().to_string(), "0");
    }
}
