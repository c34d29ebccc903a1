#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Literals and variables.
//!
//! A literal is a variable together with a polarity. In DIMACS it is written
//! as a signed integer whose magnitude is the variable id and whose sign is the
//! polarity. The integer `0` terminates clauses in DIMACS and is therefore
//! never a literal; `Literal` wraps a `NonZeroI32` so that a zero literal
//! cannot be constructed at all. Where a slot may hold "no literal", the
//! code uses `Option<Literal>`, which has the same size thanks to the niche.

use core::fmt;
use core::num::NonZeroI32;
use core::ops::{Neg, Not};

/// A variable id. Valid ids are `1..=num_vars`.
pub type Variable = u32;

/// A non-zero signed literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(NonZeroI32);

impl Literal {
    /// Creates the literal of `var` with the given polarity (`true` = positive).
    ///
    /// # Panics
    ///
    /// If `var` is zero or does not fit in an `i32`.
    #[must_use]
    pub fn new(var: Variable, polarity: bool) -> Self {
        let magnitude = i32::try_from(var).expect("variable id overflowed i32");
        let value = if polarity { magnitude } else { -magnitude };
        Self(NonZeroI32::new(value).expect("variable 0 has no literal"))
    }

    /// Converts a DIMACS integer into a literal. Returns `None` for `0`.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match NonZeroI32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn to_i32(self) -> i32 {
        self.0.get()
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0.get().unsigned_abs()
    }

    /// `true` for a positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0.get() > 0
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0.wrapping_neg())
    }

    /// Dense index for per-literal tables: `2 * var` for the positive literal
    /// and `2 * var + 1` for the negative one. Tables sized `2 * (num_vars + 1)`
    /// can be indexed by any literal of the formula.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.variable() as usize) * 2 + self.is_negated() as usize
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl TryFrom<i32> for Literal {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::from_i32(value).ok_or(value)
    }
}

impl From<Literal> for i32 {
    fn from(lit: Literal) -> Self {
        lit.to_i32()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_neg() {
        assert_eq!(Literal::new(1, false).negated(), Literal::new(1, true));
        assert_eq!(-Literal::new(1, true), Literal::new(1, false));
        assert_eq!(!Literal::new(7, false), Literal::new(7, true));
    }

    #[test]
    fn test_zero_is_not_a_literal() {
        assert_eq!(Literal::from_i32(0), None);
        assert_eq!(Literal::try_from(0), Err(0));
        assert_eq!(
            core::mem::size_of::<Option<Literal>>(),
            core::mem::size_of::<Literal>()
        );
    }

    #[test]
    fn test_variable_and_polarity() {
        let lit = Literal::from_i32(-4).unwrap();
        assert_eq!(lit.variable(), 4);
        assert!(!lit.polarity());
        assert!(lit.is_negated());
        assert_eq!(lit.to_i32(), -4);
        assert_eq!(lit.to_string(), "-4");
    }

    #[test]
    fn test_index_is_dense_and_distinct() {
        let pos = Literal::new(3, true);
        let neg = Literal::new(3, false);
        assert_eq!(pos.index(), 6);
        assert_eq!(neg.index(), 7);
        assert_eq!(Literal::new(1, true).index(), 2);
    }

    #[test]
    #[should_panic(expected = "variable 0 has no literal")]
    fn test_new_rejects_variable_zero() {
        let _ = Literal::new(0, true);
    }
}
