#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Branching heuristics.
//!
//! When propagation stalls the search asks a [`VariableSelection`] for the
//! literal to split on. Every strategy only ever returns a literal that
//! still occurs in a live clause, so its variable is unassigned.
//!
//! - [`TopKFrequency`]: take the `K` variables with the most occurrences and
//!   pick one of their occurrences uniformly at random.
//! - [`JeroslowWang`]: score each literal by `sum(2^-|c|)` over the clauses
//!   `c` containing it and take the best literal. Short clauses weigh more.
//! - [`JeroslowWangTwoSided`]: score variables by the sum of both literal
//!   scores, then branch on the better polarity.
//! - [`RandomLiteral`]: pick one literal occurrence uniformly at random.
//!
//! Randomised strategies own a seeded [`fastrand::Rng`], so runs are
//! reproducible for a given seed.

use crate::sat::formula::Formula;
use crate::sat::literal::{Literal, Variable};
use clap::ValueEnum;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::fmt::{self, Debug, Display};

/// Seed used when the caller does not provide one.
pub const DEFAULT_SEED: u64 = 0x5EED;

pub trait VariableSelection: Debug + Clone {
    /// Creates the strategy; randomised strategies seed their generator
    /// with `seed`.
    fn new(seed: u64) -> Self;

    /// Returns a literal occurring in some live clause of `formula`, or
    /// `None` if no literal is left.
    fn pick(&mut self, formula: &Formula) -> Option<Literal>;
}

/// Chooses the `n`-th remaining literal occurrence.
fn nth_occurrence<F: Fn(Literal) -> bool>(formula: &Formula, n: usize, keep: F) -> Option<Literal> {
    formula.literals().filter(|&lit| keep(lit)).nth(n)
}

fn variable_counts(formula: &Formula) -> Vec<usize> {
    let mut counts = vec![0; formula.num_vars() + 1];
    for lit in formula.literals() {
        counts[lit.variable() as usize] += 1;
    }
    counts
}

/// Per-literal Jeroslow-Wang scores, indexed by [`Literal::index`].
fn jeroslow_wang_scores(formula: &Formula) -> Vec<f64> {
    let mut scores = vec![0.0; 2 * (formula.num_vars() + 1)];
    for clause in formula.clauses() {
        let weight = 0.5_f64.powi(i32::try_from(clause.len()).unwrap_or(i32::MAX));
        for lit in clause {
            scores[lit.index()] += weight;
        }
    }
    scores
}

fn literal_at(index: usize, polarity: bool) -> Option<Literal> {
    let var = Variable::try_from(index / 2).ok()?;
    Some(Literal::new(var, polarity))
}

#[derive(Debug, Clone)]
pub struct TopKFrequency<const K: usize = 3> {
    rng: fastrand::Rng,
}

impl<const K: usize> VariableSelection for TopKFrequency<K> {
    fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        let counts = variable_counts(formula);
        let top = counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .k_smallest_by_key(K, |&(var, &count)| (Reverse(count), var))
            .collect_vec();

        let total: usize = top.iter().map(|&(_, &count)| count).sum();
        if total == 0 {
            return None;
        }

        let n = self.rng.usize(..total);
        nth_occurrence(formula, n, |lit| {
            top.iter().any(|&(var, _)| var == lit.variable() as usize)
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JeroslowWang;

impl VariableSelection for JeroslowWang {
    fn new(_: u64) -> Self {
        Self
    }

    /// Ties go to the lowest variable, positive before negative.
    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        jeroslow_wang_scores(formula)
            .into_iter()
            .enumerate()
            .filter(|&(_, score)| score > 0.0)
            .min_by_key(|&(index, score)| (Reverse(OrderedFloat(score)), index))
            .and_then(|(index, _)| literal_at(index, index % 2 == 0))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JeroslowWangTwoSided;

impl VariableSelection for JeroslowWangTwoSided {
    fn new(_: u64) -> Self {
        Self
    }

    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        let scores = jeroslow_wang_scores(formula);
        scores
            .chunks_exact(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] + pair[1] > 0.0)
            .min_by_key(|&(var, pair)| (Reverse(OrderedFloat(pair[0] + pair[1])), var))
            .and_then(|(var, pair)| literal_at(var * 2, pair[0] >= pair[1]))
    }
}

#[derive(Debug, Clone)]
pub struct RandomLiteral {
    rng: fastrand::Rng,
}

impl VariableSelection for RandomLiteral {
    fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        let total = formula.num_literals();
        if total == 0 {
            return None;
        }
        let n = self.rng.usize(..total);
        nth_occurrence(formula, n, |_| true)
    }
}

/// Runtime choice between the strategies.
#[derive(Debug, Clone)]
pub enum VariableSelectionImpls {
    TopKFrequency(TopKFrequency),
    JeroslowWang(JeroslowWang),
    JeroslowWangTwoSided(JeroslowWangTwoSided),
    RandomLiteral(RandomLiteral),
}

impl VariableSelection for VariableSelectionImpls {
    fn new(seed: u64) -> Self {
        VariableSelectionType::default().to_impl(seed)
    }

    fn pick(&mut self, formula: &Formula) -> Option<Literal> {
        match self {
            Self::TopKFrequency(s) => s.pick(formula),
            Self::JeroslowWang(s) => s.pick(formula),
            Self::JeroslowWangTwoSided(s) => s.pick(formula),
            Self::RandomLiteral(s) => s.pick(formula),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VariableSelectionType {
    /// Random occurrence among the three most frequent variables.
    TopK,
    /// Literal with the highest one-sided Jeroslow-Wang score.
    #[default]
    JeroslowWang,
    /// Variable with the highest two-sided Jeroslow-Wang score.
    JeroslowWangTwoSided,
    /// Uniformly random literal occurrence.
    Random,
}

impl Display for VariableSelectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopK => write!(f, "top-k"),
            Self::JeroslowWang => write!(f, "jeroslow-wang"),
            Self::JeroslowWangTwoSided => write!(f, "jeroslow-wang-two-sided"),
            Self::Random => write!(f, "random"),
        }
    }
}

impl VariableSelectionType {
    #[must_use]
    pub fn to_impl(self, seed: u64) -> VariableSelectionImpls {
        match self {
            Self::TopK => VariableSelectionImpls::TopKFrequency(TopKFrequency::new(seed)),
            Self::JeroslowWang => VariableSelectionImpls::JeroslowWang(JeroslowWang),
            Self::JeroslowWangTwoSided => {
                VariableSelectionImpls::JeroslowWangTwoSided(JeroslowWangTwoSided)
            }
            Self::Random => VariableSelectionImpls::RandomLiteral(RandomLiteral::new(seed)),
        }
    }
}
