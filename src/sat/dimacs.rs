#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A parser for the DIMACS CNF file format.
//!
//! The format is line oriented:
//! - Lines starting with `c` are comments. Blank lines are skipped.
//! - The first other line must be the problem line `p cnf <num_vars> <num_clauses>`.
//! - Every following line is one clause: whitespace separated non-zero
//!   integers (positive for a variable, negative for its negation) terminated
//!   by `0`. A line holding only `0` is the empty clause.
//! - A line starting with `%` ends the data; anything after it is ignored.
//!
//! Malformed input is reported as a [`DimacsError`] carrying the 1-based line
//! number. A clause count that disagrees with the problem line is only
//! logged, since many published benchmarks get it wrong.

use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::log::targets::PARSE;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors produced while reading a DIMACS CNF file.
#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("missing `p cnf <vars> <clauses>` problem line")]
    MissingProblemLine,

    #[error("line {0}: malformed problem line, expected `p cnf <vars> <clauses>`")]
    MalformedProblemLine(usize),

    #[error("line {0}: clause is not terminated by 0")]
    UnterminatedClause(usize),

    #[error("line {1}: invalid literal `{0}`")]
    InvalidLiteral(String, usize),

    #[error("line {line}: literal {literal} is outside of the declared {num_vars} variables")]
    VariableOutOfRange {
        literal: i32,
        num_vars: usize,
        line: usize,
    },
}

/// Header values from the problem line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProblemLine {
    num_vars: usize,
    num_clauses: usize,
}

fn parse_problem_line(line: &str, line_no: usize) -> Result<ProblemLine, DimacsError> {
    let malformed = || DimacsError::MalformedProblemLine(line_no);

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let &["p", "cnf", vars, clauses] = tokens.as_slice() else {
        return Err(malformed());
    };

    // Literals are `i32`, so larger variable counts cannot be written down.
    let num_vars: usize = vars.parse().map_err(|_| malformed())?;
    if i32::try_from(num_vars).is_err() {
        return Err(malformed());
    }

    Ok(ProblemLine {
        num_vars,
        num_clauses: clauses.parse().map_err(|_| malformed())?,
    })
}

fn parse_clause(line: &str, line_no: usize, num_vars: usize) -> Result<Clause, DimacsError> {
    let mut literals = Vec::new();
    let mut terminated = false;

    for token in line.split_whitespace() {
        if terminated {
            // nothing may follow the terminating 0
            return Err(DimacsError::InvalidLiteral(token.to_string(), line_no));
        }

        let value: i32 = token
            .parse()
            .map_err(|_| DimacsError::InvalidLiteral(token.to_string(), line_no))?;

        let Some(lit) = Literal::from_i32(value) else {
            terminated = true;
            continue;
        };

        if lit.variable() as usize > num_vars {
            return Err(DimacsError::VariableOutOfRange {
                literal: value,
                num_vars,
                line: line_no,
            });
        }
        literals.push(lit);
    }

    if !terminated {
        return Err(DimacsError::UnterminatedClause(line_no));
    }

    Ok(Clause::new(literals))
}

/// Parses DIMACS formatted data from a `BufRead` source into a `Cnf`.
///
/// # Errors
///
/// - `DimacsError::Io` if reading from `reader` fails.
/// - `DimacsError::MissingProblemLine` if no problem line precedes the clauses.
/// - Any of the line-level variants for malformed content.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, DimacsError> {
    let mut problem: Option<ProblemLine> = None;
    let mut clauses = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        if trimmed.starts_with('%') {
            log::debug!(target: PARSE, "end of data marker on line {line_no}");
            break;
        }

        match problem {
            None => problem = Some(parse_problem_line(trimmed, line_no)?),
            Some(ProblemLine { num_vars, .. }) => {
                clauses.push(parse_clause(trimmed, line_no, num_vars)?);
            }
        }
    }

    let ProblemLine {
        num_vars,
        num_clauses,
    } = problem.ok_or(DimacsError::MissingProblemLine)?;

    if clauses.len() != num_clauses {
        log::warn!(
            target: PARSE,
            "problem line declares {num_clauses} clauses but {} were read",
            clauses.len()
        );
    }
    log::debug!(
        target: PARSE,
        "parsed {} clauses over {num_vars} variables",
        clauses.len()
    );

    Ok(Cnf::new(num_vars, clauses))
}

/// Parses DIMACS text held in memory.
///
/// # Errors
///
/// See [`parse_dimacs`].
pub fn parse_str(input: &str) -> Result<Cnf, DimacsError> {
    parse_dimacs(input.as_bytes())
}

/// Opens and parses a DIMACS CNF file.
///
/// # Errors
///
/// `DimacsError::Io` if the file cannot be opened, otherwise see
/// [`parse_dimacs`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Cnf, DimacsError> {
    let file = File::open(path)?;
    parse_dimacs(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn clause_values(cnf: &Cnf, i: usize) -> Vec<i32> {
        cnf[i].iter().map(|l| l.to_i32()).collect()
    }

    #[test]
    fn test_parse_simple_dimacs() {
        let content = "c This is a comment\n\
                       p cnf 3 2\n\
                       1 -2 0\n\
                       2 3 0\n";
        let cnf = parse_dimacs(Cursor::new(content)).unwrap();

        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.num_clauses(), 2);
        assert_eq!(clause_values(&cnf, 0), vec![1, -2]);
        assert_eq!(clause_values(&cnf, 1), vec![2, 3]);
    }

    #[test]
    fn test_blank_lines_comments_and_end_marker() {
        let content = "c header\n\
                       \n\
                       p cnf 2 2\n\
                       \n\
                       1 0\n\
                       c between\n\
                       -2 0\n\
                       %\n\
                       0\n\
                       garbage";
        let cnf = parse_str(content).unwrap();
        assert_eq!(cnf.num_clauses(), 2);
        assert_eq!(clause_values(&cnf, 1), vec![-2]);
    }

    #[test]
    fn test_empty_clause() {
        let cnf = parse_str("p cnf 1 2\n1 0\n0\n").unwrap();
        assert_eq!(cnf.num_clauses(), 2);
        assert!(cnf[1].is_empty());
    }

    #[test]
    fn test_no_clauses() {
        let cnf = parse_str("p cnf 5 0\n").unwrap();
        assert_eq!(cnf.num_vars, 5);
        assert!(cnf.clauses.is_empty());
    }

    #[test]
    fn test_duplicate_literals_collapse() {
        let cnf = parse_str("p cnf 2 1\n1 1 -2 1 0\n").unwrap();
        assert_eq!(clause_values(&cnf, 0), vec![1, -2]);
    }

    #[test]
    fn test_clause_count_mismatch_is_accepted() {
        let cnf = parse_str("p cnf 2 5\n1 2 0\n").unwrap();
        assert_eq!(cnf.num_clauses(), 1);
    }

    #[test]
    fn test_missing_problem_line() {
        assert!(matches!(parse_str(""), Err(DimacsError::MissingProblemLine)));
        assert!(matches!(
            parse_str("c only comments\n"),
            Err(DimacsError::MissingProblemLine)
        ));
    }

    #[test]
    fn test_clause_before_problem_line() {
        assert!(matches!(
            parse_str("1 2 0\np cnf 2 1\n"),
            Err(DimacsError::MalformedProblemLine(1))
        ));
    }

    #[test]
    fn test_malformed_problem_line() {
        for header in ["p cnf 3", "p dnf 3 1", "p cnf x 1", "p cnf 3 1 7", "p cnf -1 1"] {
            let input = format!("c\n{header}\n1 0\n");
            assert!(
                matches!(parse_str(&input), Err(DimacsError::MalformedProblemLine(2))),
                "{header}"
            );
        }
    }

    #[test]
    fn test_variable_count_beyond_literal_range() {
        assert!(matches!(
            parse_str("p cnf 2147483648 1\n-2147483648 0\n"),
            Err(DimacsError::MalformedProblemLine(1))
        ));
        assert!(matches!(
            parse_str("p cnf 18446744073709551615 0\n"),
            Err(DimacsError::MalformedProblemLine(1))
        ));
        assert_eq!(parse_str("p cnf 2147483647 0\n").unwrap().num_vars, 2_147_483_647);
    }

    #[test]
    fn test_unterminated_clause() {
        assert!(matches!(
            parse_str("p cnf 3 2\n1 2 0\n-1 3\n"),
            Err(DimacsError::UnterminatedClause(3))
        ));
    }

    #[test]
    fn test_invalid_literal() {
        match parse_str("p cnf 3 1\n1 abc 0\n") {
            Err(DimacsError::InvalidLiteral(token, 2)) => assert_eq!(token, "abc"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_zero_inside_clause() {
        assert!(matches!(
            parse_str("p cnf 3 1\n1 0 2 0\n"),
            Err(DimacsError::InvalidLiteral(_, 2))
        ));
    }

    #[test]
    fn test_variable_out_of_range() {
        match parse_str("p cnf 2 1\n1 -3 0\n") {
            Err(DimacsError::VariableOutOfRange {
                literal,
                num_vars,
                line,
            }) => {
                assert_eq!((literal, num_vars, line), (-3, 2, 2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_file("/definitely/not/here.cnf"),
            Err(DimacsError::Io(_))
        ));
    }

    #[test]
    fn test_display_round_trips() {
        let input = "p cnf 3 3\n1 -2 0\n2 3 0\n-1 0\n";
        let cnf = parse_str(input).unwrap();
        assert_eq!(parse_str(&cnf.to_string()).unwrap(), cnf);
    }
}
