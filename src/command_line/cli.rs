#![allow(clippy::cast_precision_loss)]

use clap::{ArgAction, Args, Parser, Subcommand};
use dpll_sat::sat::cnf::Cnf;
use dpll_sat::sat::dimacs::{DimacsError, parse_file, parse_str};
use dpll_sat::sat::dpll::Dpll;
use dpll_sat::sat::log::targets::SOLVE;
use dpll_sat::sat::propagation::PropagatorType;
use dpll_sat::sat::solver::{DynamicConfig, SolutionStats, Solutions, Solver};
use dpll_sat::sat::variable_selection::{DEFAULT_SEED, VariableSelectionType};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};

/// Defines the command-line interface of the solver.
#[derive(Parser, Debug)]
#[command(
    name = "dpll-sat",
    version,
    about = "A DPLL SAT solver for DIMACS CNF formulas",
    args_conflicts_with_subcommands = true
)]
pub(crate) struct Cli {
    /// Path to a DIMACS .cnf file, solved when no subcommand is given.
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute.
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Options used when solving `path` directly.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a CNF file in DIMACS format.
    File {
        /// Path to the DIMACS .cnf file.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve DIMACS CNF given on the command line.
    Text {
        /// DIMACS text, e.g. "p cnf 3 2\n1 -2 0\n2 3 0". A literal `\n` is
        /// read as a line break.
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every .cnf file below a directory.
    Dir {
        /// Directory to search recursively.
        #[arg(long)]
        path: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// The solving options of the subcommand, if it solves anything.
    pub(crate) const fn common(&self) -> Option<&CommonOptions> {
        match self {
            Self::File { common, .. } | Self::Text { common, .. } | Self::Dir { common, .. } => {
                Some(common)
            }
            Self::Completions { .. } => None,
        }
    }
}

/// Defines command-line options shared across the solving subcommands.
#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Log decisions and backtracks and print the parsed formula.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Check a satisfying assignment against the input formula.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) verify: bool,

    /// Print problem and search statistics after solving.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub(crate) stats: bool,

    /// Print the satisfying assignment.
    #[arg(short, long, default_value_t = false)]
    pub(crate) print_solution: bool,

    /// Branching heuristic.
    #[arg(long, default_value_t = VariableSelectionType::JeroslowWang)]
    pub(crate) heuristic: VariableSelectionType,

    /// Seed for the randomised heuristics.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,

    /// Use unit propagation only, without pure-literal elimination.
    #[arg(long, default_value_t = false)]
    pub(crate) no_pure_literals: bool,
}

impl CommonOptions {
    const fn propagator(&self) -> PropagatorType {
        if self.no_pure_literals {
            PropagatorType::Units
        } else {
            PropagatorType::UnitsAndPureLiterals
        }
    }
}

/// Result of a run, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Outcome {
    Satisfiable,
    Unsatisfiable,
    InputError,
    VerificationFailed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Satisfiable => Self::SUCCESS,
            Outcome::Unsatisfiable => Self::from(1),
            Outcome::InputError => Self::from(2),
            Outcome::VerificationFailed => Self::from(3),
        }
    }
}

/// Parses a DIMACS file and solves it.
pub(crate) fn solve_file(path: &Path, common: &CommonOptions) -> Outcome {
    let time = Instant::now();
    match parse_file(path) {
        Ok(cnf) => solve_and_report(&cnf, common, Some(path), time.elapsed()),
        Err(e) => report_input_error(Some(path), &e),
    }
}

/// Parses DIMACS text from the command line and solves it.
pub(crate) fn solve_text(input: &str, common: &CommonOptions) -> Outcome {
    let time = Instant::now();
    match parse_str(&input.replace("\\n", "\n")) {
        Ok(cnf) => solve_and_report(&cnf, common, None, time.elapsed()),
        Err(e) => report_input_error(None, &e),
    }
}

/// Solves every `.cnf` file below `path`.
///
/// Unreadable or malformed files are reported and skipped. The returned
/// outcome is the most severe one seen.
pub(crate) fn solve_dir(path: &Path, common: &CommonOptions) -> Outcome {
    if !path.is_dir() {
        eprintln!("Provided path is not a directory: {}", path.display());
        return Outcome::InputError;
    }

    let mut worst = Outcome::Satisfiable;
    let mut solved = 0_usize;

    for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Skipping unreadable entry: {e}");
                worst = worst.max(Outcome::InputError);
                continue;
            }
        };

        let file_path = entry.path();
        if !entry.file_type().is_file() || file_path.extension().is_none_or(|ext| ext != "cnf") {
            continue;
        }

        worst = worst.max(solve_file(file_path, common));
        solved += 1;
    }

    println!("\nSolved {solved} files under {}", path.display());
    worst
}

fn report_input_error(label: Option<&Path>, error: &DimacsError) -> Outcome {
    match label {
        Some(path) => eprintln!("Error reading {}: {error}", path.display()),
        None => eprintln!("Error reading input: {error}"),
    }
    Outcome::InputError
}

/// Checks a satisfying assignment against the input formula.
///
/// Prints `Verified: true` or `Verified: false`, plus the first violated
/// clause on failure. Returns whether the check passed.
pub(crate) fn verify_solution(cnf: &Cnf, solutions: &Solutions) -> bool {
    let ok = cnf.verify(solutions);
    println!("Verified: {ok}");
    if let Some(clause) = cnf.first_unsatisfied(solutions) {
        eprintln!("Clause `{clause}` is not satisfied by the reported assignment");
    }
    ok
}

/// Solves `cnf` with the components selected in `common`.
///
/// # Returns
/// The model if the formula is satisfiable, the solve time and the search
/// statistics.
pub(crate) fn solve_impl(
    cnf: &Cnf,
    common: &CommonOptions,
) -> (Option<Solutions>, Duration, SolutionStats) {
    let mut solver = Dpll::<DynamicConfig>::from_parts(
        cnf.clone(),
        common.heuristic.to_impl(common.seed),
        common.propagator().to_impl(),
    );

    let time = Instant::now();
    let sol = solver.solve();
    let elapsed = time.elapsed();

    log::debug!(target: SOLVE, "solved in {elapsed:?}");

    (sol, elapsed, solver.stats())
}

/// Solves a parsed formula and reports the verdict, statistics and, if
/// requested, the assignment and its verification.
pub(crate) fn solve_and_report(
    cnf: &Cnf,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Outcome {
    if let Some(name) = label {
        println!("Solving: {}", name.display());
    }
    println!("Variables: {}, clauses: {}", cnf.num_vars, cnf.num_clauses());

    if common.debug {
        println!("CNF:\n{cnf}");
    }

    println!(
        "Heuristic: {}, propagation: {}",
        common.heuristic,
        common.propagator()
    );

    let (sol, elapsed, solver_stats) = solve_impl(cnf, common);

    if common.stats {
        let (allocated, resident) = memory_usage().unwrap_or_default();
        print_stats(parse_time, elapsed, cnf, &solver_stats, allocated, resident);
    }

    let Some(solutions) = sol else {
        println!("\nUNSATISFIABLE");
        return Outcome::Unsatisfiable;
    };

    println!("\nSATISFIABLE");
    if common.print_solution {
        println!("Solutions: {solutions}");
    }

    if common.verify && !verify_solution(cnf, &solutions) {
        return Outcome::VerificationFailed;
    }

    Outcome::Satisfiable
}

/// Allocated and resident memory in MiB, as reported by jemalloc.
fn memory_usage() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::read().ok()?;
    let resident = stats::resident::read().ok()?;
    Some((
        allocated as f64 / (1024.0 * 1024.0),
        resident as f64 / (1024.0 * 1024.0),
    ))
}

/// Helper function to print a single statistic line in a formatted table row.
pub(crate) fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
pub(crate) fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
///
/// # Arguments
/// * `parse_time` - Duration spent parsing the input.
/// * `elapsed` - Duration spent by the solver.
/// * `cnf` - The CNF formula.
/// * `s` - `SolutionStats` collected by the solver.
/// * `allocated` - Allocated memory in MiB.
/// * `resident` - Resident memory in MiB.
pub(crate) fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    cnf: &Cnf,
    s: &SolutionStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", cnf.num_vars);
    stat_line("Clauses", cnf.num_clauses());
    stat_line("Literals", cnf.num_literals());

    println!("========================[ Search Statistics ]========================");
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line("Pure literals", s.pure_literals);
    stat_line("Max decision depth", s.max_depth);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
