//! # dpll-sat
//!
//! `dpll-sat` is a command-line SAT solver for formulas in DIMACS CNF format.
//! It runs the classical DPLL procedure: unit propagation, pure-literal
//! elimination and chronological backtracking over binary splits.
//!
//! ## Usage
//!
//! ```sh
//! # Solve a DIMACS file
//! dpll-sat problem.cnf
//!
//! # Same, with an explicit subcommand and a different branching heuristic
//! dpll-sat file --path problem.cnf --heuristic top-k --seed 42
//!
//! # Solve DIMACS text given inline and print the model
//! dpll-sat text --input "p cnf 2 2\n1 2 0\n-1 0" --print-solution
//!
//! # Solve every .cnf file below a directory
//! dpll-sat dir --path benchmarks/
//!
//! # Generate shell completions
//! dpll-sat completions bash
//! ```
//!
//! ### Common options
//!
//! -   `-d, --debug`: log decisions and backtracks and print the formula.
//!     `RUST_LOG` overrides the log filter, e.g. `RUST_LOG=propagation=trace`.
//! -   `--verify <bool>`: check the model against the input (default: `true`).
//! -   `--stats <bool>`: print problem and search statistics (default: `true`).
//! -   `-p, --print-solution`: print the model.
//! -   `--heuristic <top-k|jeroslow-wang|jeroslow-wang-two-sided|random>`:
//!     branching heuristic (default: `jeroslow-wang`).
//! -   `--seed <u64>`: seed for the randomised heuristics.
//! -   `--no-pure-literals`: run unit propagation only.
//!
//! ## Exit status
//!
//! `0` if satisfiable, `1` if unsatisfiable, `2` if the input could not be
//! read, `3` if a model failed verification.

use crate::command_line::cli::{Cli, Commands, Outcome, solve_dir, solve_file, solve_text};
use clap::{CommandFactory, Parser};
use std::io;
use std::process::ExitCode;

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also provides the
/// memory statistics.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn init_logging(debug: bool) {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let common = cli
        .command
        .as_ref()
        .map_or(Some(&cli.common), Commands::common);
    init_logging(common.is_some_and(|c| c.debug));

    let outcome = match &cli.command {
        None => match &cli.path {
            Some(path) => solve_file(path, &cli.common),
            None => {
                eprintln!("No command provided. Use --help for more information.");
                Outcome::InputError
            }
        },
        Some(Commands::File { path, common }) => solve_file(path, common),
        Some(Commands::Text { input, common }) => solve_text(input, common),
        Some(Commands::Dir { path, common }) => solve_dir(path, common),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            return ExitCode::SUCCESS;
        }
    };

    outcome.into()
}
