//! Scalebench command line interface

use clap::Parser;
use scalebench_cli::commands::Commands;
use std::process::ExitCode;

/// Scalability experiments for external parallel programs
///
/// Runs a program under test across worker counts and input sizes, then
/// reports speedup, efficiency and Amdahl projections.
///
/// # Examples
///
/// ```bash
/// # Strong and weak scaling with the defaults
/// scalebench run --program ./lcs
///
/// # MPI program, strong scaling only, markdown tables
/// scalebench run --config bench.toml --mode strong --format markdown
///
/// # Theoretical speedups for a 5% sequential fraction
/// scalebench amdahl --fraction 0.05
/// ```
#[derive(Parser)]
#[command(name = "scalebench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
