//! Generate config command implementation

use crate::config::LauncherKind;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Launcher the template is prepared for
    #[arg(short, long, value_enum, default_value = "direct")]
    pub launcher: LauncherKind,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        println!("Generating benchmark configuration template...");
        println!("  Launcher: {:?}", self.launcher);
        println!("  Output file: {}", self.output.display());

        let template = self.generate_template();

        fs::write(&self.output, template)
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Next steps:");
        println!("1. Point [program] executable at the program under test");
        println!("2. Validate your configuration:");
        println!("   scalebench validate --config {}", self.output.display());
        println!("3. Run the experiment:");
        println!("   scalebench run --config {}", self.output.display());

        Ok(())
    }

    /// Generate template configuration content
    fn generate_template(&self) -> String {
        let (executable, launcher, schema) = match self.launcher {
            LauncherKind::Direct => ("./lcs", "direct", "timing"),
            LauncherKind::Mpi => ("./lcs_mpi", "mpi", "timing-with-score"),
        };

        format!(
            r#"# Scalebench experiment configuration

[sweep]
# Worker counts to measure; 1 is required and always measured first
worker_counts = [1, 2, 4, 8]

# Input sizes for strong scaling, one run per size
input_sizes = [20000, 40000, 80000]

# Invocations per (input size, worker count) point
iterations = 20

# Weak scaling measures base * workers at each worker count
weak_base_size = 8000

# "reuse-baseline" estimates the sequential fraction from the worker = 1
# samples; "independent" takes a separate batch
fraction_source = "reuse-baseline"

[sweep.failure_policy]
# "abort" stops at the first failed invocation; "tolerate" skips it
mode = "tolerate"
# Successful samples a point needs under "tolerate"
min_samples = 2

[program]
executable = "{executable}"

# "direct": <executable> <file_A> <file_B> <workers>
# "mpi":    <mpirun> -np <workers> --map-by <placement> <executable> <file_A> <file_B>
launcher = "{launcher}"

# Report lines the program prints: "timing" or "timing-with-score"
schema = "{schema}"

# MPI settings, ignored by the direct launcher
mpirun = "mpirun"
cores_per_node = 6
nodes = 2

# Generated input files are written here
work_dir = "."

[output]
directory = "scalebench_results"
# Write each run into its own run_<timestamp> directory
timestamped = true
pretty_json = true
"#
        )
    }
}
