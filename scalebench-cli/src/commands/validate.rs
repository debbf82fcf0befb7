//! Validate command implementation

use crate::config::CliConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate
    #[arg(short, long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match CliConfig::from_file(&self.config).and_then(|config| {
            config.validate()?;
            Ok(config)
        }) {
            Ok(config) => {
                let sweep = &config.sweep;
                let points_per_size = sweep.measurement_order().len();
                println!("✓ Configuration is valid!");
                println!("  Program: {}", config.program.executable);
                println!("  Launcher: {:?}", config.program.launcher);
                println!("  Worker counts: {:?}", sweep.measurement_order());
                println!("  Input sizes: {:?}", sweep.input_sizes);
                println!("  Iterations per point: {}", sweep.iterations);
                println!(
                    "  Invocations: {} strong, {} weak",
                    points_per_size * sweep.input_sizes.len() * sweep.iterations,
                    points_per_size * sweep.iterations
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e:#}");
                Err(anyhow::anyhow!("Validation failed: {:#}", e))
            }
        }
    }
}
