//! Amdahl command implementation

use crate::output::{create_formatter, OutputFormat, Table};
use anyhow::{Context, Result};
use clap::Args;
use scalebench_core::fraction::DEFAULT_AMDAHL_WORKERS;
use scalebench_core::{AmdahlTable, SequentialAnalysisRecord};
use std::io;
use std::path::{Path, PathBuf};

/// Arguments for the amdahl command
#[derive(Debug, Args)]
pub struct AmdahlArgs {
    /// Sequential fraction between 0 and 1
    #[arg(long, value_parser = parse_fraction, required_unless_present = "from")]
    pub fraction: Option<f64>,

    /// Take the mean fraction from a sequential_analysis.csv of an earlier run
    #[arg(long, value_name = "FILE", conflicts_with = "fraction")]
    pub from: Option<PathBuf>,

    /// Worker counts, comma separated
    #[arg(short, long, value_name = "N,..", value_delimiter = ',')]
    pub workers: Option<Vec<u32>>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl AmdahlArgs {
    /// Execute the amdahl command
    pub fn execute(&self) -> Result<()> {
        let table = self.table()?;
        let mut formatter = create_formatter(self.format, io::stdout());
        formatter.write_table(&Table::amdahl(&table))?;
        formatter.finish()
    }

    /// Table for the requested fraction and worker counts
    pub fn table(&self) -> Result<AmdahlTable> {
        let fraction = match (self.fraction, &self.from) {
            (Some(fraction), _) => fraction,
            (None, Some(path)) => fraction_from_analysis(path)?,
            (None, None) => anyhow::bail!("either --fraction or --from is required"),
        };
        let workers = self.workers.as_deref().unwrap_or(DEFAULT_AMDAHL_WORKERS);
        Ok(AmdahlTable::new(fraction, workers))
    }
}

fn parse_fraction(value: &str) -> std::result::Result<f64, String> {
    let fraction: f64 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=1.0).contains(&fraction) {
        Ok(fraction)
    } else {
        Err(format!("{fraction} is outside [0, 1]"))
    }
}

/// Mean sequential fraction recorded in a sequential analysis file
fn fraction_from_analysis(path: &Path) -> Result<f64> {
    let mut reader = ::csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut fractions = Vec::new();
    for record in reader.deserialize::<SequentialAnalysisRecord>() {
        let record = record.with_context(|| format!("Malformed record in {}", path.display()))?;
        fractions.push(record.sequential_fraction);
    }
    scalebench_core::stats::mean(&fractions)
        .with_context(|| format!("{} contains no records", path.display()))
}
