//! Result files on disk

use anyhow::{Context, Result};
use scalebench_core::{
    AmdahlTable, ScalingMode, ScalingRecord, SequentialAnalysisRecord, WorkerBound,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File stem for strong scaling results
pub const STRONG_STEM: &str = "strong_scalability";
/// File stem for weak scaling results
pub const WEAK_STEM: &str = "weak_scalability";
/// Sequential fraction breakdown file
pub const SEQUENTIAL_FILE: &str = "sequential_analysis.csv";
/// Amdahl projection file
pub const AMDAHL_FILE: &str = "amdahl_law.csv";

/// Row of `amdahl_law.csv`
#[derive(Debug, Serialize)]
struct AmdahlRecord {
    sequential_fraction: f64,
    workers: WorkerBound,
    theoretical_speedup: f64,
}

/// Writes run results into one directory
#[derive(Debug)]
pub struct ResultWriter {
    directory: PathBuf,
    pretty_json: bool,
}

impl ResultWriter {
    /// Create `directory` (and parents) and write into it
    pub fn create(directory: impl Into<PathBuf>, pretty_json: bool) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create {}", directory.display()))?;
        Ok(Self {
            directory,
            pretty_json,
        })
    }

    /// Target directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `<mode>_scalability.csv` and `.json`
    pub fn write_scaling(&self, mode: ScalingMode, records: &[ScalingRecord]) -> Result<Vec<PathBuf>> {
        let stem = match mode {
            ScalingMode::Strong => STRONG_STEM,
            ScalingMode::Weak => WEAK_STEM,
        };
        Ok(vec![
            self.write_csv(&format!("{stem}.csv"), records)?,
            self.write_json(&format!("{stem}.json"), records)?,
        ])
    }

    /// `sequential_analysis.csv`
    pub fn write_sequential_analysis(&self, records: &[SequentialAnalysisRecord]) -> Result<PathBuf> {
        self.write_csv(SEQUENTIAL_FILE, records)
    }

    /// `amdahl_law.csv`
    pub fn write_amdahl(&self, table: &AmdahlTable) -> Result<PathBuf> {
        let records: Vec<AmdahlRecord> = table
            .rows
            .iter()
            .map(|row| AmdahlRecord {
                sequential_fraction: table.sequential_fraction,
                workers: row.workers,
                theoretical_speedup: row.theoretical_speedup,
            })
            .collect();
        self.write_csv(AMDAHL_FILE, &records)
    }

    fn write_csv<T: Serialize>(&self, name: &str, records: &[T]) -> Result<PathBuf> {
        let path = self.directory.join(name);
        let mut writer = ::csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        writer.flush()?;
        log::info!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.directory.join(name);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        if self.pretty_json {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Wrote {}", path.display());
        Ok(path)
    }
}
