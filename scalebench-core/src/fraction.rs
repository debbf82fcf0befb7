//! Sequential fraction estimation and Amdahl projections

use crate::error::{Result, ScaleError};
use crate::stats::mean;
use crate::types::RawSample;
use serde::Serialize;
use std::fmt;

/// Worker counts listed in an Amdahl table by default
pub const DEFAULT_AMDAHL_WORKERS: &[u32] = &[1, 2, 3, 4, 6, 8, 12, 16, 24, 32];

/// Non-parallelisable share of run time for one input size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequentialFractionEstimate {
    /// Input size the samples were taken at
    pub input_size: u64,
    /// mean(io_time) / mean(total_time), within [0, 1]
    pub sequential_fraction: f64,
    /// 1 - sequential_fraction
    pub parallel_fraction: f64,
    /// Mean whole-program time
    pub mean_total_time: f64,
    /// Mean time outside the computation
    pub mean_io_time: f64,
    /// Mean computation time
    pub mean_computation_time: f64,
    /// Mean score, if the program reported one
    pub mean_score: Option<f64>,
    /// Samples the estimate is based on
    pub sample_count: usize,
}

impl SequentialFractionEstimate {
    /// Estimate from single-worker samples taken at `input_size`
    pub fn estimate(input_size: u64, samples: &[RawSample]) -> Result<Self> {
        let total: Vec<f64> = samples.iter().map(|s| s.total_time).collect();
        let io: Vec<f64> = samples.iter().map(RawSample::io_time).collect();
        let computation: Vec<f64> = samples.iter().map(|s| s.computation_time).collect();
        let scores: Vec<f64> = samples
            .iter()
            .filter_map(|s| s.score.map(|score| score as f64))
            .collect();

        let (Some(mean_total_time), Some(mean_io_time), Some(mean_computation_time)) =
            (mean(&total), mean(&io), mean(&computation))
        else {
            return Err(ScaleError::InvalidMeasurement {
                input_size,
                reason: "no single-worker samples to estimate the sequential fraction".into(),
            });
        };

        if mean_total_time <= 0.0 || !mean_total_time.is_finite() {
            return Err(ScaleError::InvalidMeasurement {
                input_size,
                reason: format!("mean total time {mean_total_time} is not positive"),
            });
        }

        let ratio = mean_io_time / mean_total_time;
        let sequential_fraction = ratio.clamp(0.0, 1.0);
        if sequential_fraction != ratio {
            log::warn!(
                "Sequential fraction {:.6} for input size {} clamped to {:.1}",
                ratio,
                input_size,
                sequential_fraction
            );
        }

        Ok(Self {
            input_size,
            sequential_fraction,
            parallel_fraction: 1.0 - sequential_fraction,
            mean_total_time,
            mean_io_time,
            mean_computation_time,
            mean_score: mean(&scores),
            sample_count: samples.len(),
        })
    }

    /// Amdahl speedup of this estimate at `workers`
    pub fn project(&self, workers: u32) -> f64 {
        project(self.sequential_fraction, workers)
    }
}

/// Amdahl's law: `1 / (f + (1 - f) / p)`
///
/// A fully serial program (`f >= 1`) gains nothing from added workers.
pub fn project(sequential_fraction: f64, workers: u32) -> f64 {
    if sequential_fraction >= 1.0 {
        return 1.0;
    }
    1.0 / (sequential_fraction + (1.0 - sequential_fraction) / f64::from(workers))
}

/// Limit of [`project`] as workers grow without bound
pub fn asymptotic_speedup(sequential_fraction: f64) -> f64 {
    if sequential_fraction <= 0.0 {
        f64::INFINITY
    } else {
        1.0 / sequential_fraction.min(1.0)
    }
}

/// Mean sequential fraction over several input sizes
pub fn mean_fraction(estimates: &[SequentialFractionEstimate]) -> Option<f64> {
    let fractions: Vec<f64> = estimates.iter().map(|e| e.sequential_fraction).collect();
    mean(&fractions)
}

/// Worker count column of an Amdahl table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerBound {
    /// A concrete worker count
    Finite(u32),
    /// The limit as workers grow without bound
    Unbounded,
}

impl fmt::Display for WorkerBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerBound::Finite(workers) => write!(f, "{workers}"),
            WorkerBound::Unbounded => f.write_str("∞"),
        }
    }
}

impl Serialize for WorkerBound {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of an Amdahl table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmdahlRow {
    /// Worker count
    pub workers: WorkerBound,
    /// Theoretical speedup at that count
    pub theoretical_speedup: f64,
}

/// Theoretical speedups for a fixed sequential fraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmdahlTable {
    /// Fraction the table is computed for
    pub sequential_fraction: f64,
    /// Finite rows in the given order followed by the unbounded row
    pub rows: Vec<AmdahlRow>,
}

impl AmdahlTable {
    /// Table for `workers` plus the unbounded limit
    pub fn new(sequential_fraction: f64, workers: &[u32]) -> Self {
        let mut rows: Vec<AmdahlRow> = workers
            .iter()
            .map(|&p| AmdahlRow {
                workers: WorkerBound::Finite(p),
                theoretical_speedup: project(sequential_fraction, p),
            })
            .collect();
        rows.push(AmdahlRow {
            workers: WorkerBound::Unbounded,
            theoretical_speedup: asymptotic_speedup(sequential_fraction),
        });

        Self {
            sequential_fraction,
            rows,
        }
    }

    /// Table over [`DEFAULT_AMDAHL_WORKERS`]
    pub fn with_default_workers(sequential_fraction: f64) -> Self {
        Self::new(sequential_fraction, DEFAULT_AMDAHL_WORKERS)
    }
}
