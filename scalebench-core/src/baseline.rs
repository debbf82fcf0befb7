//! Single-worker reference times and the metrics derived from them

use crate::error::{Result, ScaleError};
use crate::types::ConfigurationPoint;
use serde::Serialize;
use std::collections::BTreeMap;

/// Speedup, efficiency and the Amdahl bound for one measured point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Baseline time over measured time; absent for weak scaling
    pub speedup: Option<f64>,
    /// Strong: speedup per worker. Weak: baseline time over measured time
    pub efficiency: f64,
    /// Amdahl projection for the point's worker count; absent for weak scaling
    pub theoretical_speedup: Option<f64>,
}

/// Mean single-worker time per input size
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BaselineTracker {
    baselines: BTreeMap<u64, f64>,
}

impl BaselineTracker {
    /// Empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the worker_count = 1 mean time for `input_size`
    pub fn record(&mut self, input_size: u64, mean_time: f64) {
        if let Some(previous) = self.baselines.insert(input_size, mean_time) {
            log::debug!(
                "Baseline for input size {} replaced ({:.6} -> {:.6})",
                input_size,
                previous,
                mean_time
            );
        }
    }

    /// Baseline for `input_size`
    pub fn get(&self, input_size: u64) -> Result<f64> {
        self.baselines
            .get(&input_size)
            .copied()
            .ok_or(ScaleError::BaselineMissing { input_size })
    }

    /// Whether a baseline exists for `input_size`
    pub fn contains(&self, input_size: u64) -> bool {
        self.baselines.contains_key(&input_size)
    }

    /// All baselines ordered by input size
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.baselines.iter().map(|(&size, &time)| (size, time))
    }

    /// Number of recorded baselines
    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    /// Whether no baseline has been recorded
    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }

    /// Strong scaling speedup of `point` measured at `mean_time`
    ///
    /// The single-worker point is 1.0 by definition, not by measurement.
    pub fn speedup(&self, point: &ConfigurationPoint, mean_time: f64) -> Result<f64> {
        if point.is_baseline() {
            return Ok(1.0);
        }
        Ok(self.get(point.input_size)? / mean_time)
    }

    /// Strong scaling efficiency: speedup divided by worker count
    pub fn efficiency(&self, point: &ConfigurationPoint, mean_time: f64) -> Result<f64> {
        if point.is_baseline() {
            return Ok(1.0);
        }
        Ok(self.speedup(point, mean_time)? / f64::from(point.worker_count))
    }

    /// Weak scaling efficiency against the baseline recorded at `base_size`
    ///
    /// Work per worker is constant, so there is no division by worker count.
    pub fn weak_efficiency(
        &self,
        point: &ConfigurationPoint,
        base_size: u64,
        mean_time: f64,
    ) -> Result<f64> {
        if point.is_baseline() {
            return Ok(1.0);
        }
        Ok(self.get(base_size)? / mean_time)
    }
}
