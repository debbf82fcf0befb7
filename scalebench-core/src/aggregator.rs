//! Assembly of measured points into run results and flat records

use crate::baseline::{BaselineTracker, DerivedMetrics};
use crate::fraction::SequentialFractionEstimate;
use crate::repeater::MeasurementPoint;
use crate::types::ScalingMode;
use serde::{Deserialize, Serialize};

/// A measurement together with the metrics derived from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasuredPoint {
    /// Raw samples and statistics
    pub measurement: MeasurementPoint,
    /// Speedup, efficiency and theoretical bound
    pub metrics: DerivedMetrics,
}

/// Everything one planner invocation produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalabilityResult {
    /// Strong or weak scaling
    pub mode: ScalingMode,
    /// Points in measurement order
    pub points: Vec<MeasuredPoint>,
    /// Single-worker baselines used for the derived metrics
    pub baselines: BaselineTracker,
    /// Sequential fraction estimates used for theoretical speedups
    pub fractions: Vec<SequentialFractionEstimate>,
}

/// Flat per-point record handed to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRecord {
    /// Strong or weak scaling
    pub mode: ScalingMode,
    /// Input size the point was measured at
    pub input_size: u64,
    /// Worker count
    pub worker_count: u32,
    /// Per-worker input size, weak scaling only
    pub size_per_worker: Option<u64>,
    /// Mean computation time in seconds
    pub mean_time: f64,
    /// Sample standard deviation of computation time
    pub std_time: f64,
    /// Speedup against the single-worker baseline
    pub speedup: Option<f64>,
    /// Parallel efficiency
    pub efficiency: f64,
    /// Amdahl projection
    pub theoretical_speedup: Option<f64>,
    /// Mean score reported by the program
    pub mean_score: Option<f64>,
    /// Successful samples behind the statistics
    pub samples: usize,
}

/// Flat sequential-versus-parallel breakdown for one input size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequentialAnalysisRecord {
    /// Input size
    pub input_size: u64,
    /// Mean whole-program time
    pub total_time: f64,
    /// Mean time outside the computation
    pub io_time: f64,
    /// Mean computation time
    pub computation_time: f64,
    /// Sequential share of total time
    pub sequential_fraction: f64,
    /// Parallel share of total time
    pub parallel_fraction: f64,
}

/// Builds [`ScalabilityResult`]s without reordering anything
pub struct ResultAggregator;

impl ResultAggregator {
    /// Combine measured points with the baselines and estimates behind them
    pub fn aggregate(
        mode: ScalingMode,
        points: Vec<MeasuredPoint>,
        baselines: BaselineTracker,
        fractions: Vec<SequentialFractionEstimate>,
    ) -> ScalabilityResult {
        ScalabilityResult {
            mode,
            points,
            baselines,
            fractions,
        }
    }
}

impl ScalabilityResult {
    /// Whether nothing was measured
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// One flat record per point, in measurement order
    pub fn records(&self) -> Vec<ScalingRecord> {
        self.points
            .iter()
            .map(|measured| {
                let point = measured.measurement.point;
                ScalingRecord {
                    mode: self.mode,
                    input_size: point.input_size,
                    worker_count: point.worker_count,
                    size_per_worker: match self.mode {
                        ScalingMode::Weak => {
                            Some(point.input_size / u64::from(point.worker_count))
                        }
                        ScalingMode::Strong => None,
                    },
                    mean_time: measured.measurement.mean_time,
                    std_time: measured.measurement.std_time,
                    speedup: measured.metrics.speedup,
                    efficiency: measured.metrics.efficiency,
                    theoretical_speedup: measured.metrics.theoretical_speedup,
                    mean_score: measured.measurement.mean_score,
                    samples: measured.measurement.sample_count(),
                }
            })
            .collect()
    }

    /// One breakdown record per fraction estimate
    pub fn sequential_analysis(&self) -> Vec<SequentialAnalysisRecord> {
        self.fractions
            .iter()
            .map(|estimate| SequentialAnalysisRecord {
                input_size: estimate.input_size,
                total_time: estimate.mean_total_time,
                io_time: estimate.mean_io_time,
                computation_time: estimate.mean_computation_time,
                sequential_fraction: estimate.sequential_fraction,
                parallel_fraction: estimate.parallel_fraction,
            })
            .collect()
    }
}
