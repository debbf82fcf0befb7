//! Core value types shared by every stage of a sweep

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scaling experiment kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMode {
    /// Fixed input size, increasing worker count
    Strong,
    /// Input size grows with the worker count
    Weak,
}

impl ScalingMode {
    /// Lowercase name used in records and file names
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalingMode::Strong => "strong",
            ScalingMode::Weak => "weak",
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a sweep: an input size measured with a worker count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigurationPoint {
    /// Characters per generated input file
    pub input_size: u64,
    /// Threads or processes handed to the program
    pub worker_count: u32,
}

impl ConfigurationPoint {
    /// Create a configuration point
    pub fn new(input_size: u64, worker_count: u32) -> Self {
        Self {
            input_size,
            worker_count,
        }
    }

    /// Whether this is the single-worker reference point
    pub fn is_baseline(&self) -> bool {
        self.worker_count == 1
    }
}

impl fmt::Display for ConfigurationPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(input_size={}, workers={})",
            self.input_size, self.worker_count
        )
    }
}

/// Timings reported by a single invocation of the program under test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Wall time of the whole program, I/O included, in seconds
    pub total_time: f64,
    /// Time spent in the parallel computation, in seconds
    pub computation_time: f64,
    /// Correctness score, when the program reports one
    pub score: Option<u64>,
}

impl RawSample {
    /// Create a sample without a score
    pub fn new(total_time: f64, computation_time: f64) -> Self {
        Self {
            total_time,
            computation_time,
            score: None,
        }
    }

    /// Attach a score
    pub fn with_score(mut self, score: u64) -> Self {
        self.score = Some(score);
        self
    }

    /// Time outside the computation, treated as the sequential part
    pub fn io_time(&self) -> f64 {
        self.total_time - self.computation_time
    }
}
