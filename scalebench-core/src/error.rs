//! Error types for measurement runs

use crate::aggregator::ScalabilityResult;
use crate::types::ConfigurationPoint;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scalebench operations
pub type Result<T> = std::result::Result<T, ScaleError>;

/// Errors raised while measuring a sweep
#[derive(Error, Debug)]
pub enum ScaleError {
    /// The program under test exited with a non-zero status
    #[error("program failed at {point} (exit code {}): {stderr}", display_code(.exit_code))]
    InvocationFailure {
        /// Configuration being measured
        point: ConfigurationPoint,
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// A required value was missing from the program output
    #[error("failed to parse `{field}` from program output at {point}:\n{output}")]
    ParseFailure {
        /// Configuration being measured
        point: ConfigurationPoint,
        /// Label that could not be located or parsed
        field: &'static str,
        /// Raw captured standard output
        output: String,
    },

    /// Speedup was requested before the single-worker baseline existed
    #[error("no single-worker baseline recorded for input size {input_size}")]
    BaselineMissing {
        /// Input size without a baseline
        input_size: u64,
    },

    /// Too many iterations of one point failed
    #[error(
        "only {collected} of {required} required samples succeeded at {point}; last failure: {last_failure}"
    )]
    InsufficientSamples {
        /// Configuration being measured
        point: ConfigurationPoint,
        /// Number of successful samples
        collected: usize,
        /// Minimum number of samples required
        required: usize,
        /// Message of the last tolerated failure
        last_failure: String,
    },

    /// The program could not be started at all
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        /// Program that was executed
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Input artifact I/O error
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        /// File being written or read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Timings that cannot produce a meaningful statistic
    #[error("invalid measurement for input size {input_size}: {reason}")]
    InvalidMeasurement {
        /// Input size the samples belong to
        input_size: u64,
        /// What was wrong with the samples
        reason: String,
    },

    /// Invalid sweep configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

impl ScaleError {
    /// Whether the failure policy may skip this error for a single iteration
    pub fn is_tolerable(&self) -> bool {
        matches!(self, ScaleError::InvocationFailure { .. })
    }
}

/// A planner run that stopped on a fatal error
///
/// Points measured before the failure are kept in `partial` so callers can
/// still persist them.
#[derive(Error, Debug)]
#[error("{mode} scaling run aborted after {} measured points: {source}", .partial.points.len())]
pub struct SweepFailure {
    /// Scaling mode of the aborted run
    pub mode: crate::types::ScalingMode,
    /// Everything measured before the failure
    pub partial: ScalabilityResult,
    /// The fatal error
    #[source]
    pub source: ScaleError,
}
