//! Scalability measurement engine for external parallel programs
//!
//! This crate decides which (input size, worker count) configurations to
//! measure, runs an opaque program under test for each of them, and turns
//! the raw timings into speedup, efficiency and Amdahl projections.
//!
//! The program itself is reached through the [`CommandRunner`] seam and its
//! inputs through [`InputGenerator`], so the statistics and orchestration can
//! be exercised without spawning real processes.

#![warn(missing_docs)]

pub mod aggregator;
pub mod baseline;
pub mod config;
pub mod error;
pub mod fraction;
pub mod harness;
pub mod inputs;
pub mod launcher;
pub mod planner;
pub mod repeater;
pub mod runner;
pub mod stats;
pub mod types;

// Re-export key types
pub use aggregator::{
    MeasuredPoint, ResultAggregator, ScalabilityResult, ScalingRecord, SequentialAnalysisRecord,
};
pub use baseline::{BaselineTracker, DerivedMetrics};
pub use config::{FailurePolicy, FractionSource, SweepConfig, SweepConfigBuilder};
pub use error::{Result, ScaleError, SweepFailure};
pub use fraction::{AmdahlRow, AmdahlTable, SequentialFractionEstimate, WorkerBound};
pub use harness::{OutputSchema, ProcessHarness};
pub use inputs::{InputGenerator, InputPair, RandomInputGenerator};
pub use launcher::Launcher;
pub use planner::{NoopObserver, PlannerState, ScalabilityPlanner, SweepObserver};
pub use repeater::{MeasurementPoint, MeasurementRepeater};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use types::{ConfigurationPoint, RawSample, ScalingMode};
