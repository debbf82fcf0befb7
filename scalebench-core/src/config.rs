//! Sweep configuration
//!
//! A [`SweepConfig`] is built once, validated, and handed to the planner. It
//! is never mutated during a run.

use crate::error::{Result, ScaleError};
use crate::types::ConfigurationPoint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default worker counts swept when none are configured
pub const DEFAULT_WORKER_COUNTS: &[u32] = &[1, 2, 4, 8];

/// Default input sizes for strong scaling
pub const DEFAULT_INPUT_SIZES: &[u64] = &[20_000, 40_000, 80_000];

/// Default repetitions per configuration point
pub const DEFAULT_ITERATIONS: usize = 20;

/// Default per-worker input size for weak scaling
pub const DEFAULT_WEAK_BASE_SIZE: u64 = 8_000;

/// Default minimum successful samples under [`FailurePolicy::Tolerate`]
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// What to do when one iteration of the program under test fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Any failed invocation aborts the sweep
    Abort,
    /// Skip failed invocations, but fail the point below `min_samples` successes
    Tolerate {
        /// Successful samples required for the point to count
        #[serde(default = "default_min_samples")]
        min_samples: usize,
    },
}

fn default_min_samples() -> usize {
    DEFAULT_MIN_SAMPLES
}

impl FailurePolicy {
    /// Successful samples a point of `iterations` invocations needs
    ///
    /// Never more than `iterations` and never fewer than one.
    pub fn required_samples(&self, iterations: usize) -> usize {
        match self {
            FailurePolicy::Abort => iterations,
            FailurePolicy::Tolerate { min_samples } => (*min_samples).min(iterations).max(1),
        }
    }
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Tolerate {
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Where single-worker samples for the sequential fraction come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FractionSource {
    /// Reuse the samples of the worker_count = 1 baseline point
    #[default]
    ReuseBaseline,
    /// Take a separate batch of single-worker samples
    Independent,
}

/// Immutable description of what a planner measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Worker counts to sweep; must contain 1
    pub worker_counts: Vec<u32>,
    /// Input sizes for strong scaling runs
    pub input_sizes: Vec<u64>,
    /// Invocations per configuration point
    pub iterations: usize,
    /// Per-worker input size for weak scaling
    pub weak_base_size: u64,
    /// Handling of failed invocations
    pub failure_policy: FailurePolicy,
    /// Origin of sequential fraction samples
    pub fraction_source: FractionSource,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            worker_counts: DEFAULT_WORKER_COUNTS.to_vec(),
            input_sizes: DEFAULT_INPUT_SIZES.to_vec(),
            iterations: DEFAULT_ITERATIONS,
            weak_base_size: DEFAULT_WEAK_BASE_SIZE,
            failure_policy: FailurePolicy::default(),
            fraction_source: FractionSource::default(),
        }
    }
}

impl SweepConfig {
    /// Create a builder
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SweepConfig =
            toml::from_str(content).map_err(|e| ScaleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ScaleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check the invariants the planner relies on
    pub fn validate(&self) -> Result<()> {
        if self.worker_counts.is_empty() {
            return Err(ScaleError::Config("worker_counts must not be empty".into()));
        }
        if self.worker_counts.contains(&0) {
            return Err(ScaleError::Config("worker counts must be positive".into()));
        }
        if !self.worker_counts.contains(&1) {
            return Err(ScaleError::Config(
                "worker_counts must include 1 to provide a baseline".into(),
            ));
        }
        if self.input_sizes.contains(&0) {
            return Err(ScaleError::Config("input sizes must be positive".into()));
        }
        if self.iterations == 0 {
            return Err(ScaleError::Config("iterations must be at least 1".into()));
        }
        if self.weak_base_size == 0 {
            return Err(ScaleError::Config("weak_base_size must be positive".into()));
        }
        let largest = self.worker_counts.iter().copied().max().unwrap_or(1);
        if self.weak_base_size.checked_mul(u64::from(largest)).is_none() {
            return Err(ScaleError::Config(format!(
                "weak_base_size {} times {} workers overflows the input size",
                self.weak_base_size, largest
            )));
        }
        if let FailurePolicy::Tolerate { min_samples: 0 } = self.failure_policy {
            return Err(ScaleError::Config("min_samples must be at least 1".into()));
        }
        Ok(())
    }

    /// Worker counts in measurement order: 1 first, then the rest as configured
    pub fn measurement_order(&self) -> Vec<u32> {
        let mut order = vec![1];
        for &workers in &self.worker_counts {
            if !order.contains(&workers) {
                order.push(workers);
            }
        }
        order
    }

    /// Configuration points of a strong scaling run for `input_size`
    pub fn strong_points(&self, input_size: u64) -> Vec<ConfigurationPoint> {
        self.measurement_order()
            .into_iter()
            .map(|workers| ConfigurationPoint::new(input_size, workers))
            .collect()
    }

    /// Configuration points of the weak scaling run
    pub fn weak_points(&self) -> Vec<ConfigurationPoint> {
        self.measurement_order()
            .into_iter()
            .map(|workers| {
                ConfigurationPoint::new(
                    self.weak_base_size.saturating_mul(u64::from(workers)),
                    workers,
                )
            })
            .collect()
    }
}

/// Validating builder for [`SweepConfig`]
#[derive(Debug, Default)]
pub struct SweepConfigBuilder {
    config: SweepConfig,
}

impl SweepConfigBuilder {
    /// Set worker counts
    pub fn worker_counts(mut self, worker_counts: impl Into<Vec<u32>>) -> Self {
        self.config.worker_counts = worker_counts.into();
        self
    }

    /// Set strong scaling input sizes
    pub fn input_sizes(mut self, input_sizes: impl Into<Vec<u64>>) -> Self {
        self.config.input_sizes = input_sizes.into();
        self
    }

    /// Set iterations per point
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Set the weak scaling per-worker size
    pub fn weak_base_size(mut self, size: u64) -> Self {
        self.config.weak_base_size = size;
        self
    }

    /// Set the failure policy
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Set the fraction sample source
    pub fn fraction_source(mut self, source: FractionSource) -> Self {
        self.config.fraction_source = source;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SweepConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SweepConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker_counts, vec![1, 2, 4, 8]);
        assert_eq!(config.input_sizes, vec![20_000, 40_000, 80_000]);
        assert_eq!(config.iterations, 20);
        assert_eq!(config.weak_base_size, 8_000);
    }

    #[test]
    fn test_baseline_measured_first() {
        let config = SweepConfig::builder()
            .worker_counts(vec![4, 2, 1, 8])
            .build()
            .unwrap();
        assert_eq!(config.measurement_order(), vec![1, 4, 2, 8]);
    }

    #[test]
    fn test_duplicate_workers_measured_once() {
        let config = SweepConfig::builder()
            .worker_counts(vec![1, 2, 2, 1, 4])
            .build()
            .unwrap();
        assert_eq!(config.measurement_order(), vec![1, 2, 4]);
    }

    #[test]
    fn test_weak_points_scale_input() {
        let config = SweepConfig::builder()
            .worker_counts(vec![1, 2, 3])
            .weak_base_size(8000)
            .build()
            .unwrap();
        let points = config.weak_points();
        assert_eq!(points[2], ConfigurationPoint::new(24_000, 3));
        assert_eq!(points[0], ConfigurationPoint::new(8_000, 1));
    }

    #[test]
    fn test_missing_baseline_worker_rejected() {
        let result = SweepConfig::builder().worker_counts(vec![2, 4]).build();
        assert!(matches!(result, Err(ScaleError::Config(_))));
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(SweepConfig::builder().iterations(0).build().is_err());
        assert!(SweepConfig::builder().weak_base_size(0).build().is_err());
        assert!(SweepConfig::builder()
            .worker_counts(vec![1, 0])
            .build()
            .is_err());
        assert!(SweepConfig::builder().input_sizes(vec![0]).build().is_err());
        assert!(SweepConfig::builder()
            .failure_policy(FailurePolicy::Tolerate { min_samples: 0 })
            .build()
            .is_err());
    }

    #[test]
    fn test_weak_size_overflow_rejected() {
        let result = SweepConfig::builder()
            .worker_counts(vec![1, 4])
            .weak_base_size(u64::MAX / 2)
            .build();
        match result {
            Err(ScaleError::Config(message)) => assert!(message.contains("overflows")),
            other => panic!("Expected Config error, got {:?}", other),
        }

        assert!(SweepConfig::builder()
            .worker_counts(vec![1, 2])
            .weak_base_size(u64::MAX / 2)
            .build()
            .is_ok());
    }

    #[test]
    fn test_required_samples_clamped_to_iterations() {
        let config = SweepConfig::builder()
            .iterations(1)
            .failure_policy(FailurePolicy::Tolerate { min_samples: 5 })
            .build()
            .unwrap();
        assert_eq!(config.failure_policy.required_samples(config.iterations), 1);

        assert_eq!(FailurePolicy::Abort.required_samples(7), 7);
        assert_eq!(
            FailurePolicy::Tolerate { min_samples: 3 }.required_samples(0),
            1
        );
    }

    #[test]
    fn test_from_toml_str() {
        let config = SweepConfig::from_toml_str(
            r#"
worker_counts = [1, 2, 6, 12]
input_sizes = [1000]
iterations = 30
fraction_source = "independent"

[failure_policy]
mode = "abort"
"#,
        )
        .unwrap();

        assert_eq!(config.worker_counts, vec![1, 2, 6, 12]);
        assert_eq!(config.input_sizes, vec![1000]);
        assert_eq!(config.iterations, 30);
        assert_eq!(config.weak_base_size, DEFAULT_WEAK_BASE_SIZE);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.fraction_source, FractionSource::Independent);
    }

    #[test]
    fn test_tolerate_policy_default_min_samples() {
        let config = SweepConfig::from_toml_str(
            r#"
[failure_policy]
mode = "tolerate"
"#,
        )
        .unwrap();
        assert_eq!(
            config.failure_policy,
            FailurePolicy::Tolerate {
                min_samples: DEFAULT_MIN_SAMPLES
            }
        );
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(SweepConfig::from_toml_str("worker_counts = [2, 4]").is_err());
        assert!(SweepConfig::from_toml_str("iterations = \"many\"").is_err());
    }
}
