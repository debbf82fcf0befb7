//! Repeated measurement of one configuration point

use crate::config::FailurePolicy;
use crate::error::{Result, ScaleError};
use crate::harness::ProcessHarness;
use crate::inputs::InputGenerator;
use crate::planner::{NoopObserver, SweepObserver};
use crate::runner::CommandRunner;
use crate::stats::{mean, sample_std_dev};
use crate::types::{ConfigurationPoint, RawSample};
use serde::Serialize;

/// All samples of one configuration point and their statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementPoint {
    /// Configuration that was measured
    pub point: ConfigurationPoint,
    /// Successful samples in measurement order
    pub samples: Vec<RawSample>,
    /// Iterations skipped under a tolerant failure policy
    pub failed_iterations: usize,
    /// Mean computation time, the scalability metric
    pub mean_time: f64,
    /// Sample standard deviation of computation time, 0 below two samples
    pub std_time: f64,
    /// Mean whole-program time
    pub mean_total_time: f64,
    /// Mean time outside the computation
    pub mean_io_time: f64,
    /// Mean score over the samples that reported one
    pub mean_score: Option<f64>,
}

impl MeasurementPoint {
    /// Summarise `samples`; at least one sample is required
    pub fn from_samples(
        point: ConfigurationPoint,
        samples: Vec<RawSample>,
        failed_iterations: usize,
    ) -> Result<Self> {
        let computation: Vec<f64> = samples.iter().map(|s| s.computation_time).collect();
        let total: Vec<f64> = samples.iter().map(|s| s.total_time).collect();
        let io: Vec<f64> = samples.iter().map(RawSample::io_time).collect();
        let scores: Vec<f64> = samples
            .iter()
            .filter_map(|s| s.score.map(|score| score as f64))
            .collect();

        let mean_time = mean(&computation).ok_or_else(|| ScaleError::InvalidMeasurement {
            input_size: point.input_size,
            reason: format!("no samples collected at {point}"),
        })?;

        Ok(Self {
            point,
            std_time: sample_std_dev(&computation),
            mean_total_time: mean(&total).unwrap_or_default(),
            mean_io_time: mean(&io).unwrap_or_default(),
            mean_score: mean(&scores),
            mean_time,
            samples,
            failed_iterations,
        })
    }

    /// Number of successful samples
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Runs the harness `iterations` times per point on fresh inputs
#[derive(Debug)]
pub struct MeasurementRepeater<R, G> {
    harness: ProcessHarness<R>,
    generator: G,
    policy: FailurePolicy,
}

impl<R: CommandRunner, G: InputGenerator> MeasurementRepeater<R, G> {
    /// Create a repeater
    pub fn new(harness: ProcessHarness<R>, generator: G, policy: FailurePolicy) -> Self {
        Self {
            harness,
            generator,
            policy,
        }
    }

    /// Failure policy in use
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Measure `point` `iterations` times
    pub fn repeat(
        &mut self,
        point: ConfigurationPoint,
        iterations: usize,
    ) -> Result<MeasurementPoint> {
        self.repeat_observed(point, iterations, &mut NoopObserver)
    }

    /// Measure `point`, reporting every iteration to `observer`
    pub fn repeat_observed(
        &mut self,
        point: ConfigurationPoint,
        iterations: usize,
        observer: &mut dyn SweepObserver,
    ) -> Result<MeasurementPoint> {
        let mut samples = Vec::with_capacity(iterations);
        let mut failed = 0;
        let mut last_failure = None;

        for iteration in 0..iterations {
            let inputs = self.generator.generate(point.input_size)?;

            match self.harness.invoke(&point, &inputs) {
                Ok(sample) => {
                    log::debug!(
                        "{} iteration {}: {:.6} s",
                        point,
                        iteration + 1,
                        sample.computation_time
                    );
                    observer.iteration_finished(&point, iteration, Ok(&sample));
                    samples.push(sample);
                }
                Err(error) => {
                    observer.iteration_finished(&point, iteration, Err(&error));
                    let tolerate = matches!(self.policy, FailurePolicy::Tolerate { .. });
                    if !(tolerate && error.is_tolerable()) {
                        return Err(error);
                    }
                    log::warn!("{} iteration {} skipped: {}", point, iteration + 1, error);
                    failed += 1;
                    last_failure = Some(error.to_string());
                }
            }
        }

        let required = self.policy.required_samples(iterations);
        if samples.len() < required {
            return Err(ScaleError::InsufficientSamples {
                point,
                collected: samples.len(),
                required,
                last_failure: last_failure.unwrap_or_default(),
            });
        }

        MeasurementPoint::from_samples(point, samples, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::InputPair;
    use crate::launcher::Launcher;
    use crate::runner::CommandOutput;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::path::PathBuf;

    fn report(computation: f64) -> String {
        format!(
            "Total time: {:.6} seconds\nLCS computation time: {:.6} seconds\n",
            computation + 1.0,
            computation
        )
    }

    /// Replays a queue of outputs, one per call
    struct QueueRunner {
        outputs: RefCell<VecDeque<CommandOutput>>,
    }

    impl QueueRunner {
        fn new(outputs: Vec<CommandOutput>) -> Self {
            Self {
                outputs: RefCell::new(outputs.into()),
            }
        }
    }

    impl CommandRunner for QueueRunner {
        fn run(&self, _program: &str, _args: &[String]) -> Result<CommandOutput> {
            Ok(self
                .outputs
                .borrow_mut()
                .pop_front()
                .expect("runner called more often than scripted"))
        }
    }

    /// Counts generations without touching the filesystem
    #[derive(Default)]
    struct CountingInputs {
        generated: Cell<usize>,
    }

    impl InputGenerator for &CountingInputs {
        fn generate(&mut self, input_size: u64) -> Result<InputPair> {
            self.generated.set(self.generated.get() + 1);
            Ok(InputPair {
                first: PathBuf::from(format!("{input_size}_A")),
                second: PathBuf::from(format!("{input_size}_B")),
            })
        }
    }

    fn repeater<'a>(
        runner: &'a QueueRunner,
        inputs: &'a CountingInputs,
        policy: FailurePolicy,
    ) -> MeasurementRepeater<&'a QueueRunner, &'a CountingInputs> {
        let harness = ProcessHarness::new(runner, Launcher::direct("./lcs"));
        MeasurementRepeater::new(harness, inputs, policy)
    }

    #[test]
    fn test_repeat_collects_every_iteration() {
        let runner = QueueRunner::new(vec![
            CommandOutput::success(report(2.0)),
            CommandOutput::success(report(4.0)),
            CommandOutput::success(report(6.0)),
        ]);
        let inputs = CountingInputs::default();
        let mut repeater = repeater(&runner, &inputs, FailurePolicy::Abort);

        let measured = repeater
            .repeat(ConfigurationPoint::new(1000, 2), 3)
            .unwrap();

        assert_eq!(measured.sample_count(), 3);
        assert_eq!(measured.mean_time, 4.0);
        assert_eq!(measured.std_time, 2.0);
        assert!((measured.mean_total_time - 5.0).abs() < 1e-9);
        assert!((measured.mean_io_time - 1.0).abs() < 1e-9);
        assert_eq!(measured.mean_score, None);
        assert_eq!(inputs.generated.get(), 3);
    }

    #[test]
    fn test_single_iteration_has_zero_std() {
        let runner = QueueRunner::new(vec![CommandOutput::success(report(3.0))]);
        let inputs = CountingInputs::default();
        let mut repeater = repeater(&runner, &inputs, FailurePolicy::Abort);

        let measured = repeater.repeat(ConfigurationPoint::new(10, 1), 1).unwrap();
        assert_eq!(measured.std_time, 0.0);
    }

    #[test]
    fn test_abort_policy_propagates_failure() {
        let runner = QueueRunner::new(vec![
            CommandOutput::success(report(2.0)),
            CommandOutput::failure(1, "crash"),
        ]);
        let inputs = CountingInputs::default();
        let mut repeater = repeater(&runner, &inputs, FailurePolicy::Abort);

        let result = repeater.repeat(ConfigurationPoint::new(1000, 2), 3);
        assert!(matches!(result, Err(ScaleError::InvocationFailure { .. })));
        assert_eq!(inputs.generated.get(), 2);
    }

    #[test]
    fn test_tolerate_policy_skips_failures() {
        let runner = QueueRunner::new(vec![
            CommandOutput::success(report(2.0)),
            CommandOutput::failure(1, "crash"),
            CommandOutput::success(report(4.0)),
        ]);
        let inputs = CountingInputs::default();
        let mut repeater = repeater(&runner, &inputs, FailurePolicy::Tolerate { min_samples: 2 });

        let measured = repeater
            .repeat(ConfigurationPoint::new(1000, 2), 3)
            .unwrap();
        assert_eq!(measured.sample_count(), 2);
        assert_eq!(measured.failed_iterations, 1);
        assert_eq!(measured.mean_time, 3.0);
    }

    #[test]
    fn test_tolerate_policy_below_threshold() {
        let runner = QueueRunner::new(vec![
            CommandOutput::failure(1, "crash"),
            CommandOutput::failure(1, "crash again"),
            CommandOutput::success(report(4.0)),
        ]);
        let inputs = CountingInputs::default();
        let mut repeater = repeater(&runner, &inputs, FailurePolicy::Tolerate { min_samples: 2 });

        match repeater.repeat(ConfigurationPoint::new(1000, 4), 3) {
            Err(ScaleError::InsufficientSamples {
                collected,
                required,
                last_failure,
                ..
            }) => {
                assert_eq!(collected, 1);
                assert_eq!(required, 2);
                assert!(last_failure.contains("crash again"));
            }
            other => panic!("Expected InsufficientSamples, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_failure_never_tolerated() {
        let runner = QueueRunner::new(vec![CommandOutput::success("garbage\n")]);
        let inputs = CountingInputs::default();
        let mut repeater = repeater(&runner, &inputs, FailurePolicy::Tolerate { min_samples: 1 });

        let result = repeater.repeat(ConfigurationPoint::new(1000, 1), 3);
        assert!(matches!(result, Err(ScaleError::ParseFailure { .. })));
    }

    #[test]
    fn test_mean_score() {
        let scored = |score: u64| {
            CommandOutput::success(format!("{}Score: {}\n", report(1.0), score))
        };
        let runner = QueueRunner::new(vec![scored(10), scored(20)]);
        let inputs = CountingInputs::default();
        let mut repeater = repeater(&runner, &inputs, FailurePolicy::Abort);

        let measured = repeater.repeat(ConfigurationPoint::new(10, 1), 2).unwrap();
        assert_eq!(measured.mean_score, Some(15.0));
    }

    #[test]
    fn test_from_samples_requires_data() {
        let result = MeasurementPoint::from_samples(ConfigurationPoint::new(10, 1), vec![], 0);
        assert!(matches!(
            result,
            Err(ScaleError::InvalidMeasurement { input_size: 10, .. })
        ));
    }
}
