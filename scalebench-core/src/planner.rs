//! Sweep orchestration for strong and weak scaling
//!
//! A strong run walks `Idle -> MeasuringBaseline -> EstimatingFraction ->
//! Sweeping -> Done` for one input size. A weak run walks
//! `Idle -> Sweeping -> Done`. Everything is measured sequentially; the
//! worker_count = 1 point always comes first so the baseline exists before
//! any other point derives speedup from it.

use crate::aggregator::{MeasuredPoint, ResultAggregator, ScalabilityResult};
use crate::baseline::{BaselineTracker, DerivedMetrics};
use crate::config::{FractionSource, SweepConfig};
use crate::error::{Result, ScaleError, SweepFailure};
use crate::fraction::SequentialFractionEstimate;
use crate::harness::ProcessHarness;
use crate::inputs::InputGenerator;
use crate::repeater::{MeasurementPoint, MeasurementRepeater};
use crate::runner::CommandRunner;
use crate::types::{ConfigurationPoint, RawSample, ScalingMode};
use std::fmt;

/// Phase of a planner run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    /// No run in progress
    Idle,
    /// Measuring the worker_count = 1 reference point
    MeasuringBaseline,
    /// Deriving the sequential fraction from single-worker samples
    EstimatingFraction,
    /// Measuring the remaining points
    Sweeping,
    /// The last run completed
    Done,
}

impl fmt::Display for PlannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlannerState::Idle => "idle",
            PlannerState::MeasuringBaseline => "measuring baseline",
            PlannerState::EstimatingFraction => "estimating sequential fraction",
            PlannerState::Sweeping => "sweeping",
            PlannerState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Receives progress notifications during a run
///
/// Every method has an empty default. Callbacks run on the measuring thread
/// between invocations, never concurrently with one.
pub trait SweepObserver {
    /// The planner entered `state`
    fn state_changed(&mut self, _mode: ScalingMode, _state: PlannerState) {}

    /// A batch of `iterations` invocations at `point` is starting
    fn point_started(&mut self, _point: &ConfigurationPoint, _iterations: usize) {}

    /// One invocation finished
    fn iteration_finished(
        &mut self,
        _point: &ConfigurationPoint,
        _iteration: usize,
        _outcome: std::result::Result<&RawSample, &ScaleError>,
    ) {
    }

    /// A point was measured and its metrics derived
    fn point_finished(&mut self, _point: &MeasuredPoint) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SweepObserver for NoopObserver {}

/// Accumulates the pieces of a result while a run progresses
#[derive(Default)]
struct RunAccumulator {
    points: Vec<MeasuredPoint>,
    baselines: BaselineTracker,
    fractions: Vec<SequentialFractionEstimate>,
}

/// Drives measurement of strong and weak scaling runs
pub struct ScalabilityPlanner<R, G> {
    config: SweepConfig,
    repeater: MeasurementRepeater<R, G>,
    state: PlannerState,
}

impl<R: CommandRunner, G: InputGenerator> ScalabilityPlanner<R, G> {
    /// Planner for a validated configuration
    ///
    /// The configuration's failure policy applies to every mode.
    pub fn new(config: SweepConfig, harness: ProcessHarness<R>, generator: G) -> Result<Self> {
        config.validate()?;
        let repeater = MeasurementRepeater::new(harness, generator, config.failure_policy);
        Ok(Self {
            config,
            repeater,
            state: PlannerState::Idle,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Current phase
    pub fn state(&self) -> PlannerState {
        self.state
    }

    /// Strong scaling run for `input_size`
    pub fn run_strong(
        &mut self,
        input_size: u64,
    ) -> std::result::Result<ScalabilityResult, SweepFailure> {
        self.run_strong_observed(input_size, &mut NoopObserver)
    }

    /// Strong scaling run reporting progress to `observer`
    pub fn run_strong_observed(
        &mut self,
        input_size: u64,
        observer: &mut dyn SweepObserver,
    ) -> std::result::Result<ScalabilityResult, SweepFailure> {
        let mut run = RunAccumulator::default();
        let outcome = self.strong_pass(input_size, &mut run, observer);
        self.finish(ScalingMode::Strong, run, outcome, observer)
    }

    /// Weak scaling run over the configured worker counts
    pub fn run_weak(&mut self) -> std::result::Result<ScalabilityResult, SweepFailure> {
        self.run_weak_observed(&mut NoopObserver)
    }

    /// Weak scaling run reporting progress to `observer`
    pub fn run_weak_observed(
        &mut self,
        observer: &mut dyn SweepObserver,
    ) -> std::result::Result<ScalabilityResult, SweepFailure> {
        let mut run = RunAccumulator::default();
        let outcome = self.weak_pass(&mut run, observer);
        self.finish(ScalingMode::Weak, run, outcome, observer)
    }

    fn strong_pass(
        &mut self,
        input_size: u64,
        run: &mut RunAccumulator,
        observer: &mut dyn SweepObserver,
    ) -> Result<()> {
        let points = self.config.strong_points(input_size);
        let Some((baseline_point, rest)) = points.split_first() else {
            return Ok(());
        };

        self.enter(ScalingMode::Strong, PlannerState::MeasuringBaseline, observer);
        let baseline = self.measure(*baseline_point, observer)?;
        run.baselines.record(input_size, baseline.mean_time);

        self.enter(ScalingMode::Strong, PlannerState::EstimatingFraction, observer);
        let estimate = match self.config.fraction_source {
            FractionSource::ReuseBaseline => {
                SequentialFractionEstimate::estimate(input_size, &baseline.samples)
            }
            FractionSource::Independent => self
                .measure(*baseline_point, observer)
                .and_then(|single| {
                    SequentialFractionEstimate::estimate(input_size, &single.samples)
                }),
        };
        let estimate = match estimate {
            Ok(estimate) => estimate,
            Err(error) => {
                // Keep the baseline even though no bound could be derived
                let metrics = DerivedMetrics {
                    speedup: Some(1.0),
                    efficiency: 1.0,
                    theoretical_speedup: None,
                };
                self.push(run, baseline, metrics, observer);
                return Err(error);
            }
        };
        log::info!(
            "Input size {}: sequential fraction {:.4} ({} samples)",
            input_size,
            estimate.sequential_fraction,
            estimate.sample_count
        );

        run.fractions.push(estimate.clone());

        let baseline_metrics = self.strong_metrics(run, &estimate, &baseline)?;
        self.push(run, baseline, baseline_metrics, observer);

        self.enter(ScalingMode::Strong, PlannerState::Sweeping, observer);
        for &point in rest {
            let measurement = self.measure(point, observer)?;
            let metrics = self.strong_metrics(run, &estimate, &measurement)?;
            self.push(run, measurement, metrics, observer);
        }
        Ok(())
    }

    fn weak_pass(&mut self, run: &mut RunAccumulator, observer: &mut dyn SweepObserver) -> Result<()> {
        let base_size = self.config.weak_base_size;

        self.enter(ScalingMode::Weak, PlannerState::Sweeping, observer);
        for point in self.config.weak_points() {
            let measurement = self.measure(point, observer)?;
            if point.is_baseline() {
                run.baselines.record(base_size, measurement.mean_time);
            }
            let metrics = DerivedMetrics {
                speedup: None,
                efficiency: run
                    .baselines
                    .weak_efficiency(&point, base_size, measurement.mean_time)?,
                theoretical_speedup: None,
            };
            self.push(run, measurement, metrics, observer);
        }
        Ok(())
    }

    fn strong_metrics(
        &self,
        run: &RunAccumulator,
        estimate: &SequentialFractionEstimate,
        measurement: &MeasurementPoint,
    ) -> Result<DerivedMetrics> {
        let point = measurement.point;
        Ok(DerivedMetrics {
            speedup: Some(run.baselines.speedup(&point, measurement.mean_time)?),
            efficiency: run.baselines.efficiency(&point, measurement.mean_time)?,
            theoretical_speedup: Some(estimate.project(point.worker_count)),
        })
    }

    fn measure(
        &mut self,
        point: ConfigurationPoint,
        observer: &mut dyn SweepObserver,
    ) -> Result<MeasurementPoint> {
        let iterations = self.config.iterations;
        observer.point_started(&point, iterations);
        log::info!("Measuring {} x{}", point, iterations);
        self.repeater.repeat_observed(point, iterations, observer)
    }

    fn push(
        &self,
        run: &mut RunAccumulator,
        measurement: MeasurementPoint,
        metrics: DerivedMetrics,
        observer: &mut dyn SweepObserver,
    ) {
        log::info!(
            "{}: mean {:.6} s, std {:.6} s, efficiency {:.3}",
            measurement.point,
            measurement.mean_time,
            measurement.std_time,
            metrics.efficiency
        );
        let measured = MeasuredPoint {
            measurement,
            metrics,
        };
        observer.point_finished(&measured);
        run.points.push(measured);
    }

    fn enter(&mut self, mode: ScalingMode, state: PlannerState, observer: &mut dyn SweepObserver) {
        log::debug!("{} scaling: {} -> {}", mode, self.state, state);
        self.state = state;
        observer.state_changed(mode, state);
    }

    fn finish(
        &mut self,
        mode: ScalingMode,
        run: RunAccumulator,
        outcome: Result<()>,
        observer: &mut dyn SweepObserver,
    ) -> std::result::Result<ScalabilityResult, SweepFailure> {
        let result = ResultAggregator::aggregate(mode, run.points, run.baselines, run.fractions);
        match outcome {
            Ok(()) => {
                self.enter(mode, PlannerState::Done, observer);
                Ok(result)
            }
            Err(source) => {
                log::error!("{} scaling run aborted: {}", mode, source);
                self.enter(mode, PlannerState::Idle, observer);
                Err(SweepFailure {
                    mode,
                    partial: result,
                    source,
                })
            }
        }
    }
}
