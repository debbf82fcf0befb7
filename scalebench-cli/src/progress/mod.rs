//! Progress reporting module

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use scalebench_core::{
    ConfigurationPoint, MeasuredPoint, PlannerState, RawSample, ScaleError, ScalingMode,
    SweepObserver,
};
use std::time::Duration;

/// Progress reporter with one bar per configuration point
pub struct ProgressReporter {
    bars: Option<MultiProgress>,
    current: Option<ProgressBar>,
    failed: u64,
}

impl ProgressReporter {
    /// Create a new progress reporter; a quiet reporter draws nothing
    pub fn new(quiet: bool) -> Self {
        Self {
            bars: (!quiet).then(MultiProgress::new),
            current: None,
            failed: 0,
        }
    }

    /// Finish progress reporting
    pub fn finish(&mut self) {
        if let Some(pb) = self.current.take() {
            pb.abandon();
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] {prefix:>32} {bar:30.cyan/blue} {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
    }
}

impl SweepObserver for ProgressReporter {
    fn state_changed(&mut self, mode: ScalingMode, state: PlannerState) {
        if let Some(bars) = &self.bars {
            if state == PlannerState::EstimatingFraction {
                let _ = bars.println(format!("{mode} scaling: {state}"));
            }
        }
    }

    fn point_started(&mut self, point: &ConfigurationPoint, iterations: usize) {
        self.finish();
        self.failed = 0;
        let Some(bars) = &self.bars else {
            return;
        };

        let pb = bars.add(ProgressBar::new(iterations as u64));
        pb.set_style(Self::style());
        pb.set_prefix(point.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.current = Some(pb);
    }

    fn iteration_finished(
        &mut self,
        _point: &ConfigurationPoint,
        _iteration: usize,
        outcome: Result<&RawSample, &ScaleError>,
    ) {
        if outcome.is_err() {
            self.failed += 1;
        }
        if let Some(pb) = &self.current {
            match outcome {
                Ok(sample) => pb.set_message(format!("{:.4} s", sample.computation_time)),
                Err(_) => pb.set_message(format!("{} failed", self.failed)),
            }
            pb.inc(1);
        }
    }

    fn point_finished(&mut self, point: &MeasuredPoint) {
        if let Some(pb) = self.current.take() {
            pb.finish_with_message(format!(
                "mean {:.4} s, efficiency {:.2}",
                point.measurement.mean_time, point.metrics.efficiency
            ));
        }
    }
}
