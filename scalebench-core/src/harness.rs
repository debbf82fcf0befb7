//! Single invocation of the program under test
//!
//! The harness builds the command line, runs it through a [`CommandRunner`],
//! and turns the textual report into a [`RawSample`].

use crate::error::{Result, ScaleError};
use crate::inputs::InputPair;
use crate::launcher::Launcher;
use crate::runner::CommandRunner;
use crate::types::{ConfigurationPoint, RawSample};
use serde::{Deserialize, Serialize};

/// Label of the whole-program wall time line
pub const TOTAL_TIME_LABEL: &str = "Total time:";

/// Label of the parallel computation time line
pub const COMPUTATION_TIME_LABEL: &str = "LCS computation time:";

/// Label of the correctness score line
pub const SCORE_LABEL: &str = "Score:";

/// Which values the program is expected to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputSchema {
    /// Total and computation time
    Timing,
    /// Total and computation time plus an integer score
    TimingWithScore,
}

impl OutputSchema {
    /// Schema the launcher's program variant normally produces
    pub fn default_for(launcher: &Launcher) -> Self {
        match launcher {
            Launcher::Direct { .. } => OutputSchema::Timing,
            Launcher::Mpi { .. } => OutputSchema::TimingWithScore,
        }
    }

    fn requires_score(&self) -> bool {
        matches!(self, OutputSchema::TimingWithScore)
    }
}

/// Runs the program once per call and parses its report
#[derive(Debug)]
pub struct ProcessHarness<R> {
    runner: R,
    launcher: Launcher,
    schema: OutputSchema,
}

impl<R: CommandRunner> ProcessHarness<R> {
    /// Harness using the launcher's default schema
    pub fn new(runner: R, launcher: Launcher) -> Self {
        let schema = OutputSchema::default_for(&launcher);
        Self::with_schema(runner, launcher, schema)
    }

    /// Harness with an explicit output schema
    pub fn with_schema(runner: R, launcher: Launcher, schema: OutputSchema) -> Self {
        Self {
            runner,
            launcher,
            schema,
        }
    }

    /// Launcher in use
    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// Expected output schema
    pub fn schema(&self) -> OutputSchema {
        self.schema
    }

    /// Run the program once for `point` on `inputs`
    pub fn invoke(&self, point: &ConfigurationPoint, inputs: &InputPair) -> Result<RawSample> {
        let (program, args) = self.launcher.command(point, inputs);
        log::debug!("Invoking {} {}", program, args.join(" "));

        let output = self.runner.run(&program, &args)?;
        if !output.is_success() {
            return Err(ScaleError::InvocationFailure {
                point: *point,
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        parse_output(&output.stdout, self.schema).map_err(|field| ScaleError::ParseFailure {
            point: *point,
            field,
            output: output.stdout,
        })
    }
}

/// Parse a program report, returning the label that was missing on failure
pub fn parse_output(
    stdout: &str,
    schema: OutputSchema,
) -> std::result::Result<RawSample, &'static str> {
    let mut total_time = None;
    let mut computation_time = None;
    let mut score = None;

    for line in stdout.lines() {
        if let Some(value) = value_after(line, TOTAL_TIME_LABEL) {
            total_time = Some(value.parse::<f64>().map_err(|_| TOTAL_TIME_LABEL)?);
        } else if let Some(value) = value_after(line, COMPUTATION_TIME_LABEL) {
            computation_time = Some(value.parse::<f64>().map_err(|_| COMPUTATION_TIME_LABEL)?);
        } else if let Some(value) = value_after(line, SCORE_LABEL) {
            score = Some(value.parse::<u64>().map_err(|_| SCORE_LABEL)?);
        }
    }

    let total_time = total_time.ok_or(TOTAL_TIME_LABEL)?;
    let computation_time = computation_time.ok_or(COMPUTATION_TIME_LABEL)?;
    if schema.requires_score() && score.is_none() {
        return Err(SCORE_LABEL);
    }

    Ok(RawSample {
        total_time,
        computation_time,
        score,
    })
}

/// First whitespace-delimited token following `label` on `line`
fn value_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let start = line.find(label)? + label.len();
    // A label with nothing after it still counts as present
    Some(line[start..].split_whitespace().next().unwrap_or(""))
}
