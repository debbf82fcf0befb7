//! Run command implementation

use crate::config::{CliConfig, LauncherKind};
use crate::error::CliError;
use crate::output::{create_formatter, OutputFormat, ResultWriter, Table};
use crate::progress::ProgressReporter;
use anyhow::Result;
use chrono::Local;
use clap::Args;
use scalebench_core::fraction::mean_fraction;
use scalebench_core::{
    AmdahlTable, CommandRunner, FailurePolicy, InputGenerator, ProcessHarness,
    RandomInputGenerator, ScalabilityPlanner, ScalabilityResult, ScalingMode, ScalingRecord,
    SequentialAnalysisRecord, SweepFailure, SystemRunner,
};
use std::io;
use std::path::{Path, PathBuf};

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Program under test
    #[arg(short, long, value_name = "PATH")]
    pub program: Option<String>,

    /// How to start the program
    #[arg(long, value_enum)]
    pub launcher: Option<LauncherKind>,

    /// Which sweeps to run
    #[arg(short, long, value_enum, default_value = "all")]
    pub mode: RunMode,

    /// Worker counts, comma separated; must include 1
    #[arg(short, long, value_name = "N,..", value_delimiter = ',')]
    pub workers: Option<Vec<u32>>,

    /// Input sizes for strong scaling, comma separated
    #[arg(short, long, value_name = "SIZE,..", value_delimiter = ',')]
    pub sizes: Option<Vec<u64>>,

    /// Invocations per configuration point
    #[arg(short = 'n', long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Per-worker input size for weak scaling
    #[arg(long, value_name = "SIZE")]
    pub weak_base_size: Option<u64>,

    /// Abort on the first failed invocation
    #[arg(long, conflicts_with = "min_samples")]
    pub abort_on_failure: bool,

    /// Skip failed invocations while at least N samples succeed
    #[arg(long, value_name = "N")]
    pub min_samples: Option<usize>,

    /// Directory for generated input files
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Seed for input generation
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Base directory for result files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write results directly into the output directory
    #[arg(long)]
    pub no_timestamp: bool,

    /// Format of the tables printed to stdout
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Sweeps to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RunMode {
    /// Fixed input sizes, increasing workers
    Strong,
    /// Input size grows with workers
    Weak,
    /// Strong sweeps followed by the weak sweep
    All,
}

impl RunMode {
    fn includes(self, mode: ScalingMode) -> bool {
        match self {
            RunMode::All => true,
            RunMode::Strong => mode == ScalingMode::Strong,
            RunMode::Weak => mode == ScalingMode::Weak,
        }
    }
}

/// Everything measured during one invocation of the command
#[derive(Debug, Default)]
pub struct RunReport {
    /// One result per strong scaling input size
    pub strong: Vec<ScalabilityResult>,
    /// The weak scaling result, if run
    pub weak: Option<ScalabilityResult>,
}

impl RunReport {
    /// All strong scaling records in measurement order
    pub fn strong_records(&self) -> Vec<ScalingRecord> {
        self.strong.iter().flat_map(|r| r.records()).collect()
    }

    /// Sequential fraction breakdown for every strong input size
    pub fn sequential_analysis(&self) -> Vec<SequentialAnalysisRecord> {
        self.strong
            .iter()
            .flat_map(|r| r.sequential_analysis())
            .collect()
    }

    /// Amdahl table over the mean fraction of all input sizes
    pub fn amdahl(&self) -> Option<AmdahlTable> {
        let estimates: Vec<_> = self
            .strong
            .iter()
            .flat_map(|r| r.fractions.iter().cloned())
            .collect();
        mean_fraction(&estimates).map(AmdahlTable::with_default_workers)
    }

    /// Write every non-empty result set to `writer`
    pub fn persist(&self, writer: &ResultWriter) -> Result<()> {
        let strong = self.strong_records();
        if !strong.is_empty() {
            writer.write_scaling(ScalingMode::Strong, &strong)?;
        }
        let sequential = self.sequential_analysis();
        if !sequential.is_empty() {
            writer.write_sequential_analysis(&sequential)?;
        }
        if let Some(table) = self.amdahl() {
            writer.write_amdahl(&table)?;
        }
        if let Some(weak) = self.weak.as_ref().filter(|w| !w.is_empty()) {
            writer.write_scaling(ScalingMode::Weak, &weak.records())?;
        }
        Ok(())
    }

    /// Tables in display order
    pub fn tables(&self) -> Vec<Table> {
        let mut tables = Vec::new();
        for result in self.strong.iter().filter(|r| !r.is_empty()) {
            let records = result.records();
            let title = match records.first() {
                Some(first) => format!("Strong scaling (input size {})", first.input_size),
                None => "Strong scaling".to_string(),
            };
            tables.push(Table::scaling(title, ScalingMode::Strong, &records));
        }

        let sequential = self.sequential_analysis();
        if !sequential.is_empty() {
            tables.push(Table::sequential_analysis(&sequential));
        }
        if let Some(amdahl) = self.amdahl() {
            tables.push(Table::amdahl(&amdahl));
        }

        if let Some(weak) = self.weak.as_ref().filter(|w| !w.is_empty()) {
            tables.push(Table::scaling(
                "Weak scaling",
                ScalingMode::Weak,
                &weak.records(),
            ));
        }
        tables
    }

    fn absorb(&mut self, result: ScalabilityResult) {
        match result.mode {
            ScalingMode::Strong => self.strong.push(result),
            ScalingMode::Weak => self.weak = Some(result),
        }
    }
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self) -> Result<()> {
        super::init_logging(self.verbose, self.quiet);

        let config = self.resolve_config()?;
        config.validate()?;
        log::debug!("Resolved configuration: {:?}", config);
        check_program(&config.program.executable)?;

        let harness = ProcessHarness::with_schema(
            SystemRunner,
            config.program.to_launcher(),
            config.program.effective_schema(),
        );
        let work_dir = &config.program.work_dir;
        let inputs = match self.seed {
            Some(seed) => RandomInputGenerator::with_seed(work_dir, seed),
            None => RandomInputGenerator::new(work_dir),
        };
        let mut planner = ScalabilityPlanner::new(config.sweep.clone(), harness, inputs)?;

        let writer = ResultWriter::create(
            config.output.run_directory(Local::now()),
            config.output.pretty_json,
        )?;
        log::info!("Writing results to {}", writer.directory().display());

        let mut reporter = ProgressReporter::new(self.quiet);
        let mut report = RunReport::default();
        let outcome = self.sweep(&mut planner, &mut reporter, &mut report);
        reporter.finish();

        report.persist(&writer)?;

        let mut formatter = create_formatter(self.format, io::stdout());
        for table in report.tables() {
            formatter.write_table(&table)?;
        }
        formatter.finish()?;

        if !self.quiet {
            eprintln!("Results written to {}", writer.directory().display());
        }

        outcome
    }

    /// Configuration file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => CliConfig::from_file(path)?,
            None => CliConfig::default(),
        };

        if let Some(program) = &self.program {
            config.program.executable = program.clone();
        }
        if let Some(launcher) = self.launcher {
            config.program.launcher = launcher;
        }
        if let Some(work_dir) = &self.work_dir {
            config.program.work_dir = work_dir.clone();
        }
        if let Some(workers) = &self.workers {
            config.sweep.worker_counts = workers.clone();
        }
        if let Some(sizes) = &self.sizes {
            config.sweep.input_sizes = sizes.clone();
        }
        if let Some(iterations) = self.iterations {
            config.sweep.iterations = iterations;
        }
        if let Some(base) = self.weak_base_size {
            config.sweep.weak_base_size = base;
        }
        if self.abort_on_failure {
            config.sweep.failure_policy = FailurePolicy::Abort;
        } else if let Some(min_samples) = self.min_samples {
            config.sweep.failure_policy = FailurePolicy::Tolerate { min_samples };
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if self.no_timestamp {
            config.output.timestamped = false;
        }

        Ok(config)
    }

    /// Run the selected sweeps, stopping at the first fatal failure
    fn sweep<R: CommandRunner, G: InputGenerator>(
        &self,
        planner: &mut ScalabilityPlanner<R, G>,
        reporter: &mut ProgressReporter,
        report: &mut RunReport,
    ) -> Result<()> {
        if self.mode.includes(ScalingMode::Strong) {
            let sizes = planner.config().input_sizes.clone();
            for size in sizes {
                let outcome = planner.run_strong_observed(size, reporter);
                record_outcome(report, outcome)?;
            }
        }

        if self.mode.includes(ScalingMode::Weak) {
            let outcome = planner.run_weak_observed(reporter);
            record_outcome(report, outcome)?;
        }

        Ok(())
    }
}

/// Keep whatever was measured and turn a failure into a CLI error
fn record_outcome(
    report: &mut RunReport,
    outcome: std::result::Result<ScalabilityResult, SweepFailure>,
) -> Result<()> {
    match outcome {
        Ok(result) => {
            report.absorb(result);
            Ok(())
        }
        Err(SweepFailure {
            mode,
            partial,
            source,
        }) => {
            let measured = partial.points.len();
            report.absorb(partial);
            Err(CliError::RunAborted(format!(
                "{mode} scaling stopped after {measured} points: {source}"
            ))
            .into())
        }
    }
}

/// Fail early on a path-like executable that does not exist
fn check_program(executable: &str) -> Result<()> {
    let path = Path::new(executable);
    if path.components().count() > 1 && !path.exists() {
        return Err(CliError::ProgramNotFound(executable.to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    fn parse(args: &[&str]) -> RunArgs {
        TestCli::parse_from(std::iter::once("scalebench").chain(args.iter().copied())).run
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = parse(&[]).resolve_config().unwrap();
        assert_eq!(config.sweep.worker_counts, vec![1, 2, 4, 8]);
        assert_eq!(config.program.executable, "./lcs");
        assert!(config.output.timestamped);
    }

    #[test]
    fn test_overrides_apply() {
        let args = parse(&[
            "--program",
            "/opt/lcs",
            "--launcher",
            "mpi",
            "--workers",
            "1,3,6",
            "--sizes",
            "100,200",
            "-n",
            "4",
            "--weak-base-size",
            "50",
            "--min-samples",
            "3",
            "--output-dir",
            "out",
            "--no-timestamp",
        ]);
        let config = args.resolve_config().unwrap();

        assert_eq!(config.program.executable, "/opt/lcs");
        assert_eq!(config.program.launcher, LauncherKind::Mpi);
        assert_eq!(config.sweep.worker_counts, vec![1, 3, 6]);
        assert_eq!(config.sweep.input_sizes, vec![100, 200]);
        assert_eq!(config.sweep.iterations, 4);
        assert_eq!(config.sweep.weak_base_size, 50);
        assert_eq!(
            config.sweep.failure_policy,
            FailurePolicy::Tolerate { min_samples: 3 }
        );
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert!(!config.output.timestamped);
    }

    #[test]
    fn test_abort_on_failure() {
        let config = parse(&["--abort-on-failure"]).resolve_config().unwrap();
        assert_eq!(config.sweep.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_mode_selection() {
        assert!(RunMode::All.includes(ScalingMode::Strong));
        assert!(RunMode::All.includes(ScalingMode::Weak));
        assert!(!RunMode::Strong.includes(ScalingMode::Weak));
        assert!(!RunMode::Weak.includes(ScalingMode::Strong));
    }

    #[test]
    fn test_check_program() {
        assert!(check_program("lcs").is_ok());
        let error = check_program("./definitely/not/here").unwrap_err();
        assert!(error.downcast_ref::<CliError>().is_some());
    }

    #[test]
    fn test_empty_report_has_no_tables() {
        let report = RunReport::default();
        assert!(report.tables().is_empty());
        assert!(report.amdahl().is_none());
    }
}
