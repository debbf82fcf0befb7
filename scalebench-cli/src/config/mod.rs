//! Configuration module

use crate::error::CliError;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use scalebench_core::launcher::{DEFAULT_CORES_PER_NODE, DEFAULT_MPIRUN, DEFAULT_NODES};
use scalebench_core::{Launcher, OutputSchema, SweepConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// What to measure
    #[serde(default)]
    pub sweep: SweepConfig,

    /// How to start the program under test
    #[serde(default)]
    pub program: ProgramConfig,

    /// Where results go
    #[serde(default)]
    pub output: OutputConfig,
}

impl CliConfig {
    /// Load a configuration file; missing sections take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = toml::from_str(content)?;
        Ok(config)
    }

    /// Check everything a run depends on
    pub fn validate(&self) -> Result<()> {
        self.sweep
            .validate()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;

        if self.program.executable.trim().is_empty() {
            return Err(CliError::ConfigError("program.executable must not be empty".into()).into());
        }
        if self.program.launcher == LauncherKind::Mpi
            && (self.program.cores_per_node == 0 || self.program.nodes == 0)
        {
            return Err(CliError::ConfigError(
                "cores_per_node and nodes must be positive for the mpi launcher".into(),
            )
            .into());
        }
        Ok(())
    }
}

/// Launch method for the program under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LauncherKind {
    /// Run the executable directly, passing the worker count as an argument
    #[default]
    Direct,
    /// Run the executable under mpirun with one process per worker
    Mpi,
}

/// Program-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// Program under test
    pub executable: String,

    /// Launch method
    pub launcher: LauncherKind,

    /// Expected report format; derived from the launcher when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<OutputSchema>,

    /// MPI launcher binary
    pub mpirun: String,

    /// Processes per node before spilling to several nodes
    pub cores_per_node: u32,

    /// Nodes used once a run spills
    pub nodes: u32,

    /// Directory for generated input files
    pub work_dir: PathBuf,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            executable: "./lcs".to_string(),
            launcher: LauncherKind::Direct,
            schema: None,
            mpirun: DEFAULT_MPIRUN.to_string(),
            cores_per_node: DEFAULT_CORES_PER_NODE,
            nodes: DEFAULT_NODES,
            work_dir: PathBuf::from("."),
        }
    }
}

impl ProgramConfig {
    /// Launcher described by this section
    pub fn to_launcher(&self) -> Launcher {
        match self.launcher {
            LauncherKind::Direct => Launcher::direct(self.executable.clone()),
            LauncherKind::Mpi => Launcher::Mpi {
                executable: self.executable.clone(),
                mpirun: self.mpirun.clone(),
                cores_per_node: self.cores_per_node,
                nodes: self.nodes,
            },
        }
    }

    /// Output schema in effect
    pub fn effective_schema(&self) -> OutputSchema {
        self.schema
            .unwrap_or_else(|| OutputSchema::default_for(&self.to_launcher()))
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory for result files
    pub directory: PathBuf,

    /// Write into a fresh `run_<timestamp>` subdirectory
    pub timestamped: bool,

    /// Pretty print JSON output
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("scalebench_results"),
            timestamped: true,
            pretty_json: true,
        }
    }
}

impl OutputConfig {
    /// Directory results of a run started at `started` are written to
    pub fn run_directory(&self, started: DateTime<Local>) -> PathBuf {
        if self.timestamped {
            self.directory
                .join(format!("run_{}", started.format("%Y%m%d_%H%M%S")))
        } else {
            self.directory.clone()
        }
    }
}
