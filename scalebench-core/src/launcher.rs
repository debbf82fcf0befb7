//! Command-line construction for the program under test

use crate::inputs::InputPair;
use crate::types::ConfigurationPoint;
use serde::{Deserialize, Serialize};

/// Default MPI launcher binary
pub const DEFAULT_MPIRUN: &str = "mpirun";

/// Default cores available on one node
pub const DEFAULT_CORES_PER_NODE: u32 = 6;

/// Default nodes used when a run spills past one node
pub const DEFAULT_NODES: u32 = 2;

/// How the program under test is started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "launcher", rename_all = "kebab-case")]
pub enum Launcher {
    /// `<executable> <file_A> <file_B> <worker_count>`
    Direct {
        /// Program under test
        executable: String,
    },
    /// `<mpirun> -np <n> --map-by <placement> <executable> <file_A> <file_B>`
    Mpi {
        /// Program under test
        executable: String,
        /// MPI launcher binary
        mpirun: String,
        /// Processes that fit on a single node
        cores_per_node: u32,
        /// Nodes to spread over when a single node is not enough
        nodes: u32,
    },
}

impl Launcher {
    /// Direct launcher for `executable`
    pub fn direct(executable: impl Into<String>) -> Self {
        Launcher::Direct {
            executable: executable.into(),
        }
    }

    /// MPI launcher for `executable` with default placement settings
    pub fn mpi(executable: impl Into<String>) -> Self {
        Launcher::Mpi {
            executable: executable.into(),
            mpirun: DEFAULT_MPIRUN.to_string(),
            cores_per_node: DEFAULT_CORES_PER_NODE,
            nodes: DEFAULT_NODES,
        }
    }

    /// Program under test
    pub fn executable(&self) -> &str {
        match self {
            Launcher::Direct { executable } | Launcher::Mpi { executable, .. } => executable,
        }
    }

    /// Program and arguments for one invocation at `point`
    pub fn command(&self, point: &ConfigurationPoint, inputs: &InputPair) -> (String, Vec<String>) {
        let file_a = inputs.first.display().to_string();
        let file_b = inputs.second.display().to_string();

        match self {
            Launcher::Direct { executable } => (
                executable.clone(),
                vec![file_a, file_b, point.worker_count.to_string()],
            ),
            Launcher::Mpi {
                executable,
                mpirun,
                cores_per_node,
                nodes,
            } => {
                let processes = point.worker_count;
                let placement = if processes <= *cores_per_node {
                    "core".to_string()
                } else {
                    format!("ppr:{}:node", processes / (*nodes).max(1))
                };
                (
                    mpirun.clone(),
                    vec![
                        "-np".to_string(),
                        processes.to_string(),
                        "--map-by".to_string(),
                        placement,
                        executable.clone(),
                        file_a,
                        file_b,
                    ],
                )
            }
        }
    }
}
