//! Scalebench CLI library
//!
//! This library provides the command-line driver for running strong and weak
//! scalability experiments with `scalebench-core`.

pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
