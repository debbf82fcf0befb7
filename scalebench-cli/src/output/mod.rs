//! Output formatting module
//!
//! Results are rendered as [`Table`]s and handed to an [`OutputFormatter`]
//! for stdout. Files on disk are written by [`ResultWriter`].

use anyhow::Result;
use scalebench_core::{AmdahlTable, ScalingMode, ScalingRecord, SequentialAnalysisRecord};
use std::io::Write;

pub mod csv;
pub mod json;
pub mod markdown;
pub mod persist;
pub mod text;

pub use self::csv::CsvFormatter;
pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use persist::ResultWriter;
pub use text::TextFormatter;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output a single table
    fn write_table(&mut self, table: &Table) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned plain-text columns
    Text,
    /// Markdown tables
    Markdown,
    /// Comma-separated values
    Csv,
    /// JSON array of tables
    Json,
}

/// Formatter for `format` writing to `writer`
pub fn create_formatter<'a, W: Write + Send + Sync + 'a>(
    format: OutputFormat,
    writer: W,
) -> Box<dyn OutputFormatter + 'a> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(writer)),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
        OutputFormat::Csv => Box::new(CsvFormatter::new(writer)),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer)),
    }
}

/// Placeholder for cells without a value
pub const EMPTY_CELL: &str = "-";

/// A titled grid of preformatted cells
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Caption shown above the table
    pub title: String,
    /// Column headers
    pub headers: Vec<String>,
    /// Rows, each as wide as `headers`
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with the given headers
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Scaling results of one run
    pub fn scaling(title: impl Into<String>, mode: ScalingMode, records: &[ScalingRecord]) -> Self {
        let with_score = records.iter().any(|r| r.mean_score.is_some());
        let mut headers = match mode {
            ScalingMode::Strong => vec![
                "Input Size",
                "Workers",
                "Mean Time (s)",
                "Std Dev (s)",
                "Speedup",
                "Efficiency",
                "Theoretical",
            ],
            ScalingMode::Weak => vec![
                "Input Size",
                "Workers",
                "Size/Worker",
                "Mean Time (s)",
                "Std Dev (s)",
                "Efficiency",
            ],
        };
        if with_score {
            headers.push("Score");
        }

        let mut table = Table::new(title, &headers);
        for record in records {
            let mut row = match mode {
                ScalingMode::Strong => vec![
                    record.input_size.to_string(),
                    record.worker_count.to_string(),
                    format!("{:.4}", record.mean_time),
                    format!("{:.4}", record.std_time),
                    optional(record.speedup, 2),
                    format!("{:.2}", record.efficiency),
                    optional(record.theoretical_speedup, 2),
                ],
                ScalingMode::Weak => vec![
                    record.input_size.to_string(),
                    record.worker_count.to_string(),
                    record
                        .size_per_worker
                        .map_or_else(|| EMPTY_CELL.to_string(), |s| s.to_string()),
                    format!("{:.4}", record.mean_time),
                    format!("{:.4}", record.std_time),
                    format!("{:.2}", record.efficiency),
                ],
            };
            if with_score {
                row.push(optional(record.mean_score, 1));
            }
            table.push_row(row);
        }
        table
    }

    /// Sequential versus parallel breakdown per input size
    pub fn sequential_analysis(records: &[SequentialAnalysisRecord]) -> Self {
        let mut table = Table::new(
            "Sequential fraction analysis",
            &[
                "Input Size",
                "Total Time (s)",
                "I/O Time (s)",
                "Computation Time (s)",
                "Sequential Fraction",
                "Parallel Fraction",
            ],
        );
        for record in records {
            table.push_row(vec![
                record.input_size.to_string(),
                format!("{:.4}", record.total_time),
                format!("{:.4}", record.io_time),
                format!("{:.4}", record.computation_time),
                format!("{:.4}", record.sequential_fraction),
                format!("{:.4}", record.parallel_fraction),
            ]);
        }
        table
    }

    /// Theoretical speedups for one sequential fraction
    pub fn amdahl(amdahl: &AmdahlTable) -> Self {
        let mut table = Table::new(
            format!(
                "Amdahl's law (sequential fraction {:.4})",
                amdahl.sequential_fraction
            ),
            &["Workers", "Theoretical Speedup"],
        );
        for row in &amdahl.rows {
            table.push_row(vec![
                row.workers.to_string(),
                format!("{:.2}", row.theoretical_speedup),
            ]);
        }
        table
    }
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| EMPTY_CELL.to_string(), |v| format!("{v:.precision$}"))
}
