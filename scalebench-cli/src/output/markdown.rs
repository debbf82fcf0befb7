//! Markdown output formatter

use super::{OutputFormatter, Table};
use anyhow::Result;
use std::io::Write;

/// Markdown formatter - outputs a heading and a pipe table per result table
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    table_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            table_count: 0,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        self.table_count += 1;
        writeln!(self.writer, "## {}", table.title)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| {} |", table.headers.join(" | "))?;
        let separator: Vec<&str> = table.headers.iter().map(|_| "---").collect();
        writeln!(self.writer, "|{}|", separator.join("|"))?;
        for row in &table.rows {
            writeln!(self.writer, "| {} |", row.join(" | "))?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total tables: {}*", self.table_count)?;
        self.writer.flush()?;
        Ok(())
    }
}
