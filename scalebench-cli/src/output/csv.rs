//! CSV output formatter

use super::{OutputFormatter, Table};
use anyhow::Result;
use std::io::Write;

/// CSV formatter - one header row per table, tables separated by a comment line
pub struct CsvFormatter<W: Write> {
    writer: ::csv::Writer<W>,
}

impl<W: Write> CsvFormatter<W> {
    /// Create a new CSV formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer: ::csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(writer),
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for CsvFormatter<W> {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        self.writer.write_record([format!("# {}", table.title)])?;
        self.writer.write_record(&table.headers)?;
        for row in &table.rows {
            self.writer.write_record(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
