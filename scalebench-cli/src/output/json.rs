//! JSON output formatter

use super::{OutputFormatter, Table, EMPTY_CELL};
use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;

/// JSON formatter - outputs all tables as one JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    tables: Vec<TableData>,
}

/// Data structure for JSON output
#[derive(Debug, Serialize)]
pub struct TableData {
    /// Table caption
    pub title: String,
    /// One object per row keyed by column header
    pub rows: Vec<Map<String, Value>>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            tables: Vec::new(),
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        let rows: Vec<Map<String, Value>> = table
            .rows
            .iter()
            .map(|row| {
                table
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| (header.clone(), cell_value(cell)))
                    .collect::<Map<String, Value>>()
            })
            .collect();
        self.tables.push(TableData {
            title: table.title.clone(),
            rows,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.tables)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Numbers become JSON numbers, empty cells null
fn cell_value(cell: &str) -> Value {
    if cell == EMPTY_CELL {
        return Value::Null;
    }
    if let Ok(integer) = cell.parse::<u64>() {
        return Value::from(integer);
    }
    cell.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(cell.to_string()), Value::Number)
}
