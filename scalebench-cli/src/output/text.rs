//! Plain text output formatter

use super::{OutputFormatter, Table};
use anyhow::Result;
use std::io::Write;

/// Plain text formatter - aligned columns under a title line
pub struct TextFormatter<W: Write> {
    writer: W,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        let widths: Vec<usize> = table
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        writeln!(self.writer, "{}", table.title)?;
        write_line(&mut self.writer, &table.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut self.writer, &rule, &widths)?;
        for row in &table.rows {
            write_line(&mut self.writer, row, &widths)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn write_line<W: Write>(writer: &mut W, cells: &[String], widths: &[usize]) -> Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    writeln!(writer, "{}", padded.join("  ").trim_end())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_aligned() {
        let mut table = Table::new("Amdahl", &["Workers", "Speedup"]);
        table.push_row(vec!["1".into(), "1.00".into()]);
        table.push_row(vec!["∞".into(), "10.00".into()]);

        let mut buffer = Vec::new();
        let mut formatter = TextFormatter::new(&mut buffer);
        formatter.write_table(&table).unwrap();
        formatter.finish().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Amdahl");
        assert_eq!(lines[1], "Workers  Speedup");
        assert_eq!(lines[2], "-------  -------");
        assert_eq!(lines[3], "1        1.00");
        assert_eq!(lines[4], "∞        10.00");
    }
}
