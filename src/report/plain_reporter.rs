use std::io;

use unicode_width::UnicodeWidthStr;
use yansi::Paint;

use super::{Reporter, ResultTable};

/// Minimum width of the ID column.
const ID_WIDTH: usize = 32;
/// Minimum width of all other columns.
const COLUMN_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, Default)]
/// The PlainReporter prints the results in a plain text table.
/// This is the default reporter.
///
/// e.g.
/// ```text
/// >> Iterations: 100000
/// ID                              Runtime         Speedup         Result          Error
/// --------------------------------------------------------------------------------------
/// Baseline                        9.4512 ns       1.000000x fast  12.000000       0.000000
/// newton                          3.1120 ns       3.037018x fast  12.000000       0.000000
/// ```
pub struct PlainReporter {}

impl Reporter for PlainReporter {
    fn report(&self, table: &ResultTable, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, ">> Iterations: {}", table.iterations)?;
        if let Some(arguments) = &table.arguments {
            writeln!(out, ">> Arguments: {}", arguments)?;
        }

        let headers = table.headers();
        let rows: Vec<Vec<String>> = table.rows.iter().map(|row| table.cells(row)).collect();
        let widths = column_widths(&headers, &rows);

        let header_cells: Vec<String> = headers
            .iter()
            .map(|title| title.bold().to_string())
            .collect();
        write_line(out, &header_cells, &widths)?;
        writeln!(out, "{}", "-".repeat(widths.iter().sum()))?;

        for (row, mut cells) in table.rows.iter().zip(rows) {
            cells[2] = paint_speedup(&cells[2], row.speedup);
            write_line(out, &cells, &widths)?;
        }
        Ok(())
    }
}

impl PlainReporter {
    /// Create a new PlainReporter
    pub fn new() -> Self {
        Self {}
    }
}

fn paint_speedup(cell: &str, speedup: Option<f64>) -> String {
    match speedup {
        Some(speedup) if speedup > 1.0 => cell.green().to_string(),
        Some(speedup) if speedup < 1.0 => cell.red().to_string(),
        _ => cell.to_string(),
    }
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let min = if i == 0 { ID_WIDTH } else { COLUMN_WIDTH };
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.count_characters() + 2)
                .chain([title.count_characters() + 2, min])
                .max()
                .unwrap_or(min)
        })
        .collect()
}

/// Left aligns every cell in its column. The last cell is not padded.
fn write_line(out: &mut dyn io::Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            write!(out, "{}", cell)?;
        } else {
            let padding = width.saturating_sub(cell.count_characters());
            write!(out, "{}{}", cell, " ".repeat(padding))?;
        }
    }
    writeln!(out)
}

/// Display width of `input`, ignoring ANSI escape sequences.
fn count_characters(input: &str) -> usize {
    let mut visible = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch == '\x1B' {
            // Skip the '[' and everything up to the letter ending the ANSI code
            chars.next();
            for ch in chars.by_ref() {
                if ch.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            visible.push(ch);
        }
    }

    visible.width()
}
trait LenWithoutControl {
    fn count_characters(&self) -> usize;
}
impl LenWithoutControl for str {
    fn count_characters(&self) -> usize {
        count_characters(self)
    }
}
