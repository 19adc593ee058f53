//!
//! Module for reporting
//!
//! The harness turns its records into a [ResultTable] and hands it to a [Reporter]. The
//! default is the [PlainReporter]; set another one with
//! [BenchmarkBuilder::set_reporter](crate::BenchmarkBuilder::set_reporter).
//!

/// Helper methods to format benchmark results
pub mod format;
mod plain_reporter;
#[cfg(feature = "table_reporter")]
mod table_reporter;

pub use plain_reporter::PlainReporter;
#[cfg(feature = "table_reporter")]
pub use table_reporter::TableReporter;

use std::io;

use format::{bytes_to_string, format_runtime, format_speedup, PLACEHOLDER};

/// The trait for reporting the results of a harness.
pub trait Reporter {
    /// Writes the report of `table` to `out`.
    fn report(&self, table: &ResultTable, out: &mut dyn io::Write) -> io::Result<()>;
}

/// Everything a report shows, in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    /// Number of calls per measurement.
    pub iterations: usize,
    /// Classification of the arguments, set in verbose mode.
    pub arguments: Option<String>,
    /// Title of the output column, if shown.
    pub output_column: Option<&'static str>,
    /// Whether the error column is shown.
    pub error_column: bool,
    /// Whether the memory column is shown.
    pub memory_column: bool,
    /// The baseline first, then the candidates.
    pub rows: Vec<ReportRow>,
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Id of the baseline or candidate.
    pub id: String,
    /// Average runtime in nanoseconds, 0 if not measured.
    pub runtime_ns: f64,
    /// Speedup relative to the baseline, `None` if not measured.
    pub speedup: Option<f64>,
    /// Peak memory in bytes, if tracked.
    pub memory: Option<usize>,
    /// Formatted output.
    pub output: Option<String>,
    /// Formatted error.
    pub error: Option<String>,
}

impl ResultTable {
    /// Column titles, in order.
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["ID", "Runtime", "Speedup"];
        if self.memory_column {
            headers.push("Memory");
        }
        if let Some(title) = self.output_column {
            headers.push(title);
        }
        if self.error_column {
            headers.push(crate::comparison::ERROR_COLUMN_TITLE);
        }
        headers
    }

    /// Formatted, uncolored cells of `row`, matching [ResultTable::headers].
    pub fn cells(&self, row: &ReportRow) -> Vec<String> {
        let mut cells = vec![
            row.id.clone(),
            format_runtime(row.runtime_ns),
            format_speedup(row.speedup),
        ];
        if self.memory_column {
            cells.push(or_placeholder(
                row.memory.map(|bytes| bytes_to_string(bytes as u64)),
            ));
        }
        if self.output_column.is_some() {
            cells.push(or_placeholder(row.output.clone()));
        }
        if self.error_column {
            cells.push(or_placeholder(row.error.clone()));
        }
        cells
    }
}

fn or_placeholder(cell: Option<String>) -> String {
    cell.unwrap_or_else(|| PLACEHOLDER.to_string())
}
