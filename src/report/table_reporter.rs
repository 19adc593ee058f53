use std::io;

use prettytable::{format, Cell, Row, Table};

use super::{Reporter, ResultTable};

#[derive(Debug, Clone, Copy, Default)]
/// The TableReporter prints the results using prettytable.
///
/// Speedups above 1 are printed green, below 1 red.
pub struct TableReporter {}

impl Reporter for TableReporter {
    fn report(&self, table: &ResultTable, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, ">> Iterations: {}", table.iterations)?;
        if let Some(arguments) = &table.arguments {
            writeln!(out, ">> Arguments: {}", arguments)?;
        }

        let mut pretty = Table::new();
        let format = format::FormatBuilder::new()
            .column_separator('|')
            .borders('|')
            .separators(
                &[format::LinePosition::Title],
                format::LineSeparator::new('-', '+', '+', '+'),
            )
            .padding(1, 1)
            .build();
        pretty.set_format(format);

        pretty.set_titles(Row::new(
            table.headers().into_iter().map(Cell::new).collect(),
        ));
        for row in &table.rows {
            let cells = table
                .cells(row)
                .iter()
                .enumerate()
                .map(|(i, cell)| match (i, row.speedup) {
                    (2, Some(speedup)) if speedup > 1.0 => Cell::new(cell).style_spec("Fg"),
                    (2, Some(speedup)) if speedup < 1.0 => Cell::new(cell).style_spec("Fr"),
                    _ => Cell::new(cell),
                })
                .collect();
            pretty.add_row(Row::new(cells));
        }
        pretty.print(out)?;
        Ok(())
    }
}
