//! CSV file parser

use std::io::Read;

use tracing::debug;

use crate::error::{CompareError, Result, Side};
use crate::model::{CellValue, Column, Dataset};

use super::Parser;

/// Parser for CSV files
#[derive(Debug, Clone)]
pub struct CsvParser {
    drop_blank_rows: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CsvParser {
    /// Create a parser; `drop_blank_rows` removes trailing all-blank rows
    pub fn new(drop_blank_rows: bool) -> Self {
        Self { drop_blank_rows }
    }
}

impl Parser for CsvParser {
    fn parse_reader(&self, reader: &mut dyn Read, side: Side) -> Result<Dataset> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        // Read headers
        let headers = csv_reader
            .headers()
            .map_err(|e| csv_error(side, e))?
            .clone();

        let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            let name = match name.trim() {
                "" => format!("column_{}", i + 1),
                trimmed => trimmed.to_string(),
            };
            if columns.iter().any(|c| c.name == name) {
                return Err(CompareError::MalformedInput {
                    side,
                    line: 1,
                    message: format!("duplicate column name '{}'", name),
                });
            }
            columns.push(Column::new(name, i));
        }

        let mut dataset = Dataset::new(columns);

        // Read rows
        for (record_num, result) in csv_reader.records().enumerate() {
            let record = result.map_err(|e| csv_error(side, e))?;
            let line = record
                .position()
                .map_or(record_num + 2, |p| p.line() as usize); // +2 for 1-indexing and header

            if record.len() > dataset.column_count() {
                return Err(CompareError::MalformedInput {
                    side,
                    line,
                    message: format!(
                        "found {} fields but the header has {} columns",
                        record.len(),
                        dataset.column_count()
                    ),
                });
            }

            let cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
            dataset.add_row(cells, line);
        }

        if self.drop_blank_rows {
            let dropped = dataset.drop_trailing_blank_rows();
            if dropped > 0 {
                debug!(%side, dropped, "dropped trailing blank rows");
            }
        }

        dataset.infer_column_types();
        debug!(
            %side,
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed CSV"
        );

        Ok(dataset)
    }
}

fn csv_error(side: Side, err: csv::Error) -> CompareError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => CompareError::Io(e),
        _ => CompareError::MalformedInput {
            side,
            line,
            message,
        },
    }
}
