//! JSON output format

use std::io::Write;

use serde::Serialize;

use crate::diff::{CellDiff, DiffReport, DiffStats, RowMatch, SchemaChange};
use crate::error::Result;
use crate::model::{CellValue, Row};

use super::{InputNames, OutputFormatter};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable row match for JSON output
#[derive(Serialize)]
struct JsonRowChange<'a> {
    #[serde(rename = "type")]
    change_type: &'static str,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cells: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<Vec<JsonCellChange<'a>>>,
}

#[derive(Serialize)]
struct JsonCellChange<'a> {
    column: &'a str,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct JsonDiffOutput<'a> {
    old_file: &'a str,
    new_file: &'a str,
    key_columns: &'a [String],
    strict_decimal: bool,
    schema_changes: &'a [SchemaChange],
    row_changes: Vec<JsonRowChange<'a>>,
    stats: &'a DiffStats,
}

/// Numbers are emitted as strings so decimal scale survives
fn cell_value_to_json(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Int(i) => serde_json::json!(*i),
        CellValue::Decimal(d) => serde_json::Value::String(d.to_string()),
        CellValue::String(s) => serde_json::Value::String(s.to_string()),
    }
}

fn row_to_json(row: &Row, columns: &[String]) -> serde_json::Map<String, serde_json::Value> {
    columns
        .iter()
        .zip(&row.cells)
        .map(|(name, cell)| (name.clone(), cell_value_to_json(cell)))
        .collect()
}

fn change_to_json(change: &CellDiff) -> JsonCellChange<'_> {
    JsonCellChange {
        column: &change.column,
        old_value: change.old_value.as_ref().map(cell_value_to_json),
        new_value: change.new_value.as_ref().map(cell_value_to_json),
    }
}

impl OutputFormatter for JsonOutput {
    fn render(
        &self,
        report: &DiffReport,
        names: &InputNames,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let row_changes: Vec<JsonRowChange> = report
            .matches
            .iter()
            .filter(|m| m.is_changed())
            .map(|m| {
                let key = m.key();
                match m {
                    RowMatch::Added { row, .. } => JsonRowChange {
                        change_type: "added",
                        key,
                        old_line: None,
                        new_line: Some(row.source_line),
                        cells: Some(row_to_json(row, &report.new_columns)),
                        changes: None,
                    },
                    RowMatch::Removed { row, .. } => JsonRowChange {
                        change_type: "removed",
                        key,
                        old_line: Some(row.source_line),
                        new_line: None,
                        cells: Some(row_to_json(row, &report.old_columns)),
                        changes: None,
                    },
                    RowMatch::Matched {
                        old_row,
                        new_row,
                        changes,
                        ..
                    } => JsonRowChange {
                        change_type: "changed",
                        key,
                        old_line: Some(old_row.source_line),
                        new_line: Some(new_row.source_line),
                        cells: None,
                        changes: Some(changes.iter().map(change_to_json).collect()),
                    },
                }
            })
            .collect();

        let output = JsonDiffOutput {
            old_file: &names.old,
            new_file: &names.new,
            key_columns: &report.key_columns,
            strict_decimal: report.options.strict_decimal,
            schema_changes: &report.schema_changes,
            row_changes,
            stats: &report.stats,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
