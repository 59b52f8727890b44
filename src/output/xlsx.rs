//! Excel workbook report

use std::io::Write;

use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::diff::{DiffReport, RowMatch, SchemaChange};
use crate::error::Result;
use crate::model::Row;

use super::{InputNames, OutputFormatter};

/// Sheet names in workbook order
pub const REPORT_SHEETS: [&str; 5] = ["Summary", "Columns", "OnlyInOld", "OnlyInNew", "CellDiffs"];

/// Multi-sheet `.xlsx` report output
pub struct XlsxOutput;

impl XlsxOutput {
    pub fn new() -> Self {
        Self
    }

    /// Build the workbook and return its bytes
    pub fn to_bytes(&self, report: &DiffReport, names: &InputNames) -> Result<Vec<u8>> {
        let mut workbook = self.build_workbook(report, names)?;
        let bytes = workbook.save_to_buffer()?;
        debug!(bytes = bytes.len(), "workbook written");
        Ok(bytes)
    }

    fn build_workbook(&self, report: &DiffReport, names: &InputNames) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(REPORT_SHEETS[0])?;
            write_summary_sheet(sheet, report, names, &header_format)?;
        }

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(REPORT_SHEETS[1])?;
            write_columns_sheet(sheet, &report.schema_changes, &header_format)?;
        }

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(REPORT_SHEETS[2])?;
            let removed = report.matches.iter().filter_map(|m| match m {
                RowMatch::Removed { key, row } => Some((key.as_str(), row)),
                _ => None,
            });
            write_rows_sheet(sheet, &report.old_columns, removed, &header_format)?;
        }

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(REPORT_SHEETS[3])?;
            let added = report.matches.iter().filter_map(|m| match m {
                RowMatch::Added { key, row } => Some((key.as_str(), row)),
                _ => None,
            });
            write_rows_sheet(sheet, &report.new_columns, added, &header_format)?;
        }

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(REPORT_SHEETS[4])?;
            write_cell_diffs_sheet(sheet, report, &header_format)?;
        }

        Ok(workbook)
    }
}

impl Default for XlsxOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for XlsxOutput {
    fn render(
        &self,
        report: &DiffReport,
        names: &InputNames,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let bytes = self.to_bytes(report, names)?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

fn row_num(row: usize) -> std::result::Result<u32, XlsxError> {
    u32::try_from(row).map_err(|_| XlsxError::RowColumnLimitError)
}

fn col_num(col: usize) -> std::result::Result<u16, XlsxError> {
    u16::try_from(col).map_err(|_| XlsxError::RowColumnLimitError)
}

fn write_header<S: AsRef<str>>(
    sheet: &mut Worksheet,
    headers: &[S],
    header_format: &Format,
) -> Result<()> {
    for (col, title) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col_num(col)?, title.as_ref(), header_format)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    report: &DiffReport,
    names: &InputNames,
    header_format: &Format,
) -> Result<()> {
    write_header(sheet, &["Metric", "Value"], header_format)?;
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 40)?;

    let stats = &report.stats;
    let counts: [(&str, usize); 9] = [
        ("Old rows", stats.old_row_count),
        ("New rows", stats.new_row_count),
        ("Rows only in old", stats.rows_removed),
        ("Rows only in new", stats.rows_added),
        ("Rows changed", stats.rows_changed),
        ("Rows unchanged", stats.rows_unchanged),
        ("Cells changed", stats.cells_changed),
        ("Cells unchanged", stats.cells_unchanged),
        ("Schema changes", report.schema_changes.len()),
    ];
    let settings: [(&str, String); 8] = [
        ("Old file", names.old.clone()),
        ("New file", names.new.clone()),
        ("Matching", report.match_mode()),
        ("Strict decimal", yes_no(report.options.strict_decimal).to_string()),
        ("Ignore case", yes_no(report.options.ignore_case).to_string()),
        ("Trim whitespace", yes_no(report.options.trim_whitespace).to_string()),
        ("Ignored columns", report.options.ignore_columns.join(", ")),
        ("Generated at", Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    ];

    let mut row = 1;
    for (label, value) in counts {
        sheet.write_string(row, 0, label)?;
        sheet.write_number(row, 1, value as f64)?;
        row += 1;
    }
    for (label, value) in settings {
        sheet.write_string(row, 0, label)?;
        sheet.write_string(row, 1, value.as_str())?;
        row += 1;
    }
    Ok(())
}

fn write_columns_sheet(
    sheet: &mut Worksheet,
    changes: &[SchemaChange],
    header_format: &Format,
) -> Result<()> {
    write_header(sheet, &["Change", "Column", "Detail"], header_format)?;

    for (i, change) in changes.iter().enumerate() {
        let row = row_num(i + 1)?;
        let detail = match change {
            SchemaChange::ColumnAdded { index, .. } => format!("position {}", index + 1),
            SchemaChange::ColumnRemoved { index, .. } => format!("position {}", index + 1),
            SchemaChange::ColumnTypeChanged {
                old_type, new_type, ..
            } => format!("{} → {}", old_type, new_type),
        };
        sheet.write_string(row, 0, change.kind())?;
        sheet.write_string(row, 1, change.column())?;
        sheet.write_string(row, 2, detail.as_str())?;
    }
    Ok(())
}

fn write_rows_sheet<'a>(
    sheet: &mut Worksheet,
    columns: &[String],
    rows: impl Iterator<Item = (&'a str, &'a Row)>,
    header_format: &Format,
) -> Result<()> {
    let mut headers = vec!["Key".to_string(), "Line".to_string()];
    headers.extend(columns.iter().cloned());
    write_header(sheet, &headers, header_format)?;

    for (i, (key, data)) in rows.enumerate() {
        let row = row_num(i + 1)?;
        sheet.write_string(row, 0, key)?;
        sheet.write_number(row, 1, data.source_line as f64)?;
        for (col, cell) in data.cells.iter().enumerate() {
            if !cell.is_null() {
                let text = cell.display();
                sheet.write_string(row, col_num(col + 2)?, &*text)?;
            }
        }
    }
    Ok(())
}

fn write_cell_diffs_sheet(
    sheet: &mut Worksheet,
    report: &DiffReport,
    header_format: &Format,
) -> Result<()> {
    write_header(
        sheet,
        &["Key", "Old line", "New line", "Column", "Old value", "New value"],
        header_format,
    )?;

    let mut row = 1;
    for (key, old_row, new_row, changes) in report.changed_rows() {
        for change in changes {
            let r = row_num(row)?;
            sheet.write_string(r, 0, key)?;
            sheet.write_number(r, 1, old_row.source_line as f64)?;
            sheet.write_number(r, 2, new_row.source_line as f64)?;
            sheet.write_string(r, 3, change.column.as_str())?;
            sheet.write_string(r, 4, change.old_display().as_str())?;
            sheet.write_string(r, 5, change.new_display().as_str())?;
            row += 1;
        }
    }
    Ok(())
}
