//! Colored terminal output

use std::io::Write;

use termcolor::{Ansi, Color, ColorChoice, ColorSpec, NoColor, WriteColor};

use crate::diff::{cell_diff::percentage_change, CellDiff, DiffReport, SchemaChange};
use crate::error::Result;
use crate::model::Row;

use super::{InputNames, OutputFormatter};

/// Terminal output with colors
pub struct TerminalOutput {
    color_choice: ColorChoice,
}

impl TerminalOutput {
    /// Plain output; see [`TerminalOutput::with_color_choice`]
    pub fn new() -> Self {
        Self {
            color_choice: ColorChoice::Never,
        }
    }

    /// `Auto` is resolved by the caller; only `Never` disables escapes here
    pub fn with_color_choice(color_choice: ColorChoice) -> Self {
        Self { color_choice }
    }

    fn write_header(&self, out: &mut dyn WriteColor, names: &InputNames) -> Result<()> {
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out, " eureka: {} → {}", names.old, names.new)?;
        writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(out)?;
        Ok(())
    }

    fn write_schema_changes(&self, changes: &[SchemaChange], out: &mut dyn WriteColor) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }

        writeln!(out, "Schema Changes:")?;
        for change in changes {
            let color = match change {
                SchemaChange::ColumnAdded { .. } => Color::Green,
                SchemaChange::ColumnRemoved { .. } => Color::Red,
                SchemaChange::ColumnTypeChanged { .. } => Color::Yellow,
            };
            out.set_color(ColorSpec::new().set_fg(Some(color)))?;
            writeln!(out, "  {}", change)?;
            out.reset()?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_summary(&self, report: &DiffReport, out: &mut dyn WriteColor) -> Result<()> {
        let stats = &report.stats;
        writeln!(
            out,
            "Summary: +{} added, -{} removed, ~{} changed, {} unchanged (out of {} → {} rows)",
            stats.rows_added,
            stats.rows_removed,
            stats.rows_changed,
            stats.rows_unchanged,
            stats.old_row_count,
            stats.new_row_count
        )?;
        writeln!(
            out,
            "Matching: {}; strict decimal: {}",
            report.match_mode(),
            if report.options.strict_decimal { "on" } else { "off" }
        )?;
        writeln!(out)?;
        Ok(())
    }

    fn write_rows(
        &self,
        title: &str,
        color: Color,
        rows: &[&Row],
        columns: &[String],
        out: &mut dyn WriteColor,
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        writeln!(out, "{}:", title)?;
        out.reset()?;

        let mut table_data: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
        let mut headers = vec!["line".to_string()];
        headers.extend(columns.iter().cloned());
        table_data.push(headers);

        for row in rows {
            let mut row_data = vec![row.source_line.to_string()];
            row_data.extend(row.cells.iter().map(|c| c.display().into_owned()));
            table_data.push(row_data);
        }

        write!(out, "{}", build_table(&table_data))?;
        writeln!(out)?;
        Ok(())
    }

    fn write_changed_rows(&self, report: &DiffReport, out: &mut dyn WriteColor) -> Result<()> {
        let mut changed = report.changed_rows().peekable();
        if changed.peek().is_none() {
            return Ok(());
        }

        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        writeln!(out, "Changed Rows:")?;
        out.reset()?;
        for (key, old_row, new_row, changes) in changed {
            writeln!(
                out,
                "  {} (lines {} → {}):",
                key, old_row.source_line, new_row.source_line
            )?;
            for change in changes {
                self.write_cell_change(change, out)?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_cell_change(&self, change: &CellDiff, out: &mut dyn WriteColor) -> Result<()> {
        let pct = match (&change.old_value, &change.new_value) {
            (Some(old), Some(new)) => percentage_change(old, new),
            _ => None,
        };
        let pct_str = pct.map(|p| format!(" ({:+.1}%)", p)).unwrap_or_default();

        write!(out, "    {}: ", change.column)?;
        match &change.old_value {
            Some(_) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                write!(out, "{}", change.old_display())?;
                out.reset()?;
            }
            None => write!(out, "(absent)")?,
        }
        write!(out, " → ")?;
        match &change.new_value {
            Some(_) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                write!(out, "{}", change.new_display())?;
                out.reset()?;
            }
            None => write!(out, "(absent)")?,
        }
        writeln!(out, "{}", pct_str)?;
        Ok(())
    }

    fn render_colored(
        &self,
        report: &DiffReport,
        names: &InputNames,
        out: &mut dyn WriteColor,
    ) -> Result<()> {
        self.write_header(out, names)?;

        if !report.has_changes() {
            writeln!(out, "No differences found.")?;
            return Ok(());
        }

        self.write_schema_changes(&report.schema_changes, out)?;
        self.write_summary(report, out)?;

        let added: Vec<&Row> = report.added_rows().collect();
        let removed: Vec<&Row> = report.removed_rows().collect();
        self.write_rows("Only in new", Color::Green, &added, &report.new_columns, out)?;
        self.write_rows("Only in old", Color::Red, &removed, &report.old_columns, out)?;
        self.write_changed_rows(report, out)?;

        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(
        &self,
        report: &DiffReport,
        names: &InputNames,
        writer: &mut dyn Write,
    ) -> Result<()> {
        if self.color_choice == ColorChoice::Never {
            self.render_colored(report, names, &mut NoColor::new(writer))
        } else {
            self.render_colored(report, names, &mut Ansi::new(writer))
        }
    }
}

/// Build a formatted table from data
fn build_table(data: &[Vec<String>]) -> String {
    if data.is_empty() || data[0].is_empty() {
        return String::new();
    }

    let col_count = data[0].len();

    let mut col_widths: Vec<usize> = vec![0; col_count];
    for row in data {
        for (i, cell) in row.iter().enumerate() {
            if i < col_widths.len() {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }
    }

    let border = |left: char, mid: char, right: char| {
        let mut line = String::new();
        line.push(left);
        for (i, width) in col_widths.iter().enumerate() {
            line.push_str(&"─".repeat(*width + 2));
            if i < col_widths.len() - 1 {
                line.push(mid);
            }
        }
        line.push(right);
        line.push('\n');
        line
    };
    let content = |row: &[String]| {
        let mut line = String::from("│");
        for (i, width) in col_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            line.push_str(&format!(" {:width$} │", cell, width = width));
        }
        line.push('\n');
        line
    };

    let mut output = border('┌', '┬', '┐');
    output.push_str(&content(data[0].as_slice()));
    output.push_str(&border('├', '┼', '┤'));
    for row in data.iter().skip(1) {
        output.push_str(&content(row.as_slice()));
    }
    output.push_str(&border('└', '┴', '┘'));

    output
}
