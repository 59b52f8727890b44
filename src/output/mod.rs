//! Output formatting for diff results

mod json;
mod terminal;
mod xlsx;

use std::io::Write;

use crate::config::OutputFormat;
use crate::diff::DiffReport;
use crate::error::Result;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;
pub use xlsx::{XlsxOutput, REPORT_SHEETS};

/// Display names of the two compared inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputNames {
    pub old: String,
    pub new: String,
}

impl InputNames {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl Default for InputNames {
    fn default() -> Self {
        Self::new("old.csv", "new.csv")
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render diff result to a writer
    fn render(&self, report: &DiffReport, names: &InputNames, writer: &mut dyn Write)
        -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Xlsx => Box::new(XlsxOutput::new()),
        }
    }
}

/// Render diff result to stdout
pub fn render_to_stdout(report: &DiffReport, names: &InputNames, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let mut stdout = std::io::stdout().lock();
    formatter.render(report, names, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}
