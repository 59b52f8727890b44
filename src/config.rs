//! Configuration handling for eureka

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Output format for diff results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Xlsx,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Options that change how values are matched and compared
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOptions {
    /// Require decimals to match textually (`1.50` != `1.5`)
    pub strict_decimal: bool,
    /// Ignore case when comparing string values
    pub ignore_case: bool,
    /// Ignore leading/trailing whitespace in string values
    pub trim_whitespace: bool,
    /// Columns excluded from row hashing and cell comparison
    pub ignore_columns: Vec<String>,
    /// Fail instead of reporting every row as added/removed when an input is empty
    pub fail_on_empty: bool,
}

impl ComparisonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_decimal(mut self, strict: bool) -> Self {
        self.strict_decimal = strict;
        self
    }

    pub fn with_ignore_case(mut self, ignore: bool) -> Self {
        self.ignore_case = ignore;
        self
    }

    pub fn with_trim_whitespace(mut self, trim: bool) -> Self {
        self.trim_whitespace = trim;
        self
    }

    pub fn with_ignore_columns(mut self, columns: Vec<String>) -> Self {
        self.ignore_columns = columns;
        self
    }

    pub fn with_fail_on_empty(mut self, fail: bool) -> Self {
        self.fail_on_empty = fail;
        self
    }

    /// Check whether a column takes part in the comparison
    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignore_columns.iter().any(|c| c == column)
    }
}

/// Configuration for a comparison run
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the old/source file
    pub old_file: PathBuf,
    /// Path to the new/target file
    pub new_file: PathBuf,
    /// Columns to use as key for row matching
    pub key_columns: Vec<String>,
    /// Output format
    pub output_format: OutputFormat,
    /// Where to save the Excel report, if anywhere
    pub report_path: Option<PathBuf>,
    /// Value comparison options
    pub options: ComparisonOptions,
    /// Drop trailing rows that contain only blank fields
    pub drop_blank_rows: bool,
    /// Only show statistics, not detailed changes
    pub stats_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            old_file: PathBuf::new(),
            new_file: PathBuf::new(),
            key_columns: Vec::new(),
            output_format: OutputFormat::default(),
            report_path: None,
            options: ComparisonOptions::default(),
            drop_blank_rows: true,
            stats_only: false,
        }
    }
}

impl Config {
    /// Create a new Config with file paths
    pub fn new(old_file: PathBuf, new_file: PathBuf) -> Self {
        Self {
            old_file,
            new_file,
            ..Default::default()
        }
    }

    /// Set key columns for row matching
    pub fn with_key_columns(mut self, keys: Vec<String>) -> Self {
        self.key_columns = keys;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Save the Excel report to a path
    pub fn with_report_path(mut self, path: PathBuf) -> Self {
        self.report_path = Some(path);
        self
    }

    /// Set comparison options
    pub fn with_options(mut self, options: ComparisonOptions) -> Self {
        self.options = options;
        self
    }

    /// Keep or drop trailing blank rows
    pub fn with_drop_blank_rows(mut self, drop: bool) -> Self {
        self.drop_blank_rows = drop;
        self
    }

    /// Enable stats-only mode
    pub fn with_stats_only(mut self, stats_only: bool) -> Self {
        self.stats_only = stats_only;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("XLSX".parse::<OutputFormat>(), Ok(OutputFormat::Xlsx));
        assert!("html".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_defaults_follow_lenient_comparison() {
        let config = Config::default();
        assert!(!config.options.strict_decimal);
        assert!(!config.options.ignore_case);
        assert!(config.drop_blank_rows);
    }
}
