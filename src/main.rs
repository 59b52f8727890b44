//! eureka - compare two CSV files and export an Excel report

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use termcolor::ColorChoice;
use tracing::Level;

use eureka::config::{ComparisonOptions, Config, OutputFormat};
use eureka::diff::DiffEngine;
use eureka::error::Side;
use eureka::model::KeySpec;
use eureka::output::{render_to_stdout, InputNames, OutputFormatter, TerminalOutput, XlsxOutput};
use eureka::parser::{CsvParser, Parser as _};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
    Xlsx,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Xlsx => OutputFormat::Xlsx,
        }
    }
}

/// Compare two CSV files and export a multi-sheet Excel report
#[derive(Parser, Debug)]
#[command(name = "eureka")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Old/source CSV file
    old_file: PathBuf,

    /// New/target CSV file
    new_file: PathBuf,

    /// Column(s) used to align rows (comma-separated); full-row hash if omitted
    #[arg(short, long, value_delimiter = ',')]
    key: Vec<String>,

    /// Require decimals to match exactly (do not ignore trailing zeros)
    #[arg(long)]
    strict_decimal: bool,

    /// Ignore case when comparing string values
    #[arg(long)]
    ignore_case: bool,

    /// Ignore leading/trailing whitespace in string values
    #[arg(long)]
    trim_whitespace: bool,

    /// Column(s) to ignore in comparison (comma-separated)
    #[arg(long, value_delimiter = ',')]
    ignore_column: Vec<String>,

    /// Keep trailing rows that contain only blank fields
    #[arg(long)]
    keep_blank_rows: bool,

    /// Fail when either file has no data rows
    #[arg(long)]
    fail_on_empty: bool,

    /// Write the Excel report to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Only show statistics, not detailed changes
    #[arg(long)]
    stats_only: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(has_changes) => {
            if has_changes {
                ExitCode::from(1) // Differences found
            } else {
                ExitCode::SUCCESS // No differences
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let options = ComparisonOptions::new()
        .with_strict_decimal(cli.strict_decimal)
        .with_ignore_case(cli.ignore_case)
        .with_trim_whitespace(cli.trim_whitespace)
        .with_ignore_columns(cli.ignore_column)
        .with_fail_on_empty(cli.fail_on_empty);

    let mut config = Config::new(cli.old_file, cli.new_file)
        .with_key_columns(cli.key)
        .with_output_format(cli.format.into())
        .with_options(options)
        .with_drop_blank_rows(!cli.keep_blank_rows)
        .with_stats_only(cli.stats_only);
    if let Some(path) = cli.output {
        config = config.with_report_path(path);
    }

    // Parse files
    let parser = CsvParser::new(config.drop_blank_rows);
    let old = parser
        .parse_path(&config.old_file, Side::Old)
        .with_context(|| format!("Failed to parse old file: {}", config.old_file.display()))?;
    let new = parser
        .parse_path(&config.new_file, Side::New)
        .with_context(|| format!("Failed to parse new file: {}", config.new_file.display()))?;

    // Compute diff
    let keys = KeySpec::new(&config.key_columns);
    let report = DiffEngine::new(config.options.clone()).diff(&old, &new, &keys)?;
    let names = InputNames::new(
        config.old_file.display().to_string(),
        config.new_file.display().to_string(),
    );

    if let Some(ref path) = config.report_path {
        let bytes = XlsxOutput::new().to_bytes(&report, &names)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        tracing::info!(path = %path.display(), "report saved");
    }

    // Handle stats-only mode
    if config.stats_only {
        let stats = &report.stats;
        println!("Old file: {} ({} rows)", names.old, stats.old_row_count);
        println!("New file: {} ({} rows)", names.new, stats.new_row_count);
        println!();
        println!("Added:     {}", stats.rows_added);
        println!("Removed:   {}", stats.rows_removed);
        println!("Changed:   {}", stats.rows_changed);
        println!("Unchanged: {}", stats.rows_unchanged);
        println!("Cells changed: {}", stats.cells_changed);
        return Ok(report.has_changes());
    }

    // Render output
    match config.output_format {
        OutputFormat::Terminal => {
            let choice = if std::io::stdout().is_terminal() {
                ColorChoice::Always
            } else {
                ColorChoice::Never
            };
            let mut stdout = std::io::stdout().lock();
            TerminalOutput::with_color_choice(choice).render(&report, &names, &mut stdout)?;
            stdout.flush()?;
        }
        OutputFormat::Xlsx if config.report_path.is_some() => {}
        format => render_to_stdout(&report, &names, format)?,
    }

    Ok(report.has_changes())
}
