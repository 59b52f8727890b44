//! eureka - CSV comparison with Excel integrity reports
//!
//! Compares two CSV files, aligning rows by key columns or by full-row
//! content, and renders the differences as a multi-sheet `.xlsx` workbook.

pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod request;

pub use config::{ComparisonOptions, Config};
pub use diff::{compare, CellDiff, DiffReport, RowMatch};
pub use error::{CompareError, Result, Side};
pub use model::{Dataset, KeySpec};
pub use request::{ComparisonRequest, ReportDownload};
