//! Request-scoped comparison: CSV uploads in, Excel report out

use tracing::info;

use crate::config::ComparisonOptions;
use crate::diff::{DiffEngine, DiffReport};
use crate::error::{Result, Side};
use crate::model::KeySpec;
use crate::output::{InputNames, XlsxOutput};
use crate::parser::{CsvParser, Parser};

/// Suggested name for the downloaded workbook
pub const REPORT_FILE_NAME: &str = "EUREKA_Report.xlsx";

/// MIME type of the downloaded workbook
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One comparison as submitted by a user.
///
/// The request owns copies of both uploads, so nothing is shared between
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub old_csv: Vec<u8>,
    pub new_csv: Vec<u8>,
    pub names: InputNames,
    pub keys: KeySpec,
    pub options: ComparisonOptions,
    pub drop_blank_rows: bool,
}

/// The finished report, ready to hand back to the user
#[derive(Debug, Clone)]
pub struct ReportDownload {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub report: DiffReport,
}

impl ComparisonRequest {
    pub fn new(old_csv: impl Into<Vec<u8>>, new_csv: impl Into<Vec<u8>>) -> Self {
        Self {
            old_csv: old_csv.into(),
            new_csv: new_csv.into(),
            names: InputNames::default(),
            keys: KeySpec::none(),
            options: ComparisonOptions::default(),
            drop_blank_rows: true,
        }
    }

    pub fn with_names(mut self, names: InputNames) -> Self {
        self.names = names;
        self
    }

    pub fn with_keys(mut self, keys: KeySpec) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_options(mut self, options: ComparisonOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_drop_blank_rows(mut self, drop: bool) -> Self {
        self.drop_blank_rows = drop;
        self
    }

    /// Parse both uploads, compare them and render the workbook
    pub fn execute(&self) -> Result<ReportDownload> {
        let parser = CsvParser::new(self.drop_blank_rows);
        let old = parser.parse_bytes(&self.old_csv, Side::Old)?;
        let new = parser.parse_bytes(&self.new_csv, Side::New)?;

        let report = DiffEngine::new(self.options.clone()).diff(&old, &new, &self.keys)?;
        let bytes = XlsxOutput::new().to_bytes(&report, &self.names)?;
        info!(
            old = %self.names.old,
            new = %self.names.new,
            bytes = bytes.len(),
            "report ready"
        );

        Ok(ReportDownload {
            file_name: REPORT_FILE_NAME.to_string(),
            content_type: XLSX_MIME_TYPE,
            bytes,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompareError;

    #[test]
    fn test_execute_produces_workbook() {
        let download = ComparisonRequest::new("id,val\n1,x\n", "id,val\n1,y\n")
            .with_keys(KeySpec::parse("id"))
            .execute()
            .unwrap();

        assert_eq!(download.file_name, "EUREKA_Report.xlsx");
        assert!(download.bytes.starts_with(b"PK\x03\x04"));
        assert_eq!(download.report.stats.rows_changed, 1);
    }

    #[test]
    fn test_errors_name_the_failing_upload() {
        let err = ComparisonRequest::new("id\n1\n", "id,id\n1,1\n")
            .execute()
            .unwrap_err();
        assert!(matches!(err, CompareError::MalformedInput { side: Side::New, .. }));
    }
}
