//! Parser layer for reading uploaded tabular files

mod csv;

use std::io::Read;
use std::path::Path;

use crate::error::{CompareError, Result, Side};
use crate::model::Dataset;

pub use self::csv::CsvParser;

/// Trait for parsing tabular data into a Dataset
pub trait Parser: Send + Sync {
    /// Parse a byte stream; `side` names the input in error messages
    fn parse_reader(&self, reader: &mut dyn Read, side: Side) -> Result<Dataset>;

    /// Parse a file from disk
    fn parse_path(&self, path: &Path, side: Side) -> Result<Dataset> {
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes, side)
    }

    /// Parse an in-memory upload
    fn parse_bytes(&self, bytes: &[u8], side: Side) -> Result<Dataset> {
        reject_binary(bytes, side)?;
        let mut reader = bytes;
        self.parse_reader(&mut reader, side)
    }
}

/// Reject uploads that are clearly not CSV text
fn reject_binary(bytes: &[u8], side: Side) -> Result<()> {
    let detected = detect_format(bytes);
    if detected == "csv" {
        return Ok(());
    }
    Err(CompareError::MalformedInput {
        side,
        line: 1,
        message: format!("expected a CSV file but the content looks like {}", detected),
    })
}

/// Detect file format from leading magic bytes
pub fn detect_format(bytes: &[u8]) -> &'static str {
    if bytes.len() < 4 {
        return "csv";
    }

    // Excel ZIP format (xlsx)
    if &bytes[0..4] == b"PK\x03\x04" {
        return "an xlsx workbook";
    }

    // Old Excel format (xls)
    if &bytes[0..4] == b"\xD0\xCF\x11\xE0" {
        return "an xls workbook";
    }

    if &bytes[0..4] == b"PAR1" {
        return "a parquet file";
    }

    "csv"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workbook_upload_is_rejected() {
        let parser = CsvParser::default();
        let err = parser
            .parse_bytes(b"PK\x03\x04rest-of-zip", Side::New)
            .unwrap_err();
        assert!(err.to_string().contains("xlsx workbook"));
        assert!(matches!(err, CompareError::MalformedInput { side: Side::New, .. }));
    }

    #[test]
    fn test_workbook_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.csv");
        std::fs::write(&path, b"\xD0\xCF\x11\xE0legacy-workbook").unwrap();

        let err = CsvParser::default().parse_path(&path, Side::Old).unwrap_err();
        assert!(err.to_string().contains("xls workbook"));
        assert!(matches!(err, CompareError::MalformedInput { side: Side::Old, line: 1, .. }));
    }
}
