//! Dataset, Row, and Cell data structures

use std::borrow::Cow;

use rust_decimal::Decimal;

use super::schema::{CellType, Column};

/// A cell value with type information
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Int(i64),
    /// Decimal literal; the scale is kept so `1.50` still displays as `1.50`
    Decimal(Decimal),
    String(Cow<'static, str>),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Decimal(a), CellValue::Decimal(b)) => a == b,
            (CellValue::String(a), CellValue::String(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Decimal(b)) => Decimal::from(*a) == *b,
            (CellValue::Decimal(a), CellValue::Int(b)) => *a == Decimal::from(*b),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl CellValue {
    /// Parse a raw CSV field.
    ///
    /// Only plain numeric literals become numbers: an optional `-`, an integer
    /// part without leading zeros and an optional fraction. Everything else,
    /// including identifiers such as `007`, padded numbers such as ` 1.50`
    /// and negative zero, is kept verbatim as a string. Decimals that do not
    /// fit exactly are kept as strings too, so no value is ever rounded.
    pub fn parse(raw: &str) -> CellValue {
        if raw.is_empty() {
            return CellValue::Null;
        }

        if is_numeric_literal(raw) && !is_negative_zero(raw) {
            if !raw.contains('.') {
                if let Ok(i) = raw.parse::<i64>() {
                    return CellValue::Int(i);
                }
            }
            if let Ok(d) = Decimal::from_str_exact(raw) {
                return CellValue::Decimal(d);
            }
        }

        CellValue::String(Cow::Owned(raw.to_string()))
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Decimal(_))
    }

    /// Check if the field is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Type of this value for column inference
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Null => CellType::Null,
            CellValue::Int(_) => CellType::Int,
            CellValue::Decimal(_) => CellType::Decimal,
            CellValue::String(_) => CellType::String,
        }
    }

    /// The value as it appeared in the source file
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Decimal(d) => Cow::Owned(d.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
        }
    }
}

fn is_negative_zero(s: &str) -> bool {
    s.strip_prefix('-')
        .is_some_and(|digits| digits.bytes().all(|b| b == b'0' || b == b'.'))
}

fn is_numeric_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return false;
    }
    match frac_part {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<Decimal> for CellValue {
    fn from(d: Decimal) -> Self {
        CellValue::Decimal(d)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the dataset
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line number in source file (1-indexed, header is line 1)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }

    /// Check if every field in the row is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

/// One loaded input file: columns plus rows in file order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the dataset
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Create a new empty dataset with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a dataset from a header and raw string records.
    ///
    /// Line numbers are assigned as if the records came from a CSV file with
    /// a header on line 1.
    pub fn from_records(headers: &[&str], records: &[&[&str]]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(*name, i))
            .collect();
        let mut dataset = Dataset::new(columns);
        for (i, record) in records.iter().enumerate() {
            let cells = record.iter().map(|s| CellValue::parse(s)).collect();
            dataset.add_row(cells, i + 2);
        }
        dataset.infer_column_types();
        dataset
    }

    /// Add a row, padding with nulls to the column count
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) {
        if cells.len() < self.columns.len() {
            cells.resize(self.columns.len(), CellValue::Null);
        }
        self.rows.push(Row::new(cells, source_line));
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a cell by row position and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col_idx = self.column_index(column)?;
        self.rows.get(row)?.get(col_idx)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove rows at the end of the dataset whose fields are all blank
    pub fn drop_trailing_blank_rows(&mut self) -> usize {
        let keep = self
            .rows
            .iter()
            .rposition(|row| !row.is_blank())
            .map_or(0, |idx| idx + 1);
        let dropped = self.rows.len() - keep;
        self.rows.truncate(keep);
        dropped
    }

    /// Infer column types from data
    pub fn infer_column_types(&mut self) {
        for (col_idx, column) in self.columns.iter_mut().enumerate() {
            column.inferred_type = self
                .rows
                .iter()
                .filter_map(|row| row.get(col_idx))
                .fold(CellType::Null, |acc, cell| acc.widen(cell.cell_type()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("42"), CellValue::Int(42));
        assert_eq!(CellValue::parse("-7"), CellValue::Int(-7));
        assert_eq!(
            CellValue::parse("3.14"),
            CellValue::Decimal(Decimal::new(314, 2))
        );
        assert_eq!(CellValue::parse("hello"), CellValue::from("hello"));
    }

    #[test]
    fn test_identifiers_stay_strings() {
        assert_eq!(CellValue::parse("007"), CellValue::from("007"));
        assert_eq!(CellValue::parse("1e5"), CellValue::from("1e5"));
        assert_eq!(CellValue::parse(".5"), CellValue::from(".5"));
        assert_eq!(CellValue::parse("5."), CellValue::from("5."));
        assert_eq!(CellValue::parse("null"), CellValue::from("null"));
    }

    #[test]
    fn test_strings_keep_whitespace() {
        assert_eq!(CellValue::parse("  x "), CellValue::from("  x "));
        assert_eq!(CellValue::parse("   ").display(), "   ");
    }

    #[test]
    fn test_decimal_display_keeps_scale() {
        assert_eq!(CellValue::parse("1.50").display(), "1.50");
        assert_eq!(CellValue::parse("2.0").display(), "2.0");
        assert_eq!(CellValue::parse("0.10").display(), "0.10");
    }

    #[test]
    fn test_padded_numbers_stay_strings() {
        assert_eq!(CellValue::parse(" 1.50"), CellValue::from(" 1.50"));
        assert_eq!(CellValue::parse("42 "), CellValue::from("42 "));
        assert_eq!(CellValue::parse(" 1.50").display(), " 1.50");
    }

    #[test]
    fn test_overlong_decimal_is_not_rounded() {
        let raw = "0.12345678901234567890123456789012";
        let value = CellValue::parse(raw);
        assert_eq!(value, CellValue::from(raw));
        assert_eq!(value.display(), raw);
        assert_ne!(value, CellValue::parse("0.12345678901234567890123456789099"));
    }

    #[test]
    fn test_negative_zero_keeps_its_sign() {
        assert_eq!(CellValue::parse("-0"), CellValue::from("-0"));
        assert_eq!(CellValue::parse("-0.00").display(), "-0.00");
        assert_eq!(CellValue::parse("0"), CellValue::Int(0));
        assert_eq!(CellValue::parse("-0.5"), CellValue::Decimal("-0.5".parse().unwrap()));
    }

    #[test]
    fn test_large_integer_falls_back_to_decimal() {
        let value = CellValue::parse("92233720368547758070");
        assert!(matches!(value, CellValue::Decimal(_)));
        assert_eq!(value.display(), "92233720368547758070");
    }

    #[test]
    fn test_drop_trailing_blank_rows() {
        let mut dataset = Dataset::from_records(
            &["a", "b"],
            &[&["1", "x"], &["", ""], &["2", "y"], &["", " "], &["", ""]],
        );
        assert_eq!(dataset.drop_trailing_blank_rows(), 2);
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.rows[2].source_line, 4);
    }

    #[test]
    fn test_infer_column_types() {
        let dataset = Dataset::from_records(
            &["id", "amount", "name", "note"],
            &[&["1", "2", "a", ""], &["2", "2.50", "3", ""]],
        );
        assert_eq!(dataset.column("id").unwrap().inferred_type, CellType::Int);
        assert_eq!(
            dataset.column("amount").unwrap().inferred_type,
            CellType::Decimal
        );
        assert_eq!(dataset.column("name").unwrap().inferred_type, CellType::Mixed);
        assert_eq!(dataset.column("note").unwrap().inferred_type, CellType::Null);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let dataset = Dataset::from_records(&["a", "b", "c"], &[&["1"]]);
        assert_eq!(dataset.rows[0].cells.len(), 3);
        assert_eq!(dataset.value(0, "c"), Some(&CellValue::Null));
    }
}
