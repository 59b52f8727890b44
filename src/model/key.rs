//! Key column handling

use crate::error::{CompareError, Result, Side};

use super::dataset::Dataset;

/// Columns used to align rows between two datasets.
///
/// An empty spec means rows are aligned by a hash of their full content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpec {
    columns: Vec<String>,
}

impl KeySpec {
    /// Create a key spec from column names.
    ///
    /// Names are trimmed, blank names dropped and repeats collapsed.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        }
        Self { columns }
    }

    /// Match by full-row content instead of key columns
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `"id, region"`
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve the key columns to indices in a dataset
    pub fn resolve(&self, dataset: &Dataset, side: Side) -> Result<Vec<usize>> {
        self.columns
            .iter()
            .map(|name| {
                dataset
                    .column_index(name)
                    .ok_or_else(|| CompareError::MissingKeyColumn {
                        side,
                        column: name.clone(),
                    })
            })
            .collect()
    }
}
