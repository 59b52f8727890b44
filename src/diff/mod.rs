//! Diff engine for comparing datasets

pub mod cell_diff;
mod row_diff;
mod schema_diff;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ComparisonOptions;
use crate::error::{CompareError, Result, Side};
use crate::model::{CellValue, Dataset, KeySpec, Row};

pub use cell_diff::CellComparator;
pub use row_diff::{RowMatcher, RowPairing};
pub use schema_diff::{SchemaChange, SchemaDiff};

/// A single compared cell of a matched row pair.
///
/// A side is `None` when the column exists in the other file only.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDiff {
    /// Column name
    pub column: String,
    /// Old value
    pub old_value: Option<CellValue>,
    /// New value
    pub new_value: Option<CellValue>,
    /// Whether the values differ under the active options
    pub differs: bool,
}

impl CellDiff {
    /// Old value as source text; absent values render empty
    pub fn old_display(&self) -> String {
        self.old_value
            .as_ref()
            .map(|v| v.display().into_owned())
            .unwrap_or_default()
    }

    /// New value as source text; absent values render empty
    pub fn new_display(&self) -> String {
        self.new_value
            .as_ref()
            .map(|v| v.display().into_owned())
            .unwrap_or_default()
    }
}

/// Outcome of aligning one row
#[derive(Debug, Clone)]
pub enum RowMatch {
    /// Row present in both files; `changes` is empty when nothing differs
    Matched {
        key: String,
        old_row: Row,
        new_row: Row,
        changes: Vec<CellDiff>,
    },
    /// Row only in the old file
    Removed { key: String, row: Row },
    /// Row only in the new file
    Added { key: String, row: Row },
}

impl RowMatch {
    /// Get the key for this match
    pub fn key(&self) -> &str {
        match self {
            RowMatch::Matched { key, .. } => key,
            RowMatch::Removed { key, .. } => key,
            RowMatch::Added { key, .. } => key,
        }
    }

    pub fn is_changed(&self) -> bool {
        match self {
            RowMatch::Matched { changes, .. } => !changes.is_empty(),
            _ => true,
        }
    }
}

/// Statistics about the diff
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub rows_added: usize,
    pub rows_removed: usize,
    pub rows_changed: usize,
    pub rows_unchanged: usize,
    pub cells_changed: usize,
    pub cells_unchanged: usize,
    pub old_row_count: usize,
    pub new_row_count: usize,
}

impl DiffStats {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.rows_added > 0 || self.rows_removed > 0 || self.rows_changed > 0
    }

    /// Rows present in both files
    pub fn rows_matched(&self) -> usize {
        self.rows_changed + self.rows_unchanged
    }
}

/// Result of comparing two datasets
#[derive(Debug, Clone)]
pub struct DiffReport {
    /// Columns of the old file, in file order
    pub old_columns: Vec<String>,
    /// Columns of the new file, in file order
    pub new_columns: Vec<String>,
    /// Key columns used for matching; empty when rows were matched by content
    pub key_columns: Vec<String>,
    /// Options the comparison ran with
    pub options: ComparisonOptions,
    /// Schema changes between datasets
    pub schema_changes: Vec<SchemaChange>,
    /// One entry per aligned row
    pub matches: Vec<RowMatch>,
    /// Statistics
    pub stats: DiffStats,
}

impl DiffReport {
    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        !self.schema_changes.is_empty() || self.stats.has_changes()
    }

    /// How rows were aligned, for display
    pub fn match_mode(&self) -> String {
        if self.key_columns.is_empty() {
            "full-row hash".to_string()
        } else {
            format!("key columns: {}", self.key_columns.join(", "))
        }
    }

    /// Get only added rows
    pub fn added_rows(&self) -> impl Iterator<Item = &Row> {
        self.matches.iter().filter_map(|m| match m {
            RowMatch::Added { row, .. } => Some(row),
            _ => None,
        })
    }

    /// Get only removed rows
    pub fn removed_rows(&self) -> impl Iterator<Item = &Row> {
        self.matches.iter().filter_map(|m| match m {
            RowMatch::Removed { row, .. } => Some(row),
            _ => None,
        })
    }

    /// Get matched rows that have at least one differing cell
    pub fn changed_rows(&self) -> impl Iterator<Item = (&str, &Row, &Row, &[CellDiff])> {
        self.matches.iter().filter_map(|m| match m {
            RowMatch::Matched {
                key,
                old_row,
                new_row,
                changes,
            } if !changes.is_empty() => {
                Some((key.as_str(), old_row, new_row, changes.as_slice()))
            }
            _ => None,
        })
    }
}

/// Where a compared column lives in each dataset
#[derive(Debug)]
struct ColumnPlan {
    name: String,
    old_index: Option<usize>,
    new_index: Option<usize>,
}

/// Main diff engine
pub struct DiffEngine {
    options: ComparisonOptions,
    cell_comparator: CellComparator,
}

impl DiffEngine {
    /// Create a new diff engine with options
    pub fn new(options: ComparisonOptions) -> Self {
        let cell_comparator = CellComparator::from_options(&options);
        Self {
            options,
            cell_comparator,
        }
    }

    /// Compare two datasets
    pub fn diff(&self, old: &Dataset, new: &Dataset, keys: &KeySpec) -> Result<DiffReport> {
        self.check_inputs(old, new)?;

        let matcher = RowMatcher::new(self.cell_comparator);
        let pairings = if keys.is_empty() {
            let mut columns: Vec<String> = SchemaDiff::shared_columns(old, new)
                .into_iter()
                .filter(|c| !self.options.is_ignored(c))
                .collect();
            columns.sort();
            if columns.is_empty() && !old.is_empty() && !new.is_empty() {
                warn!("every shared column is ignored; rows will pair in file order");
            }
            debug!(columns = ?columns, "matching rows by content hash");
            matcher.match_by_content(old, new, &columns)
        } else {
            debug!(keys = ?keys.columns(), "matching rows by key columns");
            matcher.match_by_key(old, new, keys)?
        };

        let plan = self.column_plan(old, new);
        let mut report = DiffReport {
            old_columns: old.column_names(),
            new_columns: new.column_names(),
            key_columns: keys.columns().to_vec(),
            options: self.options.clone(),
            schema_changes: SchemaDiff::compare(old, new),
            matches: Vec::with_capacity(pairings.len()),
            stats: DiffStats {
                old_row_count: old.row_count(),
                new_row_count: new.row_count(),
                ..DiffStats::default()
            },
        };

        for pairing in pairings {
            let RowPairing { key, old: old_idx, new: new_idx } = pairing;
            let row_match = match (old_idx, new_idx) {
                (Some(o), Some(n)) => {
                    let (old_row, new_row) = (&old.rows[o], &new.rows[n]);
                    let changes = self.compare_row_cells(old_row, new_row, &plan);
                    let changed = changes.len();
                    report.stats.cells_changed += changed;
                    report.stats.cells_unchanged += plan.len() - changed;
                    if changes.is_empty() {
                        report.stats.rows_unchanged += 1;
                    } else {
                        report.stats.rows_changed += 1;
                    }
                    RowMatch::Matched {
                        key,
                        old_row: old_row.clone(),
                        new_row: new_row.clone(),
                        changes,
                    }
                }
                (Some(o), None) => {
                    report.stats.rows_removed += 1;
                    RowMatch::Removed {
                        key,
                        row: old.rows[o].clone(),
                    }
                }
                (None, Some(n)) => {
                    report.stats.rows_added += 1;
                    RowMatch::Added {
                        key,
                        row: new.rows[n].clone(),
                    }
                }
                (None, None) => unreachable!(),
            };
            report.matches.push(row_match);
        }

        let stats = &report.stats;
        debug_assert_eq!(stats.rows_matched() + stats.rows_removed, stats.old_row_count);
        debug_assert_eq!(stats.rows_matched() + stats.rows_added, stats.new_row_count);
        info!(
            added = stats.rows_added,
            removed = stats.rows_removed,
            changed = stats.rows_changed,
            unchanged = stats.rows_unchanged,
            cells_changed = stats.cells_changed,
            "comparison complete"
        );

        Ok(report)
    }

    /// Reject inputs that cannot be compared
    fn check_inputs(&self, old: &Dataset, new: &Dataset) -> Result<()> {
        for (dataset, side) in [(old, Side::Old), (new, Side::New)] {
            if dataset.is_empty() {
                if self.options.fail_on_empty {
                    return Err(CompareError::EmptyDataset { side });
                }
                warn!(%side, "file has no data rows; every row of the other file is unmatched");
            }
        }

        if !old.is_empty()
            && !new.is_empty()
            && SchemaDiff::shared_columns(old, new).is_empty()
        {
            return Err(CompareError::SchemaMismatch {
                old_columns: old.column_names(),
                new_columns: new.column_names(),
            });
        }

        Ok(())
    }

    /// Columns compared for matched rows: old-file order, then new-only columns
    fn column_plan(&self, old: &Dataset, new: &Dataset) -> Vec<ColumnPlan> {
        let mut plan: Vec<ColumnPlan> = old
            .columns
            .iter()
            .map(|c| ColumnPlan {
                name: c.name.clone(),
                old_index: Some(c.index),
                new_index: new.column_index(&c.name),
            })
            .collect();
        plan.extend(
            new.columns
                .iter()
                .filter(|c| old.column(&c.name).is_none())
                .map(|c| ColumnPlan {
                    name: c.name.clone(),
                    old_index: None,
                    new_index: Some(c.index),
                }),
        );
        plan.retain(|c| !self.options.is_ignored(&c.name));
        plan
    }

    /// Compare cells between two rows, keeping only the differing ones
    fn compare_row_cells(&self, old_row: &Row, new_row: &Row, plan: &[ColumnPlan]) -> Vec<CellDiff> {
        plan.iter()
            .map(|column| {
                let old_value = column.old_index.map(|i| cell_or_null(old_row, i));
                let new_value = column.new_index.map(|i| cell_or_null(new_row, i));
                let differs = match (&old_value, &new_value) {
                    (Some(a), Some(b)) => !self.cell_comparator.equal(a, b),
                    _ => true,
                };
                CellDiff {
                    column: column.name.clone(),
                    old_value,
                    new_value,
                    differs,
                }
            })
            .filter(|cell| cell.differs)
            .collect()
    }
}

fn cell_or_null(row: &Row, index: usize) -> CellValue {
    row.get(index).cloned().unwrap_or(CellValue::Null)
}

/// Convenience function to compare two datasets
pub fn compare(
    old: &Dataset,
    new: &Dataset,
    keys: &KeySpec,
    options: &ComparisonOptions,
) -> Result<DiffReport> {
    DiffEngine::new(options.clone()).diff(old, new, keys)
}
