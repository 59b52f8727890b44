//! Row matching algorithm

use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};
use tracing::debug;

use crate::error::{CompareError, Result, Side};
use crate::model::{Dataset, KeySpec};

use super::cell_diff::CellComparator;

const KEY_SEPARATOR: &str = "|";

/// Alignment of one row of either dataset.
///
/// Indices refer to `Dataset::rows`. At least one side is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPairing {
    pub key: String,
    pub old: Option<usize>,
    pub new: Option<usize>,
}

/// Row matcher using hash-based lookup
pub struct RowMatcher {
    comparator: CellComparator,
}

impl RowMatcher {
    /// Create a new row matcher
    pub fn new(comparator: CellComparator) -> Self {
        Self { comparator }
    }

    /// Match rows by the values of the key columns.
    ///
    /// Old rows come first in file order, followed by new rows without a
    /// counterpart.
    pub fn match_by_key(
        &self,
        old: &Dataset,
        new: &Dataset,
        keys: &KeySpec,
    ) -> Result<Vec<RowPairing>> {
        let old_indices = keys.resolve(old, Side::Old)?;
        let new_indices = keys.resolve(new, Side::New)?;

        let old_keys = self.index_keys(old, &old_indices, Side::Old)?;
        let new_keys = self.index_keys(new, &new_indices, Side::New)?;
        debug!(
            old_keys = old_keys.len(),
            new_keys = new_keys.len(),
            "indexed key columns"
        );

        let mut pairings = Vec::with_capacity(old_keys.len() + new_keys.len());
        for (parts, &old_row) in &old_keys {
            pairings.push(RowPairing {
                key: parts.join(KEY_SEPARATOR),
                old: Some(old_row),
                new: new_keys.get(parts).copied(),
            });
        }
        for (parts, &new_row) in &new_keys {
            if !old_keys.contains_key(parts) {
                pairings.push(RowPairing {
                    key: parts.join(KEY_SEPARATOR),
                    old: None,
                    new: Some(new_row),
                });
            }
        }

        Ok(pairings)
    }

    /// Map each row's key to its position, rejecting repeated keys
    fn index_keys(
        &self,
        dataset: &Dataset,
        key_indices: &[usize],
        side: Side,
    ) -> Result<IndexMap<Vec<String>, usize>> {
        let mut index: IndexMap<Vec<String>, usize> = IndexMap::with_capacity(dataset.row_count());
        for (row_idx, row) in dataset.rows.iter().enumerate() {
            let parts = self.row_parts(dataset, row_idx, key_indices);
            match index.entry(parts) {
                Entry::Occupied(existing) => {
                    return Err(CompareError::DuplicateKey {
                        side,
                        key: existing.key().join(KEY_SEPARATOR),
                        first_line: dataset.rows[*existing.get()].source_line,
                        line: row.source_line,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(row_idx);
                }
            }
        }
        Ok(index)
    }

    /// Match rows by the content of the given columns.
    ///
    /// Identical rows pair up regardless of position. Repeated rows pair
    /// with repeats on the other side in order of appearance; any excess is
    /// left unmatched.
    pub fn match_by_content(
        &self,
        old: &Dataset,
        new: &Dataset,
        columns: &[String],
    ) -> Vec<RowPairing> {
        let old_indices = column_indices(old, columns);
        let new_indices = column_indices(new, columns);

        let mut buckets: FxHashMap<Vec<String>, VecDeque<usize>> = FxHashMap::default();
        for row_idx in 0..new.row_count() {
            let parts = self.row_parts(new, row_idx, &new_indices);
            buckets.entry(parts).or_default().push_back(row_idx);
        }

        let mut pairings = Vec::with_capacity(old.row_count() + new.row_count());
        let mut matched_new = vec![false; new.row_count()];
        for row_idx in 0..old.row_count() {
            let parts = self.row_parts(old, row_idx, &old_indices);
            let key = content_hash(&parts);
            let new_row = buckets.get_mut(&parts).and_then(VecDeque::pop_front);
            if let Some(new_idx) = new_row {
                matched_new[new_idx] = true;
            }
            pairings.push(RowPairing {
                key,
                old: Some(row_idx),
                new: new_row,
            });
        }

        for (row_idx, matched) in matched_new.iter().enumerate() {
            if !matched {
                let parts = self.row_parts(new, row_idx, &new_indices);
                pairings.push(RowPairing {
                    key: content_hash(&parts),
                    old: None,
                    new: Some(row_idx),
                });
            }
        }

        pairings
    }

    fn row_parts(&self, dataset: &Dataset, row_idx: usize, indices: &[usize]) -> Vec<String> {
        let row = &dataset.rows[row_idx];
        indices
            .iter()
            .map(|&i| {
                row.get(i)
                    .map(|cell| self.comparator.normalize(cell).into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

fn column_indices(dataset: &Dataset, columns: &[String]) -> Vec<usize> {
    columns
        .iter()
        .filter_map(|name| dataset.column_index(name))
        .collect()
}

/// Stable hash of a row's canonical values, rendered as hex
fn content_hash(parts: &[String]) -> String {
    let mut hasher = FxHasher::default();
    parts.hash(&mut hasher);
    format!("#{:016x}", hasher.finish())
}
