//! Schema comparison logic

use serde::{Deserialize, Serialize};

use crate::model::{CellType, Dataset};

/// Types of schema changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SchemaChange {
    /// Column exists only in the new file
    ColumnAdded { name: String, index: usize },
    /// Column exists only in the old file
    ColumnRemoved { name: String, index: usize },
    /// Column type changed
    ColumnTypeChanged {
        name: String,
        old_type: String,
        new_type: String,
    },
}

impl SchemaChange {
    pub fn column(&self) -> &str {
        match self {
            SchemaChange::ColumnAdded { name, .. }
            | SchemaChange::ColumnRemoved { name, .. }
            | SchemaChange::ColumnTypeChanged { name, .. } => name,
        }
    }

    /// Short label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaChange::ColumnAdded { .. } => "new in new file",
            SchemaChange::ColumnRemoved { .. } => "missing in new file",
            SchemaChange::ColumnTypeChanged { .. } => "type changed",
        }
    }
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::ColumnAdded { name, index } => {
                write!(f, "+ {} (new column at position {})", name, index)
            }
            SchemaChange::ColumnRemoved { name, index } => {
                write!(f, "- {} (removed from position {})", name, index)
            }
            SchemaChange::ColumnTypeChanged {
                name,
                old_type,
                new_type,
            } => {
                write!(f, "⚡ {} (type {} → {})", name, old_type, new_type)
            }
        }
    }
}

/// Schema comparison engine
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare schemas of two datasets
    pub fn compare(old: &Dataset, new: &Dataset) -> Vec<SchemaChange> {
        let mut changes = Vec::new();

        // Find removed columns
        for old_col in &old.columns {
            if new.column(&old_col.name).is_none() {
                changes.push(SchemaChange::ColumnRemoved {
                    name: old_col.name.clone(),
                    index: old_col.index,
                });
            }
        }

        // Find added columns
        for new_col in &new.columns {
            if old.column(&new_col.name).is_none() {
                changes.push(SchemaChange::ColumnAdded {
                    name: new_col.name.clone(),
                    index: new_col.index,
                });
            }
        }

        // Find type changes; an all-empty column carries no type information
        for old_col in &old.columns {
            if let Some(new_col) = new.column(&old_col.name) {
                let known = old_col.inferred_type != CellType::Null
                    && new_col.inferred_type != CellType::Null;
                if known && old_col.inferred_type != new_col.inferred_type {
                    changes.push(SchemaChange::ColumnTypeChanged {
                        name: old_col.name.clone(),
                        old_type: old_col.inferred_type.to_string(),
                        new_type: new_col.inferred_type.to_string(),
                    });
                }
            }
        }

        changes
    }

    /// Names of the columns present in both datasets, in old-file order
    pub fn shared_columns(old: &Dataset, new: &Dataset) -> Vec<String> {
        old.columns
            .iter()
            .filter(|c| new.column(&c.name).is_some())
            .map(|c| c.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_removed_and_type_changes() {
        let old = Dataset::from_records(&["id", "qty", "legacy"], &[&["1", "2", "x"]]);
        let new = Dataset::from_records(&["qty", "id", "region"], &[&["2.5", "1", "eu"]]);

        let changes = SchemaDiff::compare(&old, &new);
        assert_eq!(
            changes,
            vec![
                SchemaChange::ColumnRemoved { name: "legacy".into(), index: 2 },
                SchemaChange::ColumnAdded { name: "region".into(), index: 2 },
                SchemaChange::ColumnTypeChanged {
                    name: "qty".into(),
                    old_type: "int".into(),
                    new_type: "decimal".into(),
                },
            ]
        );
        assert_eq!(SchemaDiff::shared_columns(&old, &new), vec!["id", "qty"]);
    }
}
