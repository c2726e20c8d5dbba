//! Schema diff engine
//!
//! Compares a loaded table with its edited copy. Columns are matched through
//! their `original_name` tag, never by name, so a rename is told apart from a
//! drop followed by an add.

use std::collections::HashSet;

use rowsmith_core::{
    ColumnDefinition, ForeignKeyDefinition, SchemaDiff, TableDefinition, column_name_problem,
};

use crate::DiffConflict;

/// Stateless diff and conflict computation
pub struct SchemaDiffEngine;

impl SchemaDiffEngine {
    /// Compute the operations that turn `original` into `edited`.
    ///
    /// Swapped or chained renames are reported as given; see
    /// [`detect_conflicts`](Self::detect_conflicts).
    pub fn diff(original: &TableDefinition, edited: &TableDefinition) -> SchemaDiff {
        let mut diff = SchemaDiff::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for column in &edited.columns {
            let base = column
                .original_name
                .as_deref()
                .and_then(|name| original.column(name))
                .filter(|base| seen.insert(base.name.as_str()));

            match base {
                Some(base) => {
                    if base.name != column.name {
                        diff.rename_columns
                            .insert(base.name.clone(), column.name.clone());
                    }
                    if base.attributes_differ(column) {
                        diff.alter_columns.push(normalize_column(column));
                    }
                }
                None => diff.add_columns.push(normalize_column(column)),
            }
        }

        for column in &original.columns {
            if !seen.contains(column.name.as_str()) {
                diff.drop_columns.push(column.name.clone());
            }
        }

        let (add_foreign_keys, drop_foreign_keys) =
            Self::diff_foreign_keys(original, edited, &diff);
        diff.add_foreign_keys = add_foreign_keys;
        diff.drop_foreign_keys = drop_foreign_keys;

        tracing::debug!(
            table = %edited.name,
            add_columns = diff.add_columns.len(),
            drop_columns = diff.drop_columns.len(),
            rename_columns = diff.rename_columns.len(),
            alter_columns = diff.alter_columns.len(),
            add_foreign_keys = diff.add_foreign_keys.len(),
            drop_foreign_keys = diff.drop_foreign_keys.len(),
            "computed schema diff"
        );

        diff
    }

    /// Foreign keys are matched by local column after mapping original
    /// column names through the renames. A changed target or action on the
    /// same column is a drop of the old key plus an add of the new one.
    fn diff_foreign_keys(
        original: &TableDefinition,
        edited: &TableDefinition,
        diff: &SchemaDiff,
    ) -> (Vec<ForeignKeyDefinition>, Vec<ForeignKeyDefinition>) {
        let renamed = |name: &str| -> String {
            diff.rename_columns
                .get(name)
                .cloned()
                .unwrap_or_else(|| name.to_string())
        };

        let drops = original
            .foreign_keys
            .iter()
            .filter(|fk| {
                let column = renamed(&fk.column_name);
                !edited
                    .foreign_keys
                    .iter()
                    .any(|e| e.column_name == column && e.same_reference(fk))
            })
            .cloned()
            .collect();

        let adds = edited
            .foreign_keys
            .iter()
            .filter(|fk| {
                !original
                    .foreign_keys
                    .iter()
                    .any(|o| renamed(&o.column_name) == fk.column_name && o.same_reference(fk))
            })
            .cloned()
            .collect();

        (adds, drops)
    }

    /// Problems that must be fixed before `edited` is submitted
    pub fn detect_conflicts(
        original: &TableDefinition,
        edited: &TableDefinition,
    ) -> Vec<DiffConflict> {
        let diff = Self::diff(original, edited);
        let mut conflicts = Vec::new();

        if edited.name.trim().is_empty() {
            conflicts.push(DiffConflict::EmptyTableName);
        }
        if edited.columns.is_empty() {
            conflicts.push(DiffConflict::NoColumns);
        }

        let mut names = HashSet::new();
        for column in &edited.columns {
            if let Some(reason) = column_name_problem(&column.name) {
                conflicts.push(DiffConflict::InvalidColumnName {
                    name: column.name.clone(),
                    reason: reason.to_string(),
                });
            }
            if !column.name.is_empty() && !names.insert(column.name.to_lowercase()) {
                conflicts.push(DiffConflict::DuplicateColumn(column.name.clone()));
            }
        }

        for (from, to) in &diff.rename_columns {
            if original.column(to).is_some() {
                conflicts.push(DiffConflict::RenameCollision {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }

        for column in original.columns.iter().filter(|c| c.is_system()) {
            let modified = diff.drop_columns.contains(&column.name)
                || diff.rename_columns.contains_key(&column.name)
                || diff.alter_columns.iter().any(|altered| {
                    edited.columns.iter().any(|e| {
                        e.name == altered.name
                            && e.original_name.as_deref() == Some(column.name.as_str())
                    })
                });
            if modified {
                conflicts.push(DiffConflict::SystemColumnModified(column.name.clone()));
            }
        }

        for fk in &edited.foreign_keys {
            if edited.column(&fk.column_name).is_none() {
                if diff.drop_columns.contains(&fk.column_name) {
                    conflicts.push(DiffConflict::ForeignKeyOnDroppedColumn(fk.column_name.clone()));
                } else {
                    conflicts.push(DiffConflict::ForeignKeyOnMissingColumn(fk.column_name.clone()));
                }
            }
            if fk.reference_table == edited.name && edited.column(&fk.reference_column).is_none() {
                conflicts.push(DiffConflict::SelfReferenceToDroppedColumn {
                    column: fk.column_name.clone(),
                    reference_column: fk.reference_column.clone(),
                });
            }
        }

        if !conflicts.is_empty() {
            tracing::warn!(table = %edited.name, conflicts = conflicts.len(), "schema edit has conflicts");
        }
        conflicts
    }
}

/// Column as sent to the service: no session tag, empty default unset
fn normalize_column(column: &ColumnDefinition) -> ColumnDefinition {
    let mut column = column.clone();
    column.original_name = None;
    if column.default_value.as_deref() == Some("") {
        column.default_value = None;
    }
    column
}

#[cfg(test)]
mod tests;
