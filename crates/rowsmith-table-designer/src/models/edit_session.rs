//! Edit session model
//!
//! Holds the loaded snapshot unmodified and a working copy that every edit
//! mutates. Each existing column in the working copy carries its loaded name
//! in `original_name`; new columns carry none.

use std::collections::HashSet;

use rowsmith_core::{
    ColumnDefinition, ColumnType, ForeignKeyDefinition, SchemaDiff, TableDefinition,
    catalog_entry, column_name_problem,
};

use super::{DesignError, DiffConflict};
use crate::SchemaDiffEngine;

/// Which parts of the table were edited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    /// Columns added, removed, renamed or altered
    pub columns: bool,
    /// Column order changed
    pub order: bool,
    pub foreign_keys: bool,
}

impl DirtyFlags {
    pub fn any(&self) -> bool {
        self.columns || self.order || self.foreign_keys
    }
}

/// In-memory edit of one table
#[derive(Debug, Clone)]
pub struct EditSession {
    original: TableDefinition,
    current: TableDefinition,
    dirty: DirtyFlags,
    is_new: bool,
}

impl EditSession {
    /// Start editing a loaded table
    pub fn new(original: TableDefinition) -> Self {
        let original = loaded(original);
        Self {
            current: tagged(&original),
            original,
            dirty: DirtyFlags::default(),
            is_new: false,
        }
    }

    /// Start designing a table that does not exist yet
    pub fn new_table(name: impl Into<String>) -> Self {
        let original = TableDefinition::new(name);
        Self {
            current: original.clone(),
            original,
            dirty: DirtyFlags::default(),
            is_new: true,
        }
    }

    pub fn original(&self) -> &TableDefinition {
        &self.original
    }

    pub fn current(&self) -> &TableDefinition {
        &self.current
    }

    pub fn table_name(&self) -> &str {
        &self.current.name
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Whether the working copy differs from the loaded snapshot
    pub fn is_dirty(&self) -> bool {
        if self.is_new {
            return !self.current.columns.is_empty() || !self.current.foreign_keys.is_empty();
        }
        self.current != tagged(&self.original)
    }

    /// Operations turning the loaded snapshot into the working copy
    pub fn diff(&self) -> SchemaDiff {
        SchemaDiffEngine::diff(&self.original, &self.current)
    }

    /// Problems that block submitting
    pub fn conflicts(&self) -> Vec<DiffConflict> {
        SchemaDiffEngine::detect_conflicts(&self.original, &self.current)
    }

    /// Discard every edit
    pub fn revert(&mut self) {
        self.current = if self.is_new {
            self.original.clone()
        } else {
            tagged(&self.original)
        };
        self.dirty = DirtyFlags::default();
    }

    /// Replace the loaded snapshot with a freshly fetched one, keeping edits.
    ///
    /// Columns whose loaded name no longer exists lose their tag and become
    /// additions.
    pub fn rebase(&mut self, fresh: TableDefinition) {
        let fresh = loaded(fresh);
        for column in &mut self.current.columns {
            let stale = column
                .original_name
                .as_deref()
                .is_some_and(|name| fresh.column(name).is_none());
            if stale {
                tracing::debug!(column = %column.name, "loaded column gone after refresh");
                column.original_name = None;
            }
        }
        self.original = fresh;
        self.is_new = false;
    }

    /// Add a column of a catalogued type with the catalog's defaults
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Result<&mut ColumnDefinition, DesignError> {
        let mut column = ColumnDefinition::new(name, column_type);
        if let Some(entry) = catalog_entry(&column.column_type) {
            column.is_nullable = entry.nullable_by_default;
            column.is_unique = entry.unique_by_default;
        }
        self.insert_column(column)
    }

    /// Add a fully specified column. Any `original_name` tag is cleared.
    pub fn insert_column(
        &mut self,
        mut column: ColumnDefinition,
    ) -> Result<&mut ColumnDefinition, DesignError> {
        check_name(&column.name)?;
        if self.current.column(&column.name).is_some() {
            return Err(DesignError::DuplicateColumn(column.name));
        }
        column.original_name = None;
        column.is_system_column = false;

        tracing::debug!(table = %self.current.name, column = %column.name, "column added");
        self.current.columns.push(column);
        self.dirty.columns = true;
        let index = self.current.columns.len() - 1;
        Ok(&mut self.current.columns[index])
    }

    /// Remove a column and any foreign key declared on it
    pub fn remove_column(&mut self, name: &str) -> Result<ColumnDefinition, DesignError> {
        let index = self.editable_index(name)?;
        let removed = self.current.columns.remove(index);

        let before = self.current.foreign_keys.len();
        self.current.foreign_keys.retain(|fk| fk.column_name != name);
        if self.current.foreign_keys.len() != before {
            self.dirty.foreign_keys = true;
        }

        tracing::debug!(table = %self.current.name, column = %name, "column removed");
        self.dirty.columns = true;
        Ok(removed)
    }

    /// Rename a column, carrying its foreign key along
    pub fn rename_column(&mut self, name: &str, new_name: &str) -> Result<(), DesignError> {
        if name == new_name {
            return Ok(());
        }
        check_name(new_name)?;
        let index = self.editable_index(name)?;
        if self.current.column(new_name).is_some() {
            return Err(DesignError::DuplicateColumn(new_name.to_string()));
        }

        self.current.columns[index].name = new_name.to_string();
        let table = self.current.name.clone();
        for fk in &mut self.current.foreign_keys {
            if fk.column_name == name {
                fk.column_name = new_name.to_string();
            }
            if fk.reference_table == table && fk.reference_column == name {
                fk.reference_column = new_name.to_string();
            }
        }

        tracing::debug!(table = %table, from = %name, to = %new_name, "column renamed");
        self.dirty.columns = true;
        Ok(())
    }

    pub fn retype_column(&mut self, name: &str, column_type: ColumnType) -> Result<(), DesignError> {
        let index = self.editable_index(name)?;
        self.current.columns[index].column_type = column_type;
        self.dirty.columns = true;
        Ok(())
    }

    pub fn set_nullable(&mut self, name: &str, nullable: bool) -> Result<(), DesignError> {
        let index = self.editable_index(name)?;
        self.current.columns[index].is_nullable = nullable;
        self.dirty.columns = true;
        Ok(())
    }

    pub fn set_unique(&mut self, name: &str, unique: bool) -> Result<(), DesignError> {
        let index = self.editable_index(name)?;
        self.current.columns[index].is_unique = unique;
        self.dirty.columns = true;
        Ok(())
    }

    /// Set or clear the raw default; an empty string clears it
    pub fn set_default(&mut self, name: &str, default: Option<String>) -> Result<(), DesignError> {
        let index = self.editable_index(name)?;
        self.current.columns[index].default_value = default.filter(|d| !d.is_empty());
        self.dirty.columns = true;
        Ok(())
    }

    pub fn move_column_up(&mut self, name: &str) -> Result<(), DesignError> {
        let index = self.index_of(name)?;
        if index > 0 {
            self.current.columns.swap(index, index - 1);
            self.dirty.order = true;
        }
        Ok(())
    }

    pub fn move_column_down(&mut self, name: &str) -> Result<(), DesignError> {
        let index = self.index_of(name)?;
        if index + 1 < self.current.columns.len() {
            self.current.columns.swap(index, index + 1);
            self.dirty.order = true;
        }
        Ok(())
    }

    pub fn add_foreign_key(&mut self, fk: ForeignKeyDefinition) -> Result<(), DesignError> {
        if self.current.column(&fk.column_name).is_none() {
            return Err(DesignError::NoSuchColumn(fk.column_name));
        }
        if self.current.foreign_key_for(&fk.column_name).is_some() {
            return Err(DesignError::ForeignKeyExists(fk.column_name));
        }
        tracing::debug!(
            table = %self.current.name,
            column = %fk.column_name,
            reference = %format!("{}.{}", fk.reference_table, fk.reference_column),
            "foreign key added"
        );
        self.current.foreign_keys.push(fk);
        self.dirty.foreign_keys = true;
        Ok(())
    }

    pub fn remove_foreign_key(&mut self, column: &str) -> Result<ForeignKeyDefinition, DesignError> {
        let index = self
            .current
            .foreign_keys
            .iter()
            .position(|fk| fk.column_name == column)
            .ok_or_else(|| DesignError::NoSuchForeignKey(column.to_string()))?;
        self.dirty.foreign_keys = true;
        Ok(self.current.foreign_keys.remove(index))
    }

    /// Change the target and actions of the foreign key on `column`
    pub fn edit_foreign_key(
        &mut self,
        column: &str,
        update: ForeignKeyDefinition,
    ) -> Result<(), DesignError> {
        let fk = self
            .current
            .foreign_keys
            .iter_mut()
            .find(|fk| fk.column_name == column)
            .ok_or_else(|| DesignError::NoSuchForeignKey(column.to_string()))?;
        fk.reference_table = update.reference_table;
        fk.reference_column = update.reference_column;
        fk.on_delete = update.on_delete;
        fk.on_update = update.on_update;
        self.dirty.foreign_keys = true;
        Ok(())
    }

    /// Mutable access to the working copy for edits the typed operations do not cover.
    ///
    /// Nothing is checked; [`conflicts`](Self::conflicts) reports the result.
    pub fn current_mut(&mut self) -> &mut TableDefinition {
        self.dirty.columns = true;
        self.dirty.foreign_keys = true;
        &mut self.current
    }

    /// Take the working copy, untagged, e.g. for a table creation
    pub fn into_current(self) -> TableDefinition {
        untagged(self.current)
    }

    fn index_of(&self, name: &str) -> Result<usize, DesignError> {
        self.current
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| DesignError::NoSuchColumn(name.to_string()))
    }

    fn editable_index(&self, name: &str) -> Result<usize, DesignError> {
        let index = self.index_of(name)?;
        if self.current.columns[index].is_system_column {
            return Err(DesignError::SystemColumn(name.to_string()));
        }
        Ok(index)
    }
}

fn check_name(name: &str) -> Result<(), DesignError> {
    match column_name_problem(name) {
        Some(reason) => Err(DesignError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn untagged(mut table: TableDefinition) -> TableDefinition {
    for column in &mut table.columns {
        column.original_name = None;
    }
    table
}

/// Untag a fetched table and flag columns with reserved system names
fn loaded(table: TableDefinition) -> TableDefinition {
    let mut table = untagged(table);
    for column in &mut table.columns {
        column.is_system_column = column.is_system();
    }
    table
}

fn tagged(table: &TableDefinition) -> TableDefinition {
    let mut table = table.clone();
    let mut seen = HashSet::new();
    for column in &mut table.columns {
        if seen.insert(column.name.clone()) {
            column.original_name = Some(column.name.clone());
        }
    }
    table
}

#[cfg(test)]
mod tests;
