//! Grid row model with pending-change tracking

use std::cmp::Ordering;
use std::collections::BTreeSet;

use indexmap::IndexMap;
use rowsmith_core::{CellValue, FieldMap, Record, TableDefinition};
use rowsmith_settings::GridSettings;

use crate::{
    CellDescriptor, CellDispatchRegistry, CellEditor, EditOutcome, EditorError, RenderedCell,
    render_cell,
};

/// A pending cell change (not yet persisted)
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCellChange {
    /// Value before editing
    pub original_value: CellValue,
    /// Value after editing
    pub new_value: CellValue,
}

/// All pending changes of a grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingChanges {
    /// Modified cells: (row, column) -> change
    pub modified_cells: IndexMap<(usize, usize), PendingCellChange>,
    /// Rows marked for deletion
    pub deleted_rows: BTreeSet<usize>,
    /// Number of rows appended since load; they sit at the end of the grid
    pub new_rows: usize,
}

impl PendingChanges {
    pub fn is_empty(&self) -> bool {
        self.modified_cells.is_empty() && self.deleted_rows.is_empty() && self.new_rows == 0
    }

    pub fn clear(&mut self) {
        self.modified_cells.clear();
        self.deleted_rows.clear();
        self.new_rows = 0;
    }

    pub fn change_count(&self) -> usize {
        self.modified_cells.len() + self.deleted_rows.len() + self.new_rows
    }

    pub fn is_cell_modified(&self, row: usize, col: usize) -> bool {
        self.modified_cells.contains_key(&(row, col))
    }

    pub fn is_row_deleted(&self, row: usize) -> bool {
        self.deleted_rows.contains(&row)
    }
}

/// Rows of one table, dispatched per column
#[derive(Debug, Clone)]
pub struct GridModel {
    table: TableDefinition,
    descriptors: Vec<CellDescriptor>,
    rows: Vec<Vec<CellValue>>,
    pending: PendingChanges,
}

impl GridModel {
    /// Build a grid from records; missing fields are NULL, extra fields are ignored
    pub fn new(table: TableDefinition, records: &[Record], registry: &CellDispatchRegistry) -> Self {
        let descriptors = registry.descriptors(&table);
        let rows = records
            .iter()
            .map(|record| {
                table
                    .columns
                    .iter()
                    .map(|c| record.get(&c.name).cloned().unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect();

        Self {
            table,
            descriptors,
            rows,
            pending: PendingChanges::default(),
        }
    }

    pub fn table(&self) -> &TableDefinition {
        &self.table
    }

    pub fn descriptors(&self) -> &[CellDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, col: usize) -> Option<&CellDescriptor> {
        self.descriptors.get(col)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn pending_changes(&self) -> &PendingChanges {
        &self.pending
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn render(&self, row: usize, col: usize, settings: &GridSettings) -> Option<RenderedCell> {
        let descriptor = self.descriptors.get(col)?;
        let value = self.cell(row, col)?;
        Some(render_cell(descriptor, value, settings))
    }

    /// Render every cell, row by row
    pub fn render_all(&self, settings: &GridSettings) -> Vec<Vec<RenderedCell>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.descriptors)
                    .map(|(value, descriptor)| render_cell(descriptor, value, settings))
                    .collect()
            })
            .collect()
    }

    /// Open the editor for a cell
    pub fn begin_edit(
        &self,
        row: usize,
        col: usize,
        registry: &CellDispatchRegistry,
    ) -> Result<CellEditor, EditorError> {
        let value = self
            .cell(row, col)
            .ok_or(EditorError::NoSuchCell { row, column: col })?;
        let column = &self.table.columns[col];
        registry.open_editor(column, self.table.foreign_key_for(&column.name), value)
    }

    /// Apply an editor outcome. Only `Commit` changes the cell.
    ///
    /// Returns whether the cell value changed.
    pub fn apply(&mut self, row: usize, col: usize, outcome: EditOutcome) -> Result<bool, EditorError> {
        let EditOutcome::Commit(new_value) = outcome else {
            return Ok(false);
        };
        let editable = self.descriptors.get(col).is_some_and(|d| d.editable);
        let name = self
            .table
            .columns
            .get(col)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        if !editable {
            return Err(EditorError::NotEditable(name));
        }

        let is_new_row = row >= self.rows.len() - self.pending.new_rows.min(self.rows.len());
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(EditorError::NoSuchCell { row, column: col })?;
        if *cell == new_value {
            return Ok(false);
        }

        let previous = std::mem::replace(cell, new_value.clone());
        if !is_new_row {
            match self.pending.modified_cells.get(&(row, col)) {
                Some(change) if change.original_value == new_value => {
                    self.pending.modified_cells.shift_remove(&(row, col));
                }
                Some(change) => {
                    let original_value = change.original_value.clone();
                    self.pending.modified_cells.insert(
                        (row, col),
                        PendingCellChange {
                            original_value,
                            new_value,
                        },
                    );
                }
                None => {
                    self.pending.modified_cells.insert(
                        (row, col),
                        PendingCellChange {
                            original_value: previous,
                            new_value,
                        },
                    );
                }
            }
        }

        tracing::debug!(
            row,
            column = %name,
            pending = self.pending.change_count(),
            "cell committed"
        );
        Ok(true)
    }

    /// Append an empty row
    pub fn add_new_row(&mut self) -> usize {
        self.rows.push(vec![CellValue::Null; self.descriptors.len()]);
        self.pending.new_rows += 1;
        self.rows.len() - 1
    }

    pub fn mark_row_for_deletion(&mut self, row: usize) {
        if row < self.rows.len() {
            self.pending.deleted_rows.insert(row);
        }
    }

    pub fn unmark_row_for_deletion(&mut self, row: usize) {
        self.pending.deleted_rows.remove(&row);
    }

    /// Changed fields of a loaded row, for an update call
    pub fn changed_fields(&self, row: usize) -> FieldMap {
        self.pending
            .modified_cells
            .iter()
            .filter(|((r, _), _)| *r == row)
            .filter_map(|((_, c), change)| {
                let column = self.table.columns.get(*c)?;
                Some((column.name.clone(), change.new_value.clone()))
            })
            .collect()
    }

    /// Row as a record keyed by column name
    pub fn record(&self, row: usize) -> Option<Record> {
        let values = self.rows.get(row)?;
        Some(
            self.table
                .columns
                .iter()
                .zip(values)
                .map(|(c, v)| (c.name.clone(), v.clone()))
                .collect(),
        )
    }

    /// Undo every pending change
    pub fn discard_pending_changes(&mut self) {
        for ((row, col), change) in &self.pending.modified_cells {
            if let Some(cell) = self.rows.get_mut(*row).and_then(|r| r.get_mut(*col)) {
                *cell = change.original_value.clone();
            }
        }
        let original_rows = self.rows.len() - self.pending.new_rows.min(self.rows.len());
        self.rows.truncate(original_rows);
        self.pending.clear();
        tracing::info!(table = %self.table.name, "discarded pending changes");
    }

    /// Accept the pending changes as persisted
    pub fn mark_saved(&mut self) {
        let mut deleted: Vec<usize> = self.pending.deleted_rows.iter().copied().collect();
        deleted.sort_unstable_by(|a, b| b.cmp(a));
        for row in deleted {
            if row < self.rows.len() {
                self.rows.remove(row);
            }
        }
        self.pending.clear();
    }

    /// Row order sorted by one column
    pub fn sorted_row_indices(&self, col: usize, ascending: bool) -> Result<Vec<usize>, EditorError> {
        let descriptor = self
            .descriptors
            .get(col)
            .ok_or(EditorError::NoSuchCell { row: 0, column: col })?;
        if !descriptor.sortable {
            return Err(EditorError::NotSortable(descriptor.column.clone()));
        }

        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        indices.sort_by(|a, b| {
            let ordering = compare_cells(&self.rows[*a][col], &self.rows[*b][col]);
            if ascending { ordering } else { ordering.reverse() }
        });
        Ok(indices)
    }
}

/// Ordering used for sorting: NULL first, numbers numerically, the rest by text
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Null, CellValue::Null) => Ordering::Equal,
        (CellValue::Null, _) => Ordering::Less,
        (_, CellValue::Null) => Ordering::Greater,
        (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        (CellValue::Date(x), CellValue::Date(y)) => x.cmp(y),
        (CellValue::DateTime(x), CellValue::DateTime(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}
