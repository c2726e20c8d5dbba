//! Record operations service
//!
//! Creates, updates and deletes rows through validated forms, and saves the
//! pending changes of a grid.

use std::collections::BTreeSet;
use std::sync::Arc;

use rowsmith_core::{
    CellValue, FieldMap, RecordId, RecordService, SchemaService, TableDefinition,
};
use rowsmith_forms::{DynamicValidationBuilder, FieldError, FieldErrors, RecordForm};
use rowsmith_grid::GridModel;

use crate::error::{ServiceError, ServiceResult};

/// Outcome of saving a grid's pending changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSaveSummary {
    /// Identifiers of inserted rows, in grid order
    pub created: Vec<RecordId>,
    pub updated: usize,
    pub deleted: usize,
}

/// Service for record-level operations
///
/// Handles:
/// - Building record forms from the fetched schema
/// - Validated inserts; field errors never reach the record service
/// - Updates carrying only the changed fields
/// - Saving grid edits with primary-key row identification
pub struct RecordFormService {
    schema_service: Arc<dyn SchemaService>,
    record_service: Arc<dyn RecordService>,
}

impl RecordFormService {
    pub fn new(
        schema_service: Arc<dyn SchemaService>,
        record_service: Arc<dyn RecordService>,
    ) -> Self {
        Self {
            schema_service,
            record_service,
        }
    }

    /// Fetch a table's schema and build its record form
    #[tracing::instrument(skip(self))]
    pub async fn open_form(&self, table_name: &str) -> ServiceResult<RecordForm> {
        let table = self
            .schema_service
            .get_table_schema(table_name)
            .await
            .map_err(|e| ServiceError::SchemaLoadFailed(e.to_string()))?;
        Ok(DynamicValidationBuilder::build_form(&table))
    }

    /// Validate form values and insert the record
    #[tracing::instrument(skip(self, form, values), fields(table = %form.table))]
    pub async fn create_record(
        &self,
        form: &RecordForm,
        values: &FieldMap,
    ) -> ServiceResult<RecordId> {
        let submission = form.submit(values).inspect_err(|errors| {
            tracing::debug!(errors = errors.len(), "record form rejected");
        })?;

        let id = self
            .record_service
            .create_record(&form.table, &submission)
            .await
            .map_err(|e| ServiceError::RecordOperationFailed(e.to_string()))?;

        tracing::info!(id = %id, fields = submission.len(), "record created");
        Ok(id)
    }

    /// Validate the edited fields and update only those that changed
    ///
    /// Returns the fields sent; an empty map means nothing changed and the
    /// record service was not called.
    #[tracing::instrument(skip(self, form, original, values), fields(table = %form.table))]
    pub async fn update_record(
        &self,
        form: &RecordForm,
        id: &RecordId,
        original: &FieldMap,
        values: &FieldMap,
    ) -> ServiceResult<FieldMap> {
        let mut changed = FieldMap::new();
        let mut errors = Vec::new();

        for (name, value) in values {
            if form.schema.field(name).is_none() {
                errors.push(FieldError::new(name.as_str(), "is not editable"));
                continue;
            }
            match form.schema.validate_field(name, value) {
                Ok(value) => {
                    if original.get(name).unwrap_or(&CellValue::Null) != &value {
                        changed.insert(name.clone(), value);
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(FieldErrors { errors }.into());
        }
        if changed.is_empty() {
            tracing::debug!(id = %id, "no changed fields, skipping update");
            return Ok(changed);
        }

        self.record_service
            .update_record(&form.table, id, &changed)
            .await
            .map_err(|e| ServiceError::RecordOperationFailed(e.to_string()))?;

        tracing::info!(id = %id, fields = changed.len(), "record updated");
        Ok(changed)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_record(&self, table: &str, id: &RecordId) -> ServiceResult<()> {
        self.record_service
            .delete_record(table, id)
            .await
            .map_err(|e| ServiceError::RecordOperationFailed(e.to_string()))?;
        tracing::info!(id = %id, "record deleted");
        Ok(())
    }

    /// Persist a grid's pending changes, then accept them in the grid
    ///
    /// New rows are validated against the table's record form before any
    /// call is made. Loaded rows are identified by their primary key.
    /// Deletes run first, then updates, then inserts.
    #[tracing::instrument(skip(self, grid), fields(table = %grid.table().name))]
    pub async fn save_grid(&self, grid: &mut GridModel) -> ServiceResult<GridSaveSummary> {
        let table = grid.table().clone();
        let form = DynamicValidationBuilder::build_form(&table);
        let pending = grid.pending_changes();

        let row_count = grid.row_count();
        let first_new = row_count - pending.new_rows.min(row_count);

        let mut inserts = Vec::new();
        for row in first_new..row_count {
            if pending.is_row_deleted(row) {
                continue;
            }
            let values: FieldMap = grid
                .record(row)
                .unwrap_or_default()
                .into_iter()
                .filter(|(name, _)| form.schema.field(name).is_some())
                .collect();
            inserts.push(form.submit(&values)?);
        }

        let modified_rows: BTreeSet<usize> = pending
            .modified_cells
            .keys()
            .map(|(row, _)| *row)
            .filter(|row| *row < first_new && !pending.is_row_deleted(*row))
            .collect();
        let mut updates = Vec::new();
        for row in modified_rows {
            let changed = validate_changes(&form, grid.changed_fields(row))?;
            updates.push((row_id(&table, grid, row)?, changed));
        }

        let mut deletes = Vec::new();
        for row in pending.deleted_rows.iter().filter(|row| **row < first_new) {
            deletes.push(row_id(&table, grid, *row)?);
        }

        let mut summary = GridSaveSummary::default();
        for id in &deletes {
            self.delete_record(&table.name, id).await?;
            summary.deleted += 1;
        }
        for (id, fields) in &updates {
            self.record_service
                .update_record(&table.name, id, fields)
                .await
                .map_err(|e| ServiceError::RecordOperationFailed(e.to_string()))?;
            summary.updated += 1;
        }
        for fields in &inserts {
            let id = self
                .record_service
                .create_record(&table.name, fields)
                .await
                .map_err(|e| ServiceError::RecordOperationFailed(e.to_string()))?;
            summary.created.push(id);
        }

        grid.mark_saved();
        tracing::info!(
            created = summary.created.len(),
            updated = summary.updated,
            deleted = summary.deleted,
            "grid changes saved"
        );
        Ok(summary)
    }
}

/// Run the form rules over a row's changed cells; columns outside the form
/// (system columns) pass through unchanged
fn validate_changes(form: &RecordForm, changed: FieldMap) -> ServiceResult<FieldMap> {
    let mut validated = FieldMap::new();
    let mut errors = Vec::new();
    for (name, value) in changed {
        if form.schema.field(&name).is_none() {
            validated.insert(name, value);
            continue;
        }
        match form.schema.validate_field(&name, &value) {
            Ok(value) => {
                validated.insert(name, value);
            }
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(FieldErrors { errors }.into())
    }
}

/// Identifier of a loaded row from its primary key value
fn row_id(table: &TableDefinition, grid: &GridModel, row: usize) -> ServiceResult<RecordId> {
    let index = table
        .columns
        .iter()
        .position(|c| c.is_primary_key)
        .ok_or_else(|| {
            ServiceError::RecordOperationFailed(format!(
                "Table '{}' has no primary key to identify rows",
                table.name
            ))
        })?;

    match grid.cell(row, index) {
        Some(value) if !value.is_null() => Ok(value.to_string()),
        _ => Err(ServiceError::RecordOperationFailed(format!(
            "Row {} has no primary key value",
            row
        ))),
    }
}
