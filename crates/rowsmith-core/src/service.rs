//! External collaborator interfaces
//!
//! The editor never talks to a store directly. Schema fetches and updates go
//! through `SchemaService`; row reads and writes go through `RecordService`.
//! Transport and authentication live behind these traits.

use crate::{
    CellValue, ColumnDefinition, FieldMap, ForeignKeyDefinition, Record, RecordId, Result,
    SchemaDiff, TableDefinition,
};
use async_trait::async_trait;

/// Schema fetch and update interface
#[async_trait]
pub trait SchemaService: Send + Sync {
    /// Get the current definition of a table
    async fn get_table_schema(&self, table_name: &str) -> Result<TableDefinition>;

    /// Apply a diff to a table.
    ///
    /// Returns the confirmed definition when the service reports one; `None`
    /// means the caller should derive it from the diff.
    async fn update_table_schema(
        &self,
        table_name: &str,
        diff: &SchemaDiff,
    ) -> Result<Option<TableDefinition>>;

    /// Create a new table
    async fn create_table(
        &self,
        name: &str,
        columns: &[ColumnDefinition],
        foreign_keys: &[ForeignKeyDefinition],
    ) -> Result<()>;
}

/// Row read/write interface
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Find the single row in `table` whose `column` equals `value`
    async fn get_record_by_foreign_key_value(
        &self,
        table: &str,
        column: &str,
        value: &CellValue,
    ) -> Result<Option<Record>>;

    /// Insert a row, returning its identifier
    async fn create_record(&self, table: &str, fields: &FieldMap) -> Result<RecordId>;

    /// Update the given fields of a row
    async fn update_record(&self, table: &str, id: &RecordId, fields: &FieldMap) -> Result<()>;

    /// Delete a row
    async fn delete_record(&self, table: &str, id: &RecordId) -> Result<()>;
}
