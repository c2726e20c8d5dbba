//! Common test utilities and mocks

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use rowsmith_core::{
    CellValue, ColumnDefinition, FieldMap, ForeignKeyDefinition, Record, RecordId, RecordService,
    Result, RowsmithError, SchemaDiff, SchemaService, TableDefinition,
};

/// In-memory store answering schema and record lookups.
///
/// Every lookup is logged so tests can assert which fetches happened.
pub struct MockStore {
    pub tables: Vec<TableDefinition>,
    pub rows: Vec<(String, Record)>,
    pub delay: Option<Duration>,
    pub should_fail: bool,
    pub call_log: Arc<parking_lot::Mutex<Vec<String>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            tables: vec![],
            rows: vec![],
            delay: None,
            should_fail: false,
            call_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    pub fn with_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_row(mut self, table: impl Into<String>, row: Record) -> Self {
        self.rows.push((table.into(), row));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SchemaService for MockStore {
    async fn get_table_schema(&self, table_name: &str) -> Result<TableDefinition> {
        self.call_log.lock().push(format!("schema:{}", table_name));
        self.pause().await;
        self.tables
            .iter()
            .find(|t| t.name == table_name)
            .cloned()
            .ok_or_else(|| RowsmithError::NotFound(table_name.to_string()))
    }

    async fn update_table_schema(
        &self,
        _table_name: &str,
        _diff: &SchemaDiff,
    ) -> Result<Option<TableDefinition>> {
        Err(RowsmithError::Persistence("read-only store".into()))
    }

    async fn create_table(
        &self,
        _name: &str,
        _columns: &[ColumnDefinition],
        _foreign_keys: &[ForeignKeyDefinition],
    ) -> Result<()> {
        Err(RowsmithError::Persistence("read-only store".into()))
    }
}

#[async_trait]
impl RecordService for MockStore {
    async fn get_record_by_foreign_key_value(
        &self,
        table: &str,
        column: &str,
        value: &CellValue,
    ) -> Result<Option<Record>> {
        self.call_log
            .lock()
            .push(format!("record:{}.{}={}", table, column, value));
        self.pause().await;
        if self.should_fail {
            return Err(RowsmithError::Transport("connection reset".into()));
        }
        Ok(self
            .rows
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, row)| row)
            .find(|row| row.get(column) == Some(value))
            .cloned())
    }

    async fn create_record(&self, _table: &str, _fields: &FieldMap) -> Result<RecordId> {
        Err(RowsmithError::Persistence("read-only store".into()))
    }

    async fn update_record(&self, _table: &str, _id: &RecordId, _fields: &FieldMap) -> Result<()> {
        Err(RowsmithError::Persistence("read-only store".into()))
    }

    async fn delete_record(&self, _table: &str, _id: &RecordId) -> Result<()> {
        Err(RowsmithError::Persistence("read-only store".into()))
    }
}
