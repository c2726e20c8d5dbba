//! Shared mocks for table designer tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rowsmith_core::{
    ColumnDefinition, ForeignKeyDefinition, Result, RowsmithError, SchemaDiff, SchemaService,
    TableDefinition,
};

/// In-memory schema service that logs every call
#[derive(Default)]
pub struct MockSchemaService {
    pub tables: Mutex<HashMap<String, TableDefinition>>,
    pub call_log: Mutex<Vec<String>>,
    /// When set, `get_table_schema` answers with this table whatever is asked
    pub answer_with: Mutex<Option<TableDefinition>>,
}

impl MockSchemaService {
    pub fn with_table(table: TableDefinition) -> Self {
        let service = Self::default();
        service.tables.lock().insert(table.name.clone(), table);
        service
    }

    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().clone()
    }
}

#[async_trait]
impl SchemaService for MockSchemaService {
    async fn get_table_schema(&self, table_name: &str) -> Result<TableDefinition> {
        self.call_log
            .lock()
            .push(format!("get_table_schema:{}", table_name));
        if let Some(table) = self.answer_with.lock().clone() {
            return Ok(table);
        }
        self.tables
            .lock()
            .get(table_name)
            .cloned()
            .ok_or_else(|| RowsmithError::NotFound(format!("Table '{}'", table_name)))
    }

    async fn update_table_schema(
        &self,
        table_name: &str,
        _diff: &SchemaDiff,
    ) -> Result<Option<TableDefinition>> {
        self.call_log
            .lock()
            .push(format!("update_table_schema:{}", table_name));
        Ok(None)
    }

    async fn create_table(
        &self,
        name: &str,
        _columns: &[ColumnDefinition],
        _foreign_keys: &[ForeignKeyDefinition],
    ) -> Result<()> {
        self.call_log.lock().push(format!("create_table:{}", name));
        Ok(())
    }
}
