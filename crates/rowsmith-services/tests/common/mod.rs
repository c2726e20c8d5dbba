//! Common test utilities and mocks

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rowsmith_core::{
    CellValue, ColumnDefinition, ColumnType, FieldMap, ForeignKeyDefinition, Record, RecordId,
    RecordService, Result, RowsmithError, SchemaDiff, SchemaService, TableDefinition,
};

/// In-memory backend implementing both collaborator traits.
///
/// Schema updates are applied to the stored table so later fetches see them.
/// Every call is logged.
#[derive(Default)]
pub struct MockBackend {
    pub tables: Mutex<HashMap<String, TableDefinition>>,
    pub records: Mutex<Vec<(String, FieldMap)>>,
    pub call_log: Mutex<Vec<String>>,
    pub last_diff: Mutex<Option<SchemaDiff>>,
    pub fail_updates: Mutex<bool>,
    pub fail_records: Mutex<bool>,
    /// Return the stored table from `update_table_schema` instead of `None`
    pub confirm_schema: Mutex<bool>,
    pub delay: Mutex<Option<Duration>>,
}

impl MockBackend {
    pub fn with_table(table: TableDefinition) -> Self {
        let backend = Self::default();
        backend.tables.lock().insert(table.name.clone(), table);
        backend
    }

    pub fn calls(&self) -> Vec<String> {
        self.call_log.lock().clone()
    }

    pub fn table(&self, name: &str) -> Option<TableDefinition> {
        self.tables.lock().get(name).cloned()
    }

    pub fn set_fail_updates(&self, fail: bool) {
        *self.fail_updates.lock() = fail;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    fn log(&self, call: String) {
        self.call_log.lock().push(call);
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SchemaService for MockBackend {
    async fn get_table_schema(&self, table_name: &str) -> Result<TableDefinition> {
        self.log(format!("get_table_schema:{}", table_name));
        self.table(table_name)
            .ok_or_else(|| RowsmithError::NotFound(format!("Table '{}'", table_name)))
    }

    async fn update_table_schema(
        &self,
        table_name: &str,
        diff: &SchemaDiff,
    ) -> Result<Option<TableDefinition>> {
        self.log(format!("update_table_schema:{}", table_name));
        self.pause().await;
        *self.last_diff.lock() = Some(diff.clone());

        if *self.fail_updates.lock() {
            return Err(RowsmithError::Persistence("update rejected".into()));
        }

        let mut tables = self.tables.lock();
        let current = tables
            .get(table_name)
            .cloned()
            .ok_or_else(|| RowsmithError::NotFound(format!("Table '{}'", table_name)))?;
        let updated = diff.apply_to(&current);
        tables.insert(table_name.to_string(), updated.clone());

        if *self.confirm_schema.lock() {
            Ok(Some(updated))
        } else {
            Ok(None)
        }
    }

    async fn create_table(
        &self,
        name: &str,
        columns: &[ColumnDefinition],
        foreign_keys: &[ForeignKeyDefinition],
    ) -> Result<()> {
        self.log(format!("create_table:{}", name));
        self.pause().await;
        if *self.fail_updates.lock() {
            return Err(RowsmithError::Persistence("create rejected".into()));
        }
        let table = TableDefinition {
            name: name.to_string(),
            columns: columns.to_vec(),
            foreign_keys: foreign_keys.to_vec(),
        };
        self.tables.lock().insert(name.to_string(), table);
        Ok(())
    }
}

#[async_trait]
impl RecordService for MockBackend {
    async fn get_record_by_foreign_key_value(
        &self,
        table: &str,
        column: &str,
        value: &CellValue,
    ) -> Result<Option<Record>> {
        self.log(format!("get_record:{}.{}={}", table, column, value));
        Ok(self
            .records
            .lock()
            .iter()
            .find(|(t, r)| t == table && r.get(column) == Some(value))
            .map(|(_, r)| r.clone()))
    }

    async fn create_record(&self, table: &str, fields: &FieldMap) -> Result<RecordId> {
        self.log(format!("create_record:{}", table));
        if *self.fail_records.lock() {
            return Err(RowsmithError::Persistence("insert rejected".into()));
        }
        let mut records = self.records.lock();
        records.push((table.to_string(), fields.clone()));
        Ok(records.len().to_string())
    }

    async fn update_record(&self, table: &str, id: &RecordId, fields: &FieldMap) -> Result<()> {
        let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        self.log(format!("update_record:{}:{}:{}", table, id, names.join(",")));
        if *self.fail_records.lock() {
            return Err(RowsmithError::Persistence("update rejected".into()));
        }
        Ok(())
    }

    async fn delete_record(&self, table: &str, id: &RecordId) -> Result<()> {
        self.log(format!("delete_record:{}:{}", table, id));
        if *self.fail_records.lock() {
            return Err(RowsmithError::Persistence("delete rejected".into()));
        }
        Ok(())
    }
}

/// `users(id pk system, name not null, age, created_at system)`
pub fn users_table() -> TableDefinition {
    TableDefinition::new("users")
        .with_column(ColumnDefinition::system("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("name", ColumnType::String).not_null())
        .with_column(ColumnDefinition::new("age", ColumnType::Integer))
        .with_column(ColumnDefinition::new("active", ColumnType::Boolean).default("true"))
        .with_column(ColumnDefinition::system("created_at", ColumnType::DateTime))
}

/// `orders(id pk system, user_id -> users.id, total)`
pub fn orders_table() -> TableDefinition {
    TableDefinition::new("orders")
        .with_column(ColumnDefinition::system("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("user_id", ColumnType::Integer).not_null())
        .with_column(ColumnDefinition::new("total", ColumnType::Float))
        .with_foreign_key(ForeignKeyDefinition::new("user_id").references("users", "id"))
}
