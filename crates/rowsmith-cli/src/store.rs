//! Directory-backed schema store
//!
//! Each table lives in `<dir>/<table>.json` as a serialized
//! [`TableDefinition`]. Updates apply the diff and rewrite the file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rowsmith_core::{
    ColumnDefinition, ForeignKeyDefinition, Result, RowsmithError, SchemaDiff, SchemaService,
    TableDefinition,
};

pub struct FileSchemaStore {
    dir: PathBuf,
}

impl FileSchemaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", table_name))
    }

    async fn read(&self, path: &Path, table_name: &str) -> Result<TableDefinition> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RowsmithError::NotFound(format!("Table '{}'", table_name)));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn write(&self, path: &Path, table: &TableDefinition) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(table)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl SchemaService for FileSchemaStore {
    async fn get_table_schema(&self, table_name: &str) -> Result<TableDefinition> {
        let path = self.table_path(table_name);
        tracing::debug!(path = %path.display(), "reading table schema");
        self.read(&path, table_name).await
    }

    async fn update_table_schema(
        &self,
        table_name: &str,
        diff: &SchemaDiff,
    ) -> Result<Option<TableDefinition>> {
        let path = self.table_path(table_name);
        let current = self.read(&path, table_name).await?;

        for name in &diff.drop_columns {
            if current.column(name).is_none() {
                return Err(RowsmithError::Persistence(format!(
                    "Cannot drop missing column '{}'",
                    name
                )));
            }
        }
        for name in diff.rename_columns.keys() {
            if current.column(name).is_none() {
                return Err(RowsmithError::Persistence(format!(
                    "Cannot rename missing column '{}'",
                    name
                )));
            }
        }

        let updated = diff.apply_to(&current);
        self.write(&path, &updated).await?;
        tracing::info!(
            table = %table_name,
            operations = diff.operation_count(),
            "table schema updated"
        );
        Ok(Some(updated))
    }

    async fn create_table(
        &self,
        name: &str,
        columns: &[ColumnDefinition],
        foreign_keys: &[ForeignKeyDefinition],
    ) -> Result<()> {
        let path = self.table_path(name);
        if tokio::fs::try_exists(&path).await? {
            return Err(RowsmithError::Persistence(format!(
                "Table '{}' already exists",
                name
            )));
        }

        let table = TableDefinition {
            name: name.to_string(),
            columns: columns.to_vec(),
            foreign_keys: foreign_keys.to_vec(),
        };
        self.write(&path, &table).await?;
        tracing::info!(table = %name, columns = columns.len(), "table created");
        Ok(())
    }
}
