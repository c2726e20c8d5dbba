//! Table loader for starting edit sessions on existing tables

use std::sync::Arc;

use rowsmith_core::{RowsmithError, SchemaService};

use crate::EditSession;

/// Table loader for turning a fetched table into an edit session
///
/// This is a stateless utility for loading existing tables.
pub struct TableLoader;

impl TableLoader {
    /// Fetch a table's definition and open an edit session on it
    ///
    /// # Errors
    /// Returns the service error, or a schema error when the service answers
    /// with a different table.
    #[tracing::instrument(skip(service))]
    pub async fn load_table(
        service: Arc<dyn SchemaService>,
        table_name: &str,
    ) -> rowsmith_core::Result<EditSession> {
        let table = service.get_table_schema(table_name).await?;
        if table.name != table_name {
            return Err(RowsmithError::Schema(format!(
                "Requested table '{}' but received '{}'",
                table_name, table.name
            )));
        }

        tracing::debug!(
            table = %table.name,
            columns = table.columns.len(),
            foreign_keys = table.foreign_keys.len(),
            "table loaded for editing"
        );
        Ok(EditSession::new(table))
    }
}
