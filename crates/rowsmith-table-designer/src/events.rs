//! Events emitted while editing a table

use rowsmith_core::{SchemaDiff, TableDefinition};

/// Events a table edit produces for its host
#[derive(Debug, Clone, PartialEq)]
pub enum TableEditEvent {
    /// The schema was fetched and an edit session started
    Loaded { table: String },

    /// The operation list was sent to the schema service
    Submitted {
        table: String,
        /// Operations sent, empty for a table creation
        diff: SchemaDiff,
        /// Whether this created a new table
        is_new: bool,
    },

    /// The service confirmed the change; `schema` is the new base
    Saved { schema: TableDefinition },

    /// The service rejected the change. Edits are kept.
    Failed { table: String, error: String },

    /// The edit session was closed without submitting
    Cancelled { table: String },
}

impl TableEditEvent {
    pub fn table_name(&self) -> &str {
        match self {
            TableEditEvent::Loaded { table }
            | TableEditEvent::Submitted { table, .. }
            | TableEditEvent::Failed { table, .. }
            | TableEditEvent::Cancelled { table } => table,
            TableEditEvent::Saved { schema } => &schema.name,
        }
    }
}
