//! Design and diff error types

use thiserror::Error;

/// An edit request the session refuses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    #[error("Column '{0}' is a system column and cannot be modified")]
    SystemColumn(String),

    #[error("Column '{0}' does not exist")]
    NoSuchColumn(String),

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Invalid column name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Column '{0}' has no foreign key")]
    NoSuchForeignKey(String),

    #[error("Column '{0}' already has a foreign key")]
    ForeignKeyExists(String),
}

/// A problem in the edited schema that must be fixed before submitting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffConflict {
    /// A rename targets the original name of another column (swap or chain)
    #[error("Renaming '{from}' to '{to}' collides with the existing column '{to}'")]
    RenameCollision { from: String, to: String },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Invalid column name '{name}': {reason}")]
    InvalidColumnName { name: String, reason: String },

    #[error("Foreign key on '{0}' references a dropped column")]
    ForeignKeyOnDroppedColumn(String),

    #[error("Foreign key column '{0}' does not exist in table")]
    ForeignKeyOnMissingColumn(String),

    #[error("Foreign key on '{column}' references dropped column '{reference_column}' of this table")]
    SelfReferenceToDroppedColumn {
        column: String,
        reference_column: String,
    },

    #[error("System column '{0}' cannot be renamed, retyped or dropped")]
    SystemColumnModified(String),

    #[error("Table name is required")]
    EmptyTableName,

    #[error("At least one column is required")]
    NoColumns,
}
