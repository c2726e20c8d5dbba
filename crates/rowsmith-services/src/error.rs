use rowsmith_forms::FieldErrors;
use rowsmith_table_designer::{DesignError, DiffConflict};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Schema has {} unresolved conflict(s)", .0.len())]
    DiffConflict(Vec<DiffConflict>),

    #[error("Schema update failed: {0}")]
    Persistence(String),

    #[error("A submit is already in progress for this table")]
    SubmitInProgress,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("The last submit failed; refresh the schema before editing again")]
    StaleBase,

    #[error("Schema loading failed: {0}")]
    SchemaLoadFailed(String),

    #[error(transparent)]
    Validation(#[from] FieldErrors),

    #[error(transparent)]
    Design(#[from] DesignError),

    #[error("Record operation failed: {0}")]
    RecordOperationFailed(String),
}
