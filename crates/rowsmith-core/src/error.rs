//! Error types for rowsmith collaborators

use thiserror::Error;

/// Core error type returned by the schema and record collaborators
#[derive(Error, Debug)]
pub enum RowsmithError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for rowsmith collaborator operations
pub type Result<T> = std::result::Result<T, RowsmithError>;
