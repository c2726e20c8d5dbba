use thiserror::Error;

/// Errors raised by cell editors and the grid commit path.
///
/// These stay local to the editor that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Invalid structured value: {0}")]
    StructuredParse(String),

    #[error("Column '{0}' does not accept NULL")]
    NullNotAllowed(String),

    #[error("Not a valid number: {0}")]
    InvalidNumber(String),

    #[error("Not a valid UUID: {0}")]
    InvalidUuid(String),

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("No date selected")]
    NoDateSelected,

    #[error("Column '{0}' is not editable")]
    NotEditable(String),

    #[error("Column '{0}' is not sortable")]
    NotSortable(String),

    #[error("Cell {row}:{column} does not exist")]
    NoSuchCell { row: usize, column: usize },
}
