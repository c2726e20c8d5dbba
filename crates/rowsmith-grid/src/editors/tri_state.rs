use rowsmith_core::{CellValue, ColumnDefinition, parse_truthy};

use super::EditOutcome;
use crate::EditorError;

/// Boolean editor with an optional NULL state
#[derive(Debug, Clone)]
pub struct TriStateEditor {
    column: String,
    nullable: bool,
    original: CellValue,
}

impl TriStateEditor {
    pub fn new(column: &ColumnDefinition, current: &CellValue) -> Self {
        Self {
            column: column.name.clone(),
            nullable: column.is_nullable,
            original: current.clone(),
        }
    }

    pub fn original(&self) -> &CellValue {
        &self.original
    }

    /// Current state; string cells are read as truthy literals
    pub fn current(&self) -> Option<bool> {
        match &self.original {
            CellValue::Bool(b) => Some(*b),
            CellValue::String(s) => parse_truthy(s),
            CellValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Selectable states; NULL only for nullable columns
    pub fn options(&self) -> Vec<Option<bool>> {
        let mut options = vec![Some(true), Some(false)];
        if self.nullable {
            options.push(None);
        }
        options
    }

    /// Commit a state. `None` commits NULL, never a default boolean.
    pub fn select(&mut self, state: Option<bool>) -> Result<EditOutcome, EditorError> {
        match state {
            Some(b) => Ok(EditOutcome::Commit(CellValue::Bool(b))),
            None if self.nullable => Ok(EditOutcome::Commit(CellValue::Null)),
            None => Err(EditorError::NullNotAllowed(self.column.clone())),
        }
    }

    /// Step to the next state.
    ///
    /// Nullable columns cycle true -> false -> NULL -> true. Otherwise the
    /// value flips and NULL becomes false.
    pub fn toggle(&mut self) -> EditOutcome {
        let next = match (self.current(), self.nullable) {
            (Some(true), _) => Some(false),
            (Some(false), true) => None,
            (Some(false), false) => Some(true),
            (None, true) => Some(true),
            (None, false) => Some(false),
        };
        EditOutcome::Commit(next.map(CellValue::Bool).unwrap_or(CellValue::Null))
    }

    pub fn cancel(&mut self) -> EditOutcome {
        EditOutcome::Cancel(self.original.clone())
    }
}
