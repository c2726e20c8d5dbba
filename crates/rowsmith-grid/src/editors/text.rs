use rowsmith_core::{CellValue, ColumnDefinition, ColumnType};

use super::EditOutcome;
use crate::EditorError;

/// Plain text editor, also used for numeric and uuid columns
#[derive(Debug, Clone)]
pub struct TextEditor {
    column: String,
    column_type: ColumnType,
    nullable: bool,
    original: CellValue,
    text: String,
}

impl TextEditor {
    pub fn new(column: &ColumnDefinition, current: &CellValue) -> Self {
        let text = match current {
            CellValue::Null => String::new(),
            other => other.to_string(),
        };
        Self {
            column: column.name.clone(),
            column_type: column.column_type.clone(),
            nullable: column.is_nullable,
            original: current.clone(),
            text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn original(&self) -> &CellValue {
        &self.original
    }

    /// Convert the text to a cell value of the column's type.
    ///
    /// Empty input commits NULL for nullable columns. Text columns that are
    /// not nullable commit an empty string instead.
    pub fn commit(&mut self) -> Result<EditOutcome, EditorError> {
        let trimmed = self.text.trim();

        if trimmed.is_empty() {
            if self.nullable {
                return Ok(EditOutcome::Commit(CellValue::Null));
            }
            return match self.column_type {
                ColumnType::String => Ok(EditOutcome::Commit(CellValue::String(String::new()))),
                _ => Err(EditorError::NullNotAllowed(self.column.clone())),
            };
        }

        let value = match self.column_type {
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(CellValue::Integer)
                .map_err(|_| EditorError::InvalidNumber(trimmed.to_string()))?,
            ColumnType::Float => match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => CellValue::Float(f),
                _ => return Err(EditorError::InvalidNumber(trimmed.to_string())),
            },
            ColumnType::Uuid => uuid::Uuid::parse_str(trimmed)
                .map(|_| CellValue::String(trimmed.to_string()))
                .map_err(|_| EditorError::InvalidUuid(trimmed.to_string()))?,
            _ => CellValue::String(self.text.clone()),
        };
        Ok(EditOutcome::Commit(value))
    }

    pub fn cancel(&mut self) -> EditOutcome {
        self.text = match &self.original {
            CellValue::Null => String::new(),
            other => other.to_string(),
        };
        EditOutcome::Cancel(self.original.clone())
    }
}
