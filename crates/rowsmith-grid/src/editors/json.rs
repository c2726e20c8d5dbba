use rowsmith_core::{CellValue, ColumnDefinition};

use super::EditOutcome;
use crate::EditorError;

/// Raw-text editor for structured (JSON) values
#[derive(Debug, Clone)]
pub struct StructuredEditor {
    column: String,
    nullable: bool,
    original: CellValue,
    text: String,
    error: Option<String>,
}

impl StructuredEditor {
    pub fn new(column: &ColumnDefinition, current: &CellValue) -> Self {
        Self {
            column: column.name.clone(),
            nullable: column.is_nullable,
            original: current.clone(),
            text: initial_text(current),
            error: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.error = None;
    }

    /// Validation message from the last failed commit
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn original(&self) -> &CellValue {
        &self.original
    }

    /// Commit if the text parses. On failure the message is kept on the editor.
    pub fn commit(&mut self) -> Result<EditOutcome, EditorError> {
        match serde_json::from_str::<serde_json::Value>(&self.text) {
            Ok(value) => {
                self.error = None;
                Ok(EditOutcome::Commit(CellValue::Json(value)))
            }
            Err(e) => {
                let message = e.to_string();
                tracing::debug!(column = %self.column, error = %message, "structured value rejected");
                self.error = Some(message.clone());
                Err(EditorError::StructuredParse(message))
            }
        }
    }

    /// Commit NULL
    pub fn clear(&mut self) -> Result<EditOutcome, EditorError> {
        if !self.nullable {
            return Err(EditorError::NullNotAllowed(self.column.clone()));
        }
        self.text.clear();
        self.error = None;
        Ok(EditOutcome::Commit(CellValue::Null))
    }

    pub fn cancel(&mut self) -> EditOutcome {
        self.text = initial_text(&self.original);
        self.error = None;
        EditOutcome::Cancel(self.original.clone())
    }
}

fn initial_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        CellValue::String(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}
