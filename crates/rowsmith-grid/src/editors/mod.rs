//! Cell editors
//!
//! Each editor is opened on the current cell value and ends in exactly one
//! [`EditOutcome::Commit`] or [`EditOutcome::Cancel`]. Invalid input is
//! reported as an [`EditorError`](crate::EditorError) and leaves the editor
//! open.

mod date_picker;
mod json;
mod text;
mod tri_state;

pub use date_picker::{DatePickerMode, DatePickerState, PickerView};
pub use json::StructuredEditor;
pub use text::TextEditor;
pub use tri_state::TriStateEditor;

use rowsmith_core::CellValue;

/// Result of an editor interaction
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Still editing
    Pending,
    /// Write this value to the cell
    Commit(CellValue),
    /// Editing abandoned; the cell keeps this pre-edit value
    Cancel(CellValue),
}

impl EditOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EditOutcome::Pending)
    }
}

/// An open editor of any family
#[derive(Debug, Clone)]
pub enum CellEditor {
    Text(TextEditor),
    TriState(TriStateEditor),
    DatePicker(DatePickerState),
    Structured(StructuredEditor),
}

impl CellEditor {
    /// Abandon the edit, restoring the pre-edit value
    pub fn cancel(&mut self) -> EditOutcome {
        match self {
            CellEditor::Text(e) => e.cancel(),
            CellEditor::TriState(e) => e.cancel(),
            CellEditor::DatePicker(e) => e.cancel(),
            CellEditor::Structured(e) => e.cancel(),
        }
    }

    /// Value the cell held when the editor opened
    pub fn original(&self) -> &CellValue {
        match self {
            CellEditor::Text(e) => e.original(),
            CellEditor::TriState(e) => e.original(),
            CellEditor::DatePicker(e) => e.original(),
            CellEditor::Structured(e) => e.original(),
        }
    }
}
