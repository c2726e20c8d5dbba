//! Cell dispatch registry
//!
//! Maps a column (and its foreign key, if any) to a closed [`CellFamily`] and
//! from there to a fixed descriptor. Adding a family means adding one variant
//! and one arm in [`CellFamily::descriptor`].

use rowsmith_core::{
    CellValue, ColumnDefinition, ColumnType, ForeignKeyDefinition, TableDefinition, catalog_entry,
};

use crate::{
    CellEditor, DatePickerMode, DatePickerState, EditorError, StructuredEditor, TextEditor,
    TriStateEditor,
};

/// Type family a cell is dispatched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellFamily {
    /// Foreign-key reference
    Reference,
    /// Primary key / identity column
    Identity,
    Boolean,
    Date,
    DateTime,
    /// Structured (JSON) value
    Json,
    Text,
}

/// Read-mode renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    ReferencePreview,
    Identity,
    TriState,
    Date,
    DateTime,
    Structured,
    Text,
}

/// Write-mode editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    TriState,
    DatePicker(DatePickerMode),
    Structured,
    Text,
}

/// Renderer/editor pair and capabilities of one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDescriptor {
    pub column: String,
    pub family: CellFamily,
    pub renderer: RendererKind,
    /// `None` when the cell is read-only
    pub editor: Option<EditorKind>,
    pub sortable: bool,
    pub editable: bool,
}

impl CellFamily {
    fn renderer(self) -> RendererKind {
        match self {
            CellFamily::Reference => RendererKind::ReferencePreview,
            CellFamily::Identity => RendererKind::Identity,
            CellFamily::Boolean => RendererKind::TriState,
            CellFamily::Date => RendererKind::Date,
            CellFamily::DateTime => RendererKind::DateTime,
            CellFamily::Json => RendererKind::Structured,
            CellFamily::Text => RendererKind::Text,
        }
    }

    fn editor(self) -> Option<EditorKind> {
        match self {
            CellFamily::Reference | CellFamily::Identity => None,
            CellFamily::Boolean => Some(EditorKind::TriState),
            CellFamily::Date => Some(EditorKind::DatePicker(DatePickerMode::Date)),
            CellFamily::DateTime => Some(EditorKind::DatePicker(DatePickerMode::DateTime)),
            CellFamily::Json => Some(EditorKind::Structured),
            CellFamily::Text => Some(EditorKind::Text),
        }
    }

    fn sortable(self) -> bool {
        self != CellFamily::Json
    }
}

/// Selects renderers and editors for columns
#[derive(Debug, Clone)]
pub struct CellDispatchRegistry {
    references: bool,
    edits: bool,
}

impl Default for CellDispatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CellDispatchRegistry {
    /// Registry for the main grid
    pub fn new() -> Self {
        Self {
            references: true,
            edits: true,
        }
    }

    /// Registry for a reference preview: no reference cells, no edits
    pub fn reference_preview() -> Self {
        Self {
            references: false,
            edits: false,
        }
    }

    /// Family of a column, first match wins
    pub fn family(
        &self,
        column: &ColumnDefinition,
        foreign_key: Option<&ForeignKeyDefinition>,
    ) -> CellFamily {
        if self.references && foreign_key.is_some() {
            return CellFamily::Reference;
        }
        if column.is_primary_key {
            return CellFamily::Identity;
        }
        match column.column_type {
            ColumnType::Boolean => CellFamily::Boolean,
            ColumnType::Date => CellFamily::Date,
            ColumnType::DateTime => CellFamily::DateTime,
            ColumnType::Json => CellFamily::Json,
            _ => CellFamily::Text,
        }
    }

    pub fn descriptor(
        &self,
        column: &ColumnDefinition,
        foreign_key: Option<&ForeignKeyDefinition>,
    ) -> CellDescriptor {
        let family = self.family(column, foreign_key);
        // Types without a catalog entry are shown as text but never edited
        let known = catalog_entry(&column.column_type).is_some();
        let editor = family.editor().filter(|_| self.edits && known);

        CellDescriptor {
            column: column.name.clone(),
            family,
            renderer: family.renderer(),
            editable: editor.is_some(),
            editor,
            sortable: family.sortable(),
        }
    }

    /// Descriptors for every column of a table, in column order
    pub fn descriptors(&self, table: &TableDefinition) -> Vec<CellDescriptor> {
        table
            .columns
            .iter()
            .map(|c| self.descriptor(c, table.foreign_key_for(&c.name)))
            .collect()
    }

    /// Open the editor for a cell holding `current`
    pub fn open_editor(
        &self,
        column: &ColumnDefinition,
        foreign_key: Option<&ForeignKeyDefinition>,
        current: &CellValue,
    ) -> Result<CellEditor, EditorError> {
        let descriptor = self.descriptor(column, foreign_key);
        let Some(kind) = descriptor.editor else {
            return Err(EditorError::NotEditable(column.name.clone()));
        };

        tracing::debug!(column = %column.name, editor = ?kind, "opening cell editor");

        Ok(match kind {
            EditorKind::TriState => CellEditor::TriState(TriStateEditor::new(column, current)),
            EditorKind::DatePicker(mode) => {
                CellEditor::DatePicker(DatePickerState::new(mode, column, current))
            }
            EditorKind::Structured => {
                CellEditor::Structured(StructuredEditor::new(column, current))
            }
            EditorKind::Text => CellEditor::Text(TextEditor::new(column, current)),
        })
    }
}
