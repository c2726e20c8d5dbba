//! Data grid engine for rowsmith
//!
//! Column definitions are dispatched to a [`CellDescriptor`] (renderer, editor,
//! sortable, editable) by the [`CellDispatchRegistry`]. Editors are plain state
//! machines; committing one is the only way a [`GridModel`] cell changes.
//! Foreign-key cells open a read-only [`ReferencePreview`] resolved through the
//! [`ForeignKeyResolver`].

pub mod editors;
mod error;
mod grid;
mod preview;
mod registry;
mod render;

pub use editors::{
    CellEditor, DatePickerMode, DatePickerState, EditOutcome, PickerView, StructuredEditor,
    TextEditor, TriStateEditor,
};
pub use error::EditorError;
pub use grid::{GridModel, PendingCellChange, PendingChanges, compare_cells};
pub use preview::{
    ForeignKeyResolver, PreviewController, PreviewResult, PreviewState, PreviewTicket,
    ReferencePreview, ResolvedReference,
};
pub use registry::{CellDescriptor, CellDispatchRegistry, CellFamily, EditorKind, RendererKind};
pub use render::{RenderedCell, render_cell};
