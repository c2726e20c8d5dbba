//! Models for table editing
//!
//! The edit session and the errors it and the diff engine report.

mod edit_session;
mod validation;

pub use edit_session::{DirtyFlags, EditSession};
pub use validation::{DesignError, DiffConflict};
