//! Table designer for rowsmith
//!
//! Edits a table's structure in memory and computes the operations that turn
//! the loaded schema into the edited one.
//!
//! ## Features
//!
//! - Edit sessions holding the original and current snapshot plus dirty flags
//! - Column add/remove/rename/retype and foreign key add/remove/edit
//! - Schema diffing with rename tracking through `original_name` tags
//! - Conflict detection before submit (rename collisions, dangling foreign keys)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rowsmith_table_designer::{EditSession, SchemaDiffEngine, TableLoader};
//!
//! let mut session = TableLoader::load_table(schema_service, "users").await?;
//! session.rename_column("age", "years")?;
//!
//! let conflicts = session.conflicts();
//! let diff = session.diff();
//! ```

pub mod events;
pub mod models;
pub mod service;

pub use events::TableEditEvent;
pub use models::{DesignError, DiffConflict, DirtyFlags, EditSession};
pub use service::{SchemaDiffEngine, TableLoader};
