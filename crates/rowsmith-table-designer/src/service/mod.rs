//! Service layer for table editing
//!
//! Provides schema diffing and table loading.

mod schema_diff;
mod table_loader;

pub use schema_diff::SchemaDiffEngine;
pub use table_loader::TableLoader;
