//! Rowsmith Core - data model and collaborator traits for the table editor
//!
//! This crate provides the fundamental types every other rowsmith crate
//! depends on:
//!
//! - `ColumnDefinition`, `ForeignKeyDefinition`, `TableDefinition` - table metadata
//! - `SchemaDiff` - the operation set sent to the schema service
//! - `CellValue` - the tagged value held by a grid cell or form field
//! - `catalog` - the static column type catalog
//! - `SchemaService` / `RecordService` - external collaborators

pub mod catalog;
mod error;
mod schema;
mod service;
mod types;

pub use catalog::{InputWidget, TypeCatalogEntry, catalog_entry};
pub use error::*;
pub use schema::*;
pub use service::*;
pub use types::*;
