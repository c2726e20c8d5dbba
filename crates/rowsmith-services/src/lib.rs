//! Rowsmith Services Layer
//!
//! This crate provides the service layer that sits between a host UI and the
//! editing engine. Services orchestrate schema and record operations against
//! the external collaborators and provide a clean API for the host.
//!
//! # Architecture
//!
//! ```text
//! Host UI / CLI (rowsmith-cli)
//!     ↓
//! Service Layer (rowsmith-services) ← This crate
//!     ↓
//! Engine (rowsmith-table-designer, rowsmith-forms, rowsmith-grid)
//!     ↓
//! Data model and collaborator traits (rowsmith-core)
//! ```
//!
//! # Services
//!
//! - [`TableEditOrchestrator`] - Load, edit and submit one table's schema
//! - [`RecordFormService`] - Validated record create/update/delete and grid saves

mod error;
mod record_service;
mod table_edit_service;

pub use error::{ServiceError, ServiceResult};
pub use record_service::{GridSaveSummary, RecordFormService};
pub use table_edit_service::{EditState, SubmitRequest, SubmitTicket, TableEditOrchestrator};
