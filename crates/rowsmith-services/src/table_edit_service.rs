//! Table edit orchestration
//!
//! Drives one table edit from load to confirmed schema:
//!
//! ```text
//! Idle -> Loaded -> Editing -> Submitting -> Success
//!                      ^            |
//!                      |            v
//!                      +-- refresh - Failed
//! ```
//!
//! All edits are synchronous in-memory changes to an [`EditSession`]. The
//! only suspension points are the schema fetch, the refresh after a failure
//! and the submit call itself. At most one submit is in flight per
//! orchestrator.

use std::sync::Arc;

use parking_lot::Mutex;
use rowsmith_core::{
    ColumnDefinition, ColumnType, ForeignKeyDefinition, SchemaDiff, SchemaService,
    TableDefinition,
};
use rowsmith_table_designer::{DesignError, DiffConflict, EditSession, TableEditEvent, TableLoader};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

const EVENT_CAPACITY: usize = 64;

/// Lifecycle state of a table edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Loaded,
    Editing,
    Submitting,
    Success,
    Failed,
}

/// A submit that has been started and must be finished
///
/// Produced by [`TableEditOrchestrator::begin_submit`]. Carries everything the
/// schema service needs so the caller can dispatch it without holding any
/// orchestrator state.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    id: Uuid,
    pub table: String,
    pub request: SubmitRequest,
}

impl SubmitTicket {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// What a submit sends to the schema service
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRequest {
    /// Alter an existing table
    Update(SchemaDiff),
    /// Create a table that does not exist yet
    Create {
        columns: Vec<ColumnDefinition>,
        foreign_keys: Vec<ForeignKeyDefinition>,
    },
}

struct EditInner {
    state: EditState,
    session: Option<EditSession>,
    /// Set after a failed submit until the base schema is fetched again
    stale_base: bool,
    in_flight: Option<Uuid>,
}

/// Orchestrates loading, editing and submitting one table's schema
pub struct TableEditOrchestrator {
    schema_service: Arc<dyn SchemaService>,
    inner: Mutex<EditInner>,
    events: broadcast::Sender<TableEditEvent>,
}

impl TableEditOrchestrator {
    pub fn new(schema_service: Arc<dyn SchemaService>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            schema_service,
            inner: Mutex::new(EditInner {
                state: EditState::Idle,
                session: None,
                stale_base: false,
                in_flight: None,
            }),
            events,
        }
    }

    /// Receive the events of this orchestrator
    pub fn subscribe(&self) -> broadcast::Receiver<TableEditEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> EditState {
        self.inner.lock().state
    }

    /// Whether a refresh is required before editing or submitting again
    pub fn needs_refresh(&self) -> bool {
        self.inner.lock().stale_base
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Option<EditSession> {
        self.inner.lock().session.clone()
    }

    /// Operations the current edits would submit
    pub fn diff(&self) -> Option<SchemaDiff> {
        self.inner.lock().session.as_ref().map(EditSession::diff)
    }

    /// Problems blocking a submit
    pub fn conflicts(&self) -> Vec<DiffConflict> {
        self.inner
            .lock()
            .session
            .as_ref()
            .map(EditSession::conflicts)
            .unwrap_or_default()
    }

    /// Fetch a table and start editing it, replacing any previous session
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, table_name: &str) -> ServiceResult<()> {
        if self.state() == EditState::Submitting {
            return Err(ServiceError::SubmitInProgress);
        }

        let session = TableLoader::load_table(self.schema_service.clone(), table_name)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to load table schema");
                ServiceError::SchemaLoadFailed(e.to_string())
            })?;

        {
            let mut inner = self.inner.lock();
            if inner.state == EditState::Submitting {
                return Err(ServiceError::SubmitInProgress);
            }
            inner.session = Some(session);
            inner.state = EditState::Loaded;
            inner.stale_base = false;
        }

        tracing::info!(table = %table_name, "table loaded for editing");
        self.emit(TableEditEvent::Loaded {
            table: table_name.to_string(),
        });
        Ok(())
    }

    /// Start designing a new table
    pub fn new_table(&self, name: &str) -> ServiceResult<()> {
        let mut inner = self.inner.lock();
        if inner.state == EditState::Submitting {
            return Err(ServiceError::SubmitInProgress);
        }
        inner.session = Some(EditSession::new_table(name));
        inner.state = EditState::Editing;
        inner.stale_base = false;
        tracing::info!(table = %name, "designing new table");
        Ok(())
    }

    /// Apply one edit to the session
    ///
    /// Allowed while loaded, editing or after a successful submit. Moves the
    /// orchestrator to `Editing` when the edit succeeds.
    pub fn edit<R>(
        &self,
        f: impl FnOnce(&mut EditSession) -> Result<R, DesignError>,
    ) -> ServiceResult<R> {
        let mut inner = self.inner.lock();
        match inner.state {
            EditState::Submitting => return Err(ServiceError::SubmitInProgress),
            EditState::Idle => {
                return Err(ServiceError::InvalidState("No table is being edited".into()));
            }
            EditState::Failed if inner.stale_base => return Err(ServiceError::StaleBase),
            _ => {}
        }

        let session = inner
            .session
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("No table is being edited".into()))?;
        let result = f(session)?;
        inner.state = EditState::Editing;
        Ok(result)
    }

    pub fn add_column(&self, name: &str, column_type: ColumnType) -> ServiceResult<()> {
        self.edit(|s| s.add_column(name, column_type).map(|_| ()))
    }

    pub fn remove_column(&self, name: &str) -> ServiceResult<()> {
        self.edit(|s| s.remove_column(name).map(|_| ()))
    }

    pub fn rename_column(&self, name: &str, new_name: &str) -> ServiceResult<()> {
        self.edit(|s| s.rename_column(name, new_name))
    }

    pub fn retype_column(&self, name: &str, column_type: ColumnType) -> ServiceResult<()> {
        self.edit(|s| s.retype_column(name, column_type))
    }

    pub fn add_foreign_key(&self, fk: ForeignKeyDefinition) -> ServiceResult<()> {
        self.edit(|s| s.add_foreign_key(fk))
    }

    pub fn remove_foreign_key(&self, column: &str) -> ServiceResult<()> {
        self.edit(|s| s.remove_foreign_key(column).map(|_| ()))
    }

    pub fn edit_foreign_key(&self, column: &str, update: ForeignKeyDefinition) -> ServiceResult<()> {
        self.edit(|s| s.edit_foreign_key(column, update))
    }

    /// Discard all edits of the session
    pub fn revert(&self) -> ServiceResult<()> {
        self.edit(|s| {
            s.revert();
            Ok(())
        })
    }

    /// Check the session and move to `Submitting`
    ///
    /// # Errors
    /// - `SubmitInProgress` while another submit has not finished
    /// - `StaleBase` after a failed submit until [`refresh_base`](Self::refresh_base)
    /// - `DiffConflict` when the edits have unresolved conflicts
    /// - `InvalidState` without a session or without changes
    pub fn begin_submit(&self) -> ServiceResult<SubmitTicket> {
        let mut inner = self.inner.lock();
        match inner.state {
            EditState::Submitting => return Err(ServiceError::SubmitInProgress),
            EditState::Failed if inner.stale_base => return Err(ServiceError::StaleBase),
            EditState::Idle => {
                return Err(ServiceError::InvalidState("No table is being edited".into()));
            }
            _ => {}
        }

        let session = inner
            .session
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidState("No table is being edited".into()))?;

        let conflicts = session.conflicts();
        if !conflicts.is_empty() {
            return Err(ServiceError::DiffConflict(conflicts));
        }

        let table = session.table_name().to_string();
        let request = if session.is_new() {
            let definition = session.clone().into_current();
            SubmitRequest::Create {
                columns: definition.columns,
                foreign_keys: definition.foreign_keys,
            }
        } else {
            let diff = session.diff();
            if diff.is_empty() {
                return Err(ServiceError::InvalidState("No changes to submit".into()));
            }
            SubmitRequest::Update(diff)
        };

        let ticket = SubmitTicket {
            id: Uuid::new_v4(),
            table,
            request,
        };
        inner.in_flight = Some(ticket.id);
        inner.state = EditState::Submitting;
        drop(inner);

        let (diff, is_new) = match &ticket.request {
            SubmitRequest::Update(diff) => (diff.clone(), false),
            SubmitRequest::Create { .. } => (SchemaDiff::default(), true),
        };
        tracing::info!(
            table = %ticket.table,
            operations = diff.operation_count(),
            is_new,
            "submitting schema changes"
        );
        self.emit(TableEditEvent::Submitted {
            table: ticket.table.clone(),
            diff,
            is_new,
        });
        Ok(ticket)
    }

    /// Record the outcome of a submit started with [`begin_submit`](Self::begin_submit)
    ///
    /// On success the confirmed schema becomes the new base: the one the
    /// service returned, or the old base with the diff applied. On failure
    /// every edit is kept and the base is marked stale.
    pub fn finish_submit(
        &self,
        ticket: SubmitTicket,
        outcome: rowsmith_core::Result<Option<TableDefinition>>,
    ) -> ServiceResult<TableDefinition> {
        let mut inner = self.inner.lock();
        if inner.state != EditState::Submitting || inner.in_flight != Some(ticket.id) {
            return Err(ServiceError::InvalidState(
                "Submit ticket does not match the submit in progress".into(),
            ));
        }
        inner.in_flight = None;

        match outcome {
            Ok(confirmed) => {
                let session = inner
                    .session
                    .as_ref()
                    .ok_or_else(|| ServiceError::InvalidState("No table is being edited".into()))?;
                let schema = match (confirmed, ticket.request) {
                    (Some(schema), _) => schema,
                    (None, SubmitRequest::Update(diff)) => diff.apply_to(session.original()),
                    (None, SubmitRequest::Create { .. }) => session.clone().into_current(),
                };

                inner.session = Some(EditSession::new(schema.clone()));
                inner.state = EditState::Success;
                inner.stale_base = false;
                drop(inner);

                tracing::info!(table = %schema.name, "schema changes saved");
                self.emit(TableEditEvent::Saved {
                    schema: schema.clone(),
                });
                Ok(schema)
            }
            Err(e) => {
                inner.state = EditState::Failed;
                inner.stale_base = true;
                drop(inner);

                tracing::error!(table = %ticket.table, error = %e, "schema update failed");
                self.emit(TableEditEvent::Failed {
                    table: ticket.table,
                    error: e.to_string(),
                });
                Err(ServiceError::Persistence(e.to_string()))
            }
        }
    }

    /// Submit the current edits
    ///
    /// After a failed submit the base schema is fetched again first and the
    /// edits are replayed on it.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self) -> ServiceResult<TableDefinition> {
        if self.needs_refresh() && self.state() == EditState::Failed {
            self.refresh_base().await?;
        }

        let ticket = self.begin_submit()?;
        let mut guard = SubmitGuard {
            orchestrator: self,
            id: Some(ticket.id),
        };
        let outcome = match &ticket.request {
            SubmitRequest::Update(diff) => {
                self.schema_service
                    .update_table_schema(&ticket.table, diff)
                    .await
            }
            SubmitRequest::Create {
                columns,
                foreign_keys,
            } => self
                .schema_service
                .create_table(&ticket.table, columns, foreign_keys)
                .await
                .map(|()| None),
        };
        guard.id = None;
        self.finish_submit(ticket, outcome)
    }

    /// Give up on a submit whose outcome will never be recorded
    ///
    /// The service may or may not have applied the change, so the session
    /// moves to `Failed` with a stale base and the next submit refreshes
    /// first. Does nothing when the ticket is not the one in flight.
    pub fn abandon_submit(&self, ticket: SubmitTicket) {
        self.abandon(ticket.id);
    }

    fn abandon(&self, id: Uuid) {
        let mut inner = self.inner.lock();
        if inner.state != EditState::Submitting || inner.in_flight != Some(id) {
            return;
        }
        inner.in_flight = None;
        inner.state = EditState::Failed;
        inner.stale_base = true;
        let table = inner
            .session
            .as_ref()
            .map(|s| s.table_name().to_string())
            .unwrap_or_default();
        drop(inner);

        tracing::warn!(table = %table, "submit abandoned before completion");
        self.emit(TableEditEvent::Failed {
            table,
            error: "Submit was abandoned before completion".to_string(),
        });
    }

    /// Fetch the authoritative schema and rebase the edits on it
    #[tracing::instrument(skip(self))]
    pub async fn refresh_base(&self) -> ServiceResult<()> {
        let (table_name, is_new) = {
            let inner = self.inner.lock();
            if inner.state == EditState::Submitting {
                return Err(ServiceError::SubmitInProgress);
            }
            let session = inner
                .session
                .as_ref()
                .ok_or_else(|| ServiceError::InvalidState("No table is being edited".into()))?;
            (session.original().name.clone(), session.is_new())
        };

        let fresh = if is_new {
            // A failed create leaves nothing to fetch
            None
        } else {
            let table = self
                .schema_service
                .get_table_schema(&table_name)
                .await
                .map_err(|e| ServiceError::SchemaLoadFailed(e.to_string()))?;
            Some(table)
        };

        let mut inner = self.inner.lock();
        if inner.state == EditState::Submitting {
            return Err(ServiceError::SubmitInProgress);
        }
        let session = inner
            .session
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("No table is being edited".into()))?;
        if let Some(fresh) = fresh {
            session.rebase(fresh);
        }
        let dirty = session.is_dirty();
        inner.stale_base = false;
        inner.state = if dirty {
            EditState::Editing
        } else {
            EditState::Loaded
        };

        tracing::debug!(table = %table_name, dirty, "schema base refreshed");
        Ok(())
    }

    /// Discard the session without persisting anything
    pub fn close(&self) -> ServiceResult<()> {
        let mut inner = self.inner.lock();
        if inner.state == EditState::Submitting {
            return Err(ServiceError::SubmitInProgress);
        }
        let session = inner.session.take();
        inner.state = EditState::Idle;
        inner.stale_base = false;
        drop(inner);

        if let Some(session) = session {
            tracing::debug!(table = %session.table_name(), "edit session closed");
            self.emit(TableEditEvent::Cancelled {
                table: session.table_name().to_string(),
            });
        }
        Ok(())
    }

    fn emit(&self, event: TableEditEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Abandons the in-flight submit if `submit()` is dropped before finishing
struct SubmitGuard<'a> {
    orchestrator: &'a TableEditOrchestrator,
    id: Option<Uuid>,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.orchestrator.abandon(id);
        }
    }
}
