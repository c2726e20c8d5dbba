//! Foreign-key reference previews
//!
//! A preview is fetched only while it is open. Each open bumps a generation
//! counter; a fetch result carrying an older generation is dropped so a
//! closed or replaced preview never shows stale data.

use std::sync::Arc;
use std::time::Duration;

use rowsmith_core::{
    CellValue, ForeignKeyDefinition, Record, RecordService, RowsmithError, SchemaService,
    TableDefinition,
};
use rowsmith_settings::PreviewSettings;

use crate::{CellDispatchRegistry, GridModel};

/// The referenced row together with its table schema
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReference {
    pub record: Record,
    pub schema: TableDefinition,
}

/// What a reference preview shows
#[derive(Debug, Clone)]
pub enum ReferencePreview {
    /// The cell has no value; nothing was fetched
    NullValue,
    /// No row matched the value
    NotFound { table: String, column: String },
    /// Single-row, read-only grid of the referenced row
    Loaded(Box<GridModel>),
    Failed(String),
}

impl ReferencePreview {
    /// Message for states without a grid
    pub fn message(&self) -> Option<String> {
        match self {
            ReferencePreview::NullValue => Some("null".to_string()),
            ReferencePreview::NotFound { .. } => Some("Failed to load record".to_string()),
            ReferencePreview::Failed(error) => Some(format!("Failed to load record: {}", error)),
            ReferencePreview::Loaded(_) => None,
        }
    }
}

/// Resolves reference cells to the row they point at
pub struct ForeignKeyResolver {
    records: Arc<dyn RecordService>,
    schemas: Arc<dyn SchemaService>,
    timeout: Duration,
}

impl ForeignKeyResolver {
    pub fn new(
        records: Arc<dyn RecordService>,
        schemas: Arc<dyn SchemaService>,
        settings: &PreviewSettings,
    ) -> Self {
        Self {
            records,
            schemas,
            timeout: settings.fetch_timeout(),
        }
    }

    /// Fetch the referenced row and its schema.
    ///
    /// Returns `Ok(None)` when the value is absent or no row matches.
    #[tracing::instrument(skip(self, value), fields(table = %foreign_key.reference_table, column = %foreign_key.reference_column))]
    pub async fn resolve(
        &self,
        foreign_key: &ForeignKeyDefinition,
        value: &CellValue,
    ) -> Result<Option<ResolvedReference>, RowsmithError> {
        if value.is_blank() {
            return Ok(None);
        }

        let table = foreign_key.reference_table.as_str();
        let fetch = async {
            futures::try_join!(
                self.records.get_record_by_foreign_key_value(
                    table,
                    &foreign_key.reference_column,
                    value
                ),
                self.schemas.get_table_schema(table),
            )
        };

        let (record, schema) = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| {
                RowsmithError::Timeout(format!("reference preview for {} timed out", table))
            })??;

        match record {
            Some(record) => Ok(Some(ResolvedReference { record, schema })),
            None => {
                tracing::debug!("no referenced row");
                Ok(None)
            }
        }
    }

    /// Resolve and build the preview to show
    pub async fn preview(
        &self,
        foreign_key: &ForeignKeyDefinition,
        value: &CellValue,
    ) -> ReferencePreview {
        if value.is_blank() {
            return ReferencePreview::NullValue;
        }
        match self.resolve(foreign_key, value).await {
            Ok(Some(resolved)) => ReferencePreview::Loaded(Box::new(GridModel::new(
                resolved.schema,
                &[resolved.record],
                &CellDispatchRegistry::reference_preview(),
            ))),
            Ok(None) => ReferencePreview::NotFound {
                table: foreign_key.reference_table.clone(),
                column: foreign_key.reference_column.clone(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "reference preview failed");
                ReferencePreview::Failed(e.to_string())
            }
        }
    }

    /// Run the fetch for an open ticket
    pub async fn fetch(&self, ticket: PreviewTicket) -> PreviewResult {
        let preview = self.preview(&ticket.foreign_key, &ticket.value).await;
        PreviewResult {
            generation: ticket.generation,
            preview,
        }
    }
}

/// Preview state of one grid
#[derive(Debug, Clone, Default)]
pub enum PreviewState {
    #[default]
    Closed,
    Loading,
    Ready(ReferencePreview),
}

/// A fetch to run for an open preview
#[derive(Debug, Clone)]
pub struct PreviewTicket {
    pub generation: u64,
    pub foreign_key: ForeignKeyDefinition,
    pub value: CellValue,
}

/// A finished fetch, tagged with the generation it was started for
#[derive(Debug, Clone)]
pub struct PreviewResult {
    pub generation: u64,
    pub preview: ReferencePreview,
}

/// Tracks the open preview and discards stale fetch results
#[derive(Debug, Default)]
pub struct PreviewController {
    generation: u64,
    state: PreviewState,
}

impl PreviewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, PreviewState::Closed)
    }

    /// Open a preview. Returns the fetch to run, or `None` when the value is
    /// absent and the null indicator is shown without fetching.
    pub fn open(&mut self, foreign_key: &ForeignKeyDefinition, value: &CellValue) -> Option<PreviewTicket> {
        self.generation += 1;
        if value.is_blank() {
            self.state = PreviewState::Ready(ReferencePreview::NullValue);
            return None;
        }
        self.state = PreviewState::Loading;
        Some(PreviewTicket {
            generation: self.generation,
            foreign_key: foreign_key.clone(),
            value: value.clone(),
        })
    }

    /// Close the preview; in-flight results become stale
    pub fn close(&mut self) {
        self.generation += 1;
        self.state = PreviewState::Closed;
    }

    /// Apply a finished fetch. Returns false when it was stale and dropped.
    pub fn apply(&mut self, result: PreviewResult) -> bool {
        if result.generation != self.generation || !matches!(self.state, PreviewState::Loading) {
            tracing::debug!(
                result_generation = result.generation,
                current_generation = self.generation,
                "discarding stale reference preview"
            );
            return false;
        }
        self.state = PreviewState::Ready(result.preview);
        true
    }
}
