//! Command implementations
//!
//! Each command returns its output as a string so it can be printed or
//! inspected in tests.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use comfy_table::{ContentArrangement, Table};
use rowsmith_core::{
    ColumnDefinition, ColumnType, ForeignKeyDefinition, SchemaDiff, TableDefinition,
    record_from_json, record_to_json,
};
use rowsmith_forms::DynamicValidationBuilder;
use rowsmith_grid::{CellDispatchRegistry, GridModel};
use rowsmith_services::{ServiceError, TableEditOrchestrator};
use rowsmith_settings::GridSettings;
use rowsmith_table_designer::{DiffConflict, SchemaDiffEngine};
use serde_json::json;

use crate::store::FileSchemaStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn read_table(path: &Path) -> Result<TableDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read table definition {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse table definition {:?}", path))
}

/// Diff two table definitions; the edited one carries `originalName` tags
pub fn diff_tables(
    original: &TableDefinition,
    edited: &TableDefinition,
    format: OutputFormat,
) -> Result<String> {
    let diff = SchemaDiffEngine::diff(original, edited);
    let conflicts = SchemaDiffEngine::detect_conflicts(original, edited);

    match format {
        OutputFormat::Json => {
            let conflicts: Vec<String> = conflicts.iter().map(ToString::to_string).collect();
            Ok(serde_json::to_string_pretty(
                &json!({ "diff": diff, "conflicts": conflicts }),
            )?)
        }
        OutputFormat::Table => Ok(diff_table(&diff, &conflicts)),
    }
}

fn diff_table(diff: &SchemaDiff, conflicts: &[DiffConflict]) -> String {
    if diff.is_empty() && conflicts.is_empty() {
        return "No changes".to_string();
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Operation", "Column", "Detail"]);

    for fk in &diff.drop_foreign_keys {
        table.add_row(vec![
            "drop foreign key".to_string(),
            fk.column_name.clone(),
            reference(fk),
        ]);
    }
    for name in &diff.drop_columns {
        table.add_row(vec!["drop column".to_string(), name.clone(), String::new()]);
    }
    for (from, to) in &diff.rename_columns {
        table.add_row(vec![
            "rename column".to_string(),
            from.clone(),
            format!("-> {}", to),
        ]);
    }
    for column in &diff.alter_columns {
        table.add_row(vec![
            "alter column".to_string(),
            column.name.clone(),
            column_detail(column),
        ]);
    }
    for column in &diff.add_columns {
        table.add_row(vec![
            "add column".to_string(),
            column.name.clone(),
            column_detail(column),
        ]);
    }
    for fk in &diff.add_foreign_keys {
        table.add_row(vec![
            "add foreign key".to_string(),
            fk.column_name.clone(),
            reference(fk),
        ]);
    }

    let mut output = table.to_string();
    for conflict in conflicts {
        output.push_str(&format!("\nconflict: {}", conflict));
    }
    output
}

fn column_detail(column: &ColumnDefinition) -> String {
    let mut detail = vec![column.column_type.to_string()];
    if !column.is_nullable {
        detail.push("not null".into());
    }
    if column.is_unique {
        detail.push("unique".into());
    }
    if let Some(default) = column.effective_default() {
        detail.push(format!("default {}", default));
    }
    detail.join(", ")
}

fn reference(fk: &ForeignKeyDefinition) -> String {
    format!(
        "-> {}.{} (on delete {}, on update {})",
        fk.reference_table, fk.reference_column, fk.on_delete, fk.on_update
    )
}

/// Describe the record form of a table
pub fn describe_form(table: &TableDefinition, format: OutputFormat) -> Result<String> {
    let form = DynamicValidationBuilder::build_form(table);

    match format {
        OutputFormat::Json => {
            let fields: Vec<serde_json::Value> = form
                .fields
                .iter()
                .map(|f| {
                    json!({
                        "name": f.name,
                        "label": f.label,
                        "type": f.column_type,
                        "widget": f.widget.as_ref().map(|w| format!("{:?}", w)),
                        "required": f.required,
                        "placeholder": f.placeholder,
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&json!({
                "table": form.table,
                "fields": fields,
                "initialValues": record_to_json(&form.initial_values),
            }))?)
        }
        OutputFormat::Table => {
            let mut output = Table::new();
            output
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Field", "Label", "Type", "Widget", "Required", "Initial"]);
            for field in &form.fields {
                let initial = form
                    .initial_values
                    .get(&field.name)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                output.add_row(vec![
                    field.name.clone(),
                    field.label.clone(),
                    field.column_type.to_string(),
                    field
                        .widget
                        .as_ref()
                        .map(|w| format!("{:?}", w))
                        .unwrap_or_else(|| "-".into()),
                    if field.required { "yes" } else { "no" }.to_string(),
                    field.placeholder.clone().unwrap_or(initial),
                ]);
            }
            Ok(output.to_string())
        }
    }
}

/// Render rows of a table the way the grid shows them in read mode
pub fn render_grid(
    table: &TableDefinition,
    rows: &serde_json::Value,
    settings: &GridSettings,
) -> Result<String> {
    let Some(rows) = rows.as_array() else {
        bail!("Rows must be a JSON array of objects");
    };
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| record_from_json(row, table).with_context(|| format!("Row {}", i)))
        .collect::<Result<Vec<_>>>()?;

    let registry = CellDispatchRegistry::new();
    let grid = GridModel::new(table.clone(), &records, &registry);

    let header: Vec<String> = table
        .columns
        .iter()
        .map(|c| match table.foreign_key_for(&c.name) {
            Some(fk) => format!("{} -> {}", c.name, fk.reference_table),
            None => c.name.clone(),
        })
        .collect();

    let mut output = Table::new();
    output
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for row in grid.render_all(settings) {
        output.add_row(row.into_iter().map(|cell| cell.text).collect::<Vec<_>>());
    }
    Ok(output.to_string())
}

/// Edits requested on the command line, applied in this order
#[derive(Debug, Clone, Default)]
pub struct ApplyRequest {
    pub table: String,
    pub create: bool,
    pub drop: Vec<String>,
    pub rename: Vec<(String, String)>,
    pub retype: Vec<(String, ColumnType)>,
    pub add: Vec<(String, ColumnType)>,
    pub dry_run: bool,
}

/// Edit a stored table through the orchestrator and submit the result
pub async fn apply_edits(store: Arc<FileSchemaStore>, request: ApplyRequest) -> Result<String> {
    let orchestrator = TableEditOrchestrator::new(store);

    if request.create {
        orchestrator.new_table(&request.table)?;
    } else {
        orchestrator.load(&request.table).await?;
    }

    for name in &request.drop {
        orchestrator.remove_column(name)?;
    }
    for (from, to) in &request.rename {
        orchestrator.rename_column(from, to)?;
    }
    for (name, column_type) in &request.retype {
        orchestrator.retype_column(name, column_type.clone())?;
    }
    for (name, column_type) in &request.add {
        orchestrator.add_column(name, column_type.clone())?;
    }

    let diff = orchestrator.diff().unwrap_or_default();
    let conflicts = orchestrator.conflicts();
    let summary = diff_table(&diff, &conflicts);
    if request.dry_run {
        return Ok(summary);
    }

    match orchestrator.submit().await {
        Ok(schema) => Ok(format!(
            "{}\nSaved table '{}' ({} columns)",
            summary,
            schema.name,
            schema.columns.len()
        )),
        Err(ServiceError::DiffConflict(conflicts)) => {
            bail!("{}\nRefusing to submit: {} conflict(s)", summary, conflicts.len())
        }
        Err(e) => Err(e.into()),
    }
}
