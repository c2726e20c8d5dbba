//! `rowsmith` command-line front end
//!
//! Drives the editing engine against JSON table definitions:
//!
//! ```text
//! rowsmith diff --original users.json --edited users.edited.json
//! rowsmith form --schema users.json
//! rowsmith grid --schema users.json --rows users.rows.json
//! rowsmith apply --store ./schemas users --rename age=years --add email:string
//! ```

mod commands;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use rowsmith_core::ColumnType;
use rowsmith_settings::EditorSettings;
use rowsmith_settings::logging::{self, LoggingConfig};

use crate::commands::{ApplyRequest, OutputFormat};
use crate::store::FileSchemaStore;

#[derive(Parser)]
#[command(name = "rowsmith", version, about = "Schema-driven table and record editor")]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "ROWSMITH_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overriding the settings file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the operations turning one table definition into another
    Diff {
        #[arg(long)]
        original: PathBuf,
        /// Edited definition; columns carry `originalName` tags
        #[arg(long)]
        edited: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the record-creation form of a table
    Form {
        #[arg(long)]
        schema: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Render rows the way the grid displays them
    Grid {
        #[arg(long)]
        schema: PathBuf,
        /// JSON array of row objects
        #[arg(long)]
        rows: PathBuf,
    },
    /// Edit a table in a directory of `<table>.json` files
    Apply {
        #[arg(long, env = "ROWSMITH_STORE")]
        store: PathBuf,
        table: String,
        /// Create the table instead of loading it
        #[arg(long)]
        create: bool,
        /// Drop a column
        #[arg(long, value_name = "NAME")]
        drop: Vec<String>,
        /// Rename a column
        #[arg(long, value_name = "OLD=NEW", value_parser = parse_rename)]
        rename: Vec<(String, String)>,
        /// Change a column's type
        #[arg(long, value_name = "NAME:TYPE", value_parser = parse_typed_column)]
        retype: Vec<(String, ColumnType)>,
        /// Add a column with the catalog defaults of its type
        #[arg(long, value_name = "NAME:TYPE", value_parser = parse_typed_column)]
        add: Vec<(String, ColumnType)>,
        /// Print the operations without submitting them
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_rename(value: &str) -> Result<(String, String)> {
    let (from, to) = value
        .split_once('=')
        .ok_or_else(|| anyhow!("expected OLD=NEW, got '{}'", value))?;
    Ok((from.trim().to_string(), to.trim().to_string()))
}

fn parse_typed_column(value: &str) -> Result<(String, ColumnType)> {
    let (name, column_type) = value
        .split_once(':')
        .ok_or_else(|| anyhow!("expected NAME:TYPE, got '{}'", value))?;
    Ok((name.trim().to_string(), ColumnType::parse(column_type)))
}

fn load_settings(path: Option<&PathBuf>) -> Result<EditorSettings> {
    match path {
        Some(path) => EditorSettings::load_from(path),
        None => EditorSettings::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_ref())?;

    let mut log_config = settings.logging.apply_to(LoggingConfig {
        enable_json_logs: false,
        ..LoggingConfig::production()
    });
    if let Some(level) = &cli.log_level {
        log_config.default_filter = level.clone();
    }
    logging::init(log_config).context("Failed to initialize logging")?;

    let output = match cli.command {
        Commands::Diff {
            original,
            edited,
            format,
        } => {
            let original = commands::read_table(&original)?;
            let edited = commands::read_table(&edited)?;
            commands::diff_tables(&original, &edited, format)?
        }
        Commands::Form { schema, format } => {
            let table = commands::read_table(&schema)?;
            commands::describe_form(&table, format)?
        }
        Commands::Grid { schema, rows } => {
            let table = commands::read_table(&schema)?;
            let content = std::fs::read_to_string(&rows)
                .with_context(|| format!("Failed to read rows {:?}", rows))?;
            let rows: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse rows {:?}", rows))?;
            commands::render_grid(&table, &rows, &settings.grid)?
        }
        Commands::Apply {
            store,
            table,
            create,
            drop,
            rename,
            retype,
            add,
            dry_run,
        } => {
            tracing::info!(store = %store.display(), table = %table, "applying table edits");
            let request = ApplyRequest {
                table,
                create,
                drop,
                rename,
                retype,
                add,
                dry_run,
            };
            commands::apply_edits(Arc::new(FileSchemaStore::new(store)), request).await?
        }
    };

    println!("{}", output);
    Ok(())
}
