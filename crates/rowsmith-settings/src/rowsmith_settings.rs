//! rowsmith settings
//!
//! Editor settings loaded from `settings.toml`:
//! - Grid display (structured-cell truncation, null label)
//! - Reference preview fetch timeout
//! - Logging level and JSON file output

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod logging;
mod settings_file;

pub use settings_file::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EditorSettings {
    pub grid: GridSettings,
    pub preview: PreviewSettings,
    pub logging: LogSettings,
}

impl EditorSettings {
    /// Load settings from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse settings {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }
}

/// Grid display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Characters of a structured value shown in read mode before truncation
    pub json_preview_chars: usize,
    pub null_label: String,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            json_preview_chars: 80,
            null_label: "NULL".into(),
        }
    }
}

/// Reference preview settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub fetch_timeout_ms: u64,
}

impl PreviewSettings {
    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter; `RUST_LOG` takes precedence
    pub level: String,
    pub json_file: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json_file: false,
            log_dir: None,
        }
    }
}

impl LogSettings {
    /// Logging configuration for these settings, starting from `base`
    pub fn apply_to(&self, base: logging::LoggingConfig) -> logging::LoggingConfig {
        logging::LoggingConfig {
            log_dir: self.log_dir.clone().unwrap_or(base.log_dir),
            enable_json_logs: self.json_file,
            default_filter: self.level.clone(),
            ..base
        }
    }
}
