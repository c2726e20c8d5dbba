//! Read-mode cell rendering

use rowsmith_core::{CellValue, parse_date, parse_datetime, parse_truthy};
use rowsmith_settings::GridSettings;

use crate::{CellDescriptor, RendererKind};

/// Display text of a cell in read mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCell {
    pub text: String,
    pub renderer: RendererKind,
    pub is_null: bool,
    /// Structured value shortened for display
    pub truncated: bool,
    /// Opens a reference preview when activated
    pub is_link: bool,
}

pub fn render_cell(
    descriptor: &CellDescriptor,
    value: &CellValue,
    settings: &GridSettings,
) -> RenderedCell {
    let renderer = descriptor.renderer;
    let mut cell = RenderedCell {
        text: String::new(),
        renderer,
        is_null: value.is_null(),
        truncated: false,
        is_link: false,
    };

    if value.is_null() {
        cell.text = settings.null_label.clone();
        return cell;
    }

    cell.text = match renderer {
        RendererKind::TriState => match value {
            CellValue::Bool(b) => b.to_string(),
            CellValue::String(s) => parse_truthy(s)
                .map(|b| b.to_string())
                .unwrap_or_else(|| s.clone()),
            CellValue::Integer(i) => (*i != 0).to_string(),
            other => other.to_string(),
        },
        RendererKind::Date => match value {
            CellValue::String(s) => parse_date(s)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| s.clone()),
            CellValue::DateTime(dt) => dt.date().format("%Y-%m-%d").to_string(),
            other => other.to_string(),
        },
        RendererKind::DateTime => match value {
            CellValue::String(s) => parse_datetime(s)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| s.clone()),
            other => other.to_string(),
        },
        RendererKind::Structured => {
            let compact = match value {
                CellValue::Json(v) => v.to_string(),
                other => other.to_string(),
            };
            let (text, truncated) = truncate(&compact, settings.json_preview_chars);
            cell.truncated = truncated;
            text
        }
        RendererKind::ReferencePreview => {
            cell.is_link = true;
            value.to_string()
        }
        RendererKind::Identity | RendererKind::Text => value.to_string(),
    };
    cell
}

fn truncate(text: &str, max_chars: usize) -> (String, bool) {
    if text.chars().count() <= max_chars {
        return (text.to_string(), false);
    }
    let mut shortened: String = text.chars().take(max_chars).collect();
    shortened.push('…');
    (shortened, true)
}
