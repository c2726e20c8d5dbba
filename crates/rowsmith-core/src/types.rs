//! Core value types for rowsmith

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{ColumnType, RowsmithError, TableDefinition};

/// A single cell or form field value.
///
/// A value is owned by its row and only replaced through an editor commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string (also used for uuids and raw, unparsed input)
    String(String),
    /// Calendar date without time
    Date(NaiveDate),
    /// Local date and time, never shifted to a timezone
    DateTime(NaiveDateTime),
    /// Structured (JSON) value
    Json(serde_json::Value),
}

impl CellValue {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// NULL or an empty/whitespace-only string
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Try to get as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(v) => Some(*v),
            CellValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to a plain JSON value (dates become ISO strings)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Bool(v) => serde_json::Value::Bool(*v),
            CellValue::Integer(v) => serde_json::Value::from(*v),
            CellValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::String(v) => serde_json::Value::String(v.clone()),
            CellValue::Date(v) => serde_json::Value::String(v.format("%Y-%m-%d").to_string()),
            CellValue::DateTime(v) => {
                serde_json::Value::String(v.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            CellValue::Json(v) => v.clone(),
        }
    }

    /// Build a value from JSON without any column type information
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            serde_json::Value::String(s) => CellValue::String(s.clone()),
            other => CellValue::Json(other.clone()),
        }
    }

    /// Build a value from JSON, interpreting it according to the column type.
    ///
    /// Strings that do not parse as the declared date type stay strings so the
    /// grid can still show them.
    pub fn from_json_typed(value: &serde_json::Value, column_type: &ColumnType) -> Self {
        if value.is_null() {
            return CellValue::Null;
        }
        match (column_type, value) {
            (ColumnType::Json, v) => CellValue::Json(v.clone()),
            (ColumnType::Date, serde_json::Value::String(s)) => parse_date(s)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::String(s.clone())),
            (ColumnType::DateTime, serde_json::Value::String(s)) => parse_datetime(s)
                .map(CellValue::DateTime)
                .unwrap_or_else(|| CellValue::String(s.clone())),
            (ColumnType::Float, serde_json::Value::Number(n)) => {
                n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null)
            }
            (_, v) => Self::from_json(v),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Bool(v) => write!(f, "{}", v),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::String(v) => write!(f, "{}", v),
            CellValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            CellValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

/// A record: column name to value, in column order
pub type Record = IndexMap<String, CellValue>;

/// Field values submitted to or produced by a record form
pub type FieldMap = IndexMap<String, CellValue>;

/// Identifier of a persisted record (primary key value, as text)
pub type RecordId = String;

/// Serialize a record as a JSON object
pub fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

/// Parse a JSON object into a record, typing each field by the table's columns.
///
/// Fields with no matching column are kept untyped.
pub fn record_from_json(
    value: &serde_json::Value,
    table: &TableDefinition,
) -> crate::Result<Record> {
    let object = value.as_object().ok_or_else(|| {
        RowsmithError::Schema(format!("Expected a JSON object for a row of '{}'", table.name))
    })?;

    let mut record = Record::new();
    for column in &table.columns {
        if let Some(v) = object.get(&column.name) {
            record.insert(
                column.name.clone(),
                CellValue::from_json_typed(v, &column.column_type),
            );
        }
    }
    for (key, v) in object {
        if !record.contains_key(key) {
            record.insert(key.clone(), CellValue::from_json(v));
        }
    }
    Ok(record)
}

/// Parse a date (`YYYY-MM-DD`), accepting the date part of a datetime string
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse a local datetime.
///
/// RFC 3339 input keeps its wall-clock time; the offset is dropped rather than
/// applied.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let trimmed = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Parse a truthy/falsy literal as used in column defaults
pub fn parse_truthy(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
