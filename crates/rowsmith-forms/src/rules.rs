//! Per-type value rules

use rowsmith_core::{CellValue, ColumnType, InputWidget, catalog_entry, parse_date, parse_datetime};

/// Value rule applied to one form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Json,
    Uuid,
    /// Accepts any value. Used for types the catalog does not know so the
    /// form stays usable.
    PassThrough,
}

impl FieldRule {
    /// Select the rule for a column type through the type catalog
    pub fn for_type(column_type: &ColumnType) -> Self {
        let Some(entry) = catalog_entry(column_type) else {
            return FieldRule::PassThrough;
        };
        match entry.widget {
            InputWidget::Text => FieldRule::Text,
            InputWidget::Integer => FieldRule::Integer,
            InputWidget::Decimal => FieldRule::Float,
            InputWidget::TriState => FieldRule::Boolean,
            InputWidget::DatePicker => FieldRule::Date,
            InputWidget::DateTimePicker => FieldRule::DateTime,
            InputWidget::StructuredEditor => FieldRule::Json,
            InputWidget::Uuid => FieldRule::Uuid,
        }
    }

    /// Rules whose empty input means "no value" rather than an empty string
    fn blank_is_absent(&self) -> bool {
        !matches!(self, FieldRule::Text | FieldRule::PassThrough | FieldRule::Boolean)
    }

    /// Check a present, non-absent value and return its normalized form
    pub(crate) fn coerce(&self, value: &CellValue) -> Result<CellValue, String> {
        match self {
            FieldRule::PassThrough => Ok(value.clone()),
            FieldRule::Text => Ok(match value {
                CellValue::String(_) => value.clone(),
                other => CellValue::String(other.to_string()),
            }),
            FieldRule::Boolean => match value {
                CellValue::Bool(_) => Ok(value.clone()),
                _ => Err("must be true or false".to_string()),
            },
            FieldRule::Integer => match value {
                CellValue::Integer(_) => Ok(value.clone()),
                // 2^63 itself is excluded; it does not fit in an i64
                CellValue::Float(f)
                    if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f) =>
                {
                    Ok(CellValue::Integer(*f as i64))
                }
                CellValue::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(CellValue::Integer)
                    .map_err(|_| "must be a whole number".to_string()),
                _ => Err("must be a whole number".to_string()),
            },
            FieldRule::Float => match value {
                CellValue::Integer(i) => Ok(CellValue::Float(*i as f64)),
                CellValue::Float(f) if f.is_finite() => Ok(value.clone()),
                CellValue::String(s) => match s.trim().parse::<f64>() {
                    Ok(f) if f.is_finite() => Ok(CellValue::Float(f)),
                    _ => Err("must be a number".to_string()),
                },
                _ => Err("must be a number".to_string()),
            },
            FieldRule::Date => match value {
                CellValue::Date(_) => Ok(value.clone()),
                CellValue::DateTime(dt) => Ok(CellValue::Date(dt.date())),
                CellValue::String(s) => parse_date(s)
                    .map(CellValue::Date)
                    .ok_or_else(|| "must be a date (YYYY-MM-DD)".to_string()),
                _ => Err("must be a date (YYYY-MM-DD)".to_string()),
            },
            FieldRule::DateTime => match value {
                CellValue::DateTime(_) => Ok(value.clone()),
                CellValue::Date(d) => Ok(CellValue::DateTime(d.and_time(chrono::NaiveTime::MIN))),
                CellValue::String(s) => parse_datetime(s)
                    .map(CellValue::DateTime)
                    .ok_or_else(|| "must be a date and time (YYYY-MM-DD HH:MM)".to_string()),
                _ => Err("must be a date and time (YYYY-MM-DD HH:MM)".to_string()),
            },
            FieldRule::Json => match value {
                CellValue::Json(_) => Ok(value.clone()),
                CellValue::String(s) => serde_json::from_str::<serde_json::Value>(s)
                    .map(CellValue::Json)
                    .map_err(|e| format!("must be valid JSON ({})", e)),
                other => Ok(CellValue::Json(other.to_json())),
            },
            FieldRule::Uuid => match value {
                CellValue::String(s) => uuid::Uuid::parse_str(s.trim())
                    .map(|u| CellValue::String(u.hyphenated().to_string()))
                    .map_err(|_| "must be a valid UUID".to_string()),
                _ => Err("must be a valid UUID".to_string()),
            },
        }
    }

    /// Apply the rule including nullability.
    ///
    /// `has_default` lets a non-nullable field stay empty when the store fills
    /// it in.
    pub(crate) fn check(
        &self,
        value: &CellValue,
        nullable: bool,
        has_default: bool,
    ) -> Result<CellValue, String> {
        if *self == FieldRule::PassThrough {
            return Ok(value.clone());
        }

        if value.is_null() {
            // Booleans never fall back to a default for an explicit null
            let allowed = nullable || (has_default && *self != FieldRule::Boolean);
            return if allowed {
                Ok(CellValue::Null)
            } else {
                Err("is required".to_string())
            };
        }

        if value.is_blank() && *self != FieldRule::Boolean {
            if !nullable && !has_default {
                return Err("is required".to_string());
            }
            if self.blank_is_absent() {
                return Ok(CellValue::Null);
            }
        }

        self.coerce(value)
    }
}
