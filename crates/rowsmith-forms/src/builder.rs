//! Form synthesis from column definitions

use rowsmith_core::{
    CellValue, ColumnDefinition, ColumnType, FieldMap, TableDefinition, parse_date,
    parse_datetime, parse_truthy,
};

use crate::{FieldRule, FieldValidator, FormField, RecordForm, ValidationSchema};

/// Builds validation schemas and initial values from column definitions
pub struct DynamicValidationBuilder;

impl DynamicValidationBuilder {
    /// Build the complete record-creation form for a table
    #[tracing::instrument(skip(table), fields(table = %table.name))]
    pub fn build_form(table: &TableDefinition) -> RecordForm {
        let columns: Vec<&ColumnDefinition> = Self::form_columns(&table.columns).collect();

        let fields = columns
            .iter()
            .map(|c| {
                FormField::new(
                    &c.name,
                    &c.column_type,
                    !c.is_nullable && c.effective_default().is_none(),
                    Self::placeholder(c),
                )
            })
            .collect();

        let form = RecordForm {
            table: table.name.clone(),
            fields,
            schema: Self::build_schema(columns.iter().copied()),
            initial_values: Self::initial_values(columns.iter().copied()),
        };
        tracing::debug!(fields = form.fields.len(), "built record form");
        form
    }

    /// Build the validation schema. System columns are skipped.
    pub fn build_schema<'a>(
        columns: impl IntoIterator<Item = &'a ColumnDefinition>,
    ) -> ValidationSchema {
        let mut schema = ValidationSchema::default();
        for column in columns.into_iter().filter(|c| !c.is_system()) {
            let rule = FieldRule::for_type(&column.column_type);
            if rule == FieldRule::PassThrough {
                tracing::debug!(
                    column = %column.name,
                    column_type = %column.column_type,
                    "no catalog entry, accepting any value"
                );
            }
            schema.insert(FieldValidator {
                field: column.name.clone(),
                rule,
                nullable: column.is_nullable,
                has_default: column.effective_default().is_some(),
            });
        }
        schema
    }

    /// Initial values for a new record. System columns are skipped.
    pub fn initial_values<'a>(columns: impl IntoIterator<Item = &'a ColumnDefinition>) -> FieldMap {
        columns
            .into_iter()
            .filter(|c| !c.is_system())
            .map(|c| (c.name.clone(), Self::initial_value(c)))
            .collect()
    }

    /// Initial value for one column, derived from its raw default
    pub fn initial_value(column: &ColumnDefinition) -> CellValue {
        let raw = column.effective_default();
        let literal = raw.map(unquote_literal);
        let literal = literal.as_deref();

        match &column.column_type {
            ColumnType::String => match literal {
                Some(s) => CellValue::String(s.to_string()),
                None if column.is_nullable => CellValue::Null,
                None => CellValue::String(String::new()),
            },
            ColumnType::Integer => literal
                .and_then(|s| s.trim().parse::<i64>().ok())
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Null),
            ColumnType::Float => literal
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|f| f.is_finite())
                .map(CellValue::Float)
                .unwrap_or(CellValue::Null),
            ColumnType::Boolean => match literal.and_then(parse_truthy) {
                Some(b) => CellValue::Bool(b),
                None if column.is_nullable => CellValue::Null,
                None => CellValue::Bool(false),
            },
            ColumnType::Date => literal
                .and_then(parse_date)
                .map(CellValue::Date)
                .unwrap_or(CellValue::Null),
            ColumnType::DateTime => literal
                .and_then(parse_datetime)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Null),
            ColumnType::Json => literal
                .and_then(|s| serde_json::from_str(s).ok())
                .map(CellValue::Json)
                .unwrap_or(CellValue::Null),
            ColumnType::Uuid => match raw {
                Some(d) if is_generator_default(d) => CellValue::String(String::new()),
                Some(_) => CellValue::String(literal.unwrap_or_default().to_string()),
                None => CellValue::String(String::new()),
            },
            ColumnType::Other(_) => literal
                .map(|s| CellValue::String(s.to_string()))
                .unwrap_or(CellValue::Null),
        }
    }

    fn form_columns(columns: &[ColumnDefinition]) -> impl Iterator<Item = &ColumnDefinition> {
        columns.iter().filter(|c| !c.is_system())
    }

    fn placeholder(column: &ColumnDefinition) -> Option<String> {
        let default = column.effective_default()?;
        if is_generator_default(default) {
            Some("Generated on save".to_string())
        } else {
            Some(unquote_literal(default))
        }
    }
}

/// Whether a raw default is a call evaluated by the store, e.g. `gen_random_uuid()`
pub fn is_generator_default(default: &str) -> bool {
    let trimmed = default.trim();
    let Some(open) = trimmed.find('(') else {
        return false;
    };
    trimmed.ends_with(')')
        && open > 0
        && trimmed[..open]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Strip quoting and a trailing type cast from a raw default.
///
/// `'draft'::character varying` -> `draft`, `'it''s'` -> `it's`, `42` -> `42`
pub fn unquote_literal(default: &str) -> String {
    let trimmed = default.trim();

    if let Some(rest) = trimmed.strip_prefix('\'') {
        if let Some(end) = rest.rfind('\'') {
            return rest[..end].replace("''", "'");
        }
    }

    match trimmed.split_once("::") {
        Some((value, _cast)) => value.trim().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests;
