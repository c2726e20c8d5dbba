//! Validation schema and form model

use indexmap::IndexMap;
use rowsmith_core::{CellValue, ColumnType, FieldMap, InputWidget, catalog_entry};

use crate::{FieldError, FieldErrors, FieldRule};

/// Validator for one form field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidator {
    pub field: String,
    pub rule: FieldRule,
    pub nullable: bool,
    /// The store fills the field in when it is left empty
    pub has_default: bool,
}

impl FieldValidator {
    /// Validate one value, returning its normalized form
    pub fn validate(&self, value: &CellValue) -> Result<CellValue, FieldError> {
        self.rule
            .check(value, self.nullable, self.has_default)
            .map_err(|message| FieldError::new(&self.field, message))
    }

    pub fn accepts(&self, value: &CellValue) -> bool {
        self.validate(value).is_ok()
    }
}

/// Per-field validators for a record form, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSchema {
    validators: IndexMap<String, FieldValidator>,
}

impl ValidationSchema {
    pub(crate) fn insert(&mut self, validator: FieldValidator) {
        self.validators.insert(validator.field.clone(), validator);
    }

    pub fn field(&self, name: &str) -> Option<&FieldValidator> {
        self.validators.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldValidator> {
        self.validators.values()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Validate a single field. Unknown fields pass unchanged.
    pub fn validate_field(&self, name: &str, value: &CellValue) -> Result<CellValue, FieldError> {
        match self.validators.get(name) {
            Some(validator) => validator.validate(value),
            None => Ok(value.clone()),
        }
    }

    /// Whether `value` is acceptable for `name`
    pub fn accepts(&self, name: &str, value: &CellValue) -> bool {
        self.validate_field(name, value).is_ok()
    }

    /// Validate every field of the schema against `values`.
    ///
    /// A missing entry is treated as NULL. Returns the normalized values or
    /// every failing field.
    pub fn validate(&self, values: &FieldMap) -> Result<FieldMap, FieldErrors> {
        let mut normalized = FieldMap::new();
        let mut errors = Vec::new();

        for validator in self.validators.values() {
            let value = values.get(&validator.field).unwrap_or(&CellValue::Null);
            match validator.validate(value) {
                Ok(v) => {
                    normalized.insert(validator.field.clone(), v);
                }
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(FieldErrors { errors })
        }
    }

    /// Validate and strip NULLs the store will fill from a default.
    ///
    /// The result is the field map passed to `create_record`.
    pub fn prepare_submission(&self, values: &FieldMap) -> Result<FieldMap, FieldErrors> {
        let mut normalized = self.validate(values)?;
        normalized.retain(|name, value| {
            let defaulted = self.validators.get(name).is_some_and(|v| v.has_default);
            !(value.is_null() && defaulted)
        });
        Ok(normalized)
    }
}

/// Form field description for a form host
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub column_type: ColumnType,
    pub label: String,
    pub widget: Option<InputWidget>,
    pub required: bool,
    pub placeholder: Option<String>,
}

impl FormField {
    pub(crate) fn new(
        name: &str,
        column_type: &ColumnType,
        required: bool,
        placeholder: Option<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            column_type: column_type.clone(),
            label: humanize(name),
            widget: catalog_entry(column_type).map(|e| e.widget),
            required,
            placeholder,
        }
    }
}

/// Fields, validators and initial values for creating a record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordForm {
    pub table: String,
    pub fields: Vec<FormField>,
    pub schema: ValidationSchema,
    pub initial_values: FieldMap,
}

impl RecordForm {
    /// Validate the given values and build the create payload
    pub fn submit(&self, values: &FieldMap) -> Result<FieldMap, FieldErrors> {
        self.schema.prepare_submission(values)
    }
}

/// `created_by_user` -> `Created by user`
fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
