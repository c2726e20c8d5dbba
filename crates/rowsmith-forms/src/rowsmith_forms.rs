//! Record forms for rowsmith
//!
//! Turns a table's column definitions into a validated input form:
//!
//! - [`DynamicValidationBuilder`] builds a [`ValidationSchema`] and the initial
//!   field values from the column list (system columns excluded)
//! - [`FieldRule`] holds the per-type value rules
//! - [`RecordForm`] bundles fields, schema and initial values for a form host
//!
//! ## Usage
//!
//! ```rust,ignore
//! let form = DynamicValidationBuilder::build_form(&table);
//! let mut values = form.initial_values.clone();
//! values.insert("age".into(), CellValue::from("42"));
//! let submission = form.schema.prepare_submission(&values)?;
//! ```

mod builder;
mod error;
mod form;
mod rules;

pub use builder::{DynamicValidationBuilder, is_generator_default, unquote_literal};
pub use error::{FieldError, FieldErrors};
pub use form::{FieldValidator, FormField, RecordForm, ValidationSchema};
pub use rules::FieldRule;
