//! Column type catalog
//!
//! Static mapping from a declared column type to the input widget used to
//! edit it, the icon tag shown next to it, and the nullability/uniqueness
//! defaults a new column of that type starts with.

use crate::ColumnType;

/// Input widget used to enter a value of a given type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputWidget {
    Text,
    Integer,
    Decimal,
    TriState,
    DatePicker,
    DateTimePicker,
    StructuredEditor,
    Uuid,
}

/// Catalog entry for one column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCatalogEntry {
    /// Type this entry describes
    pub column_type: ColumnType,
    /// Display name for UI
    pub display_name: &'static str,
    /// Input widget kind
    pub widget: InputWidget,
    /// Icon/identity tag
    pub icon: &'static str,
    /// Whether a new column of this type starts nullable
    pub nullable_by_default: bool,
    /// Whether a new column of this type starts unique
    pub unique_by_default: bool,
}

const fn entry(
    column_type: ColumnType,
    display_name: &'static str,
    widget: InputWidget,
    icon: &'static str,
    nullable_by_default: bool,
    unique_by_default: bool,
) -> TypeCatalogEntry {
    TypeCatalogEntry {
        column_type,
        display_name,
        widget,
        icon,
        nullable_by_default,
        unique_by_default,
    }
}

static CATALOG: [TypeCatalogEntry; 8] = [
    entry(ColumnType::String, "Text", InputWidget::Text, "type", true, false),
    entry(ColumnType::Integer, "Integer", InputWidget::Integer, "hash", true, false),
    entry(ColumnType::Float, "Decimal", InputWidget::Decimal, "decimal", true, false),
    entry(ColumnType::Boolean, "Boolean", InputWidget::TriState, "toggle", true, false),
    entry(ColumnType::Date, "Date", InputWidget::DatePicker, "calendar", true, false),
    entry(
        ColumnType::DateTime,
        "Date & Time",
        InputWidget::DateTimePicker,
        "clock",
        true,
        false,
    ),
    entry(ColumnType::Json, "JSON", InputWidget::StructuredEditor, "braces", true, false),
    entry(ColumnType::Uuid, "UUID", InputWidget::Uuid, "fingerprint", false, true),
];

/// Look up the catalog entry for a type; `None` for types the catalog does not know
pub fn catalog_entry(column_type: &ColumnType) -> Option<&'static TypeCatalogEntry> {
    CATALOG.iter().find(|e| &e.column_type == column_type)
}
