//! Table metadata: columns, foreign keys and schema diffs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Platform-managed columns that are never renamed, retyped or dropped
pub const SYSTEM_COLUMN_NAMES: [&str; 3] = ["id", "created_at", "updated_at"];

/// Check whether a column name belongs to a platform-managed column
pub fn is_system_column_name(name: &str) -> bool {
    SYSTEM_COLUMN_NAMES.contains(&name)
}

/// Describe why a column name is unusable, if it is
pub fn column_name_problem(name: &str) -> Option<&'static str> {
    if name.trim().is_empty() {
        Some("Column name is required")
    } else if name.chars().any(char::is_control) {
        Some("Column name must not contain control characters")
    } else {
        None
    }
}

/// Declared column type.
///
/// Types the catalog does not know are kept verbatim in `Other` so the form
/// and grid can still handle them leniently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Json,
    Uuid,
    Other(String),
}

impl ColumnType {
    /// Parse a declared type name, accepting common SQL aliases
    pub fn parse(name: &str) -> Self {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            "string" | "text" | "varchar" | "char" | "character varying" | "citext" => {
                ColumnType::String
            }
            "integer" | "int" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "serial"
            | "bigserial" => ColumnType::Integer,
            "float" | "float4" | "float8" | "real" | "double" | "double precision" | "numeric"
            | "decimal" => ColumnType::Float,
            "boolean" | "bool" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "datetime" | "timestamp" | "timestamptz" => ColumnType::DateTime,
            "json" | "jsonb" => ColumnType::Json,
            "uuid" => ColumnType::Uuid,
            _ if lower.starts_with("varchar(") || lower.starts_with("char(") => ColumnType::String,
            _ if lower.starts_with("timestamp") => ColumnType::DateTime,
            _ if lower.starts_with("numeric(") || lower.starts_with("decimal(") => {
                ColumnType::Float
            }
            _ => ColumnType::Other(name.trim().to_string()),
        }
    }

    /// Canonical type name
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Json => "json",
            ColumnType::Uuid => "uuid",
            ColumnType::Other(name) => name,
        }
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        ColumnType::parse(&value)
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed, constrained description of one table attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Column name, unique within the table
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether NULL values are allowed
    #[serde(default)]
    pub is_nullable: bool,
    /// Whether values must be unique
    #[serde(default)]
    pub is_unique: bool,
    /// Raw, unparsed default expression
    #[serde(default)]
    pub default_value: Option<String>,
    /// Part of the primary key (immutable)
    #[serde(default)]
    pub is_primary_key: bool,
    /// Platform-managed column (immutable)
    #[serde(default)]
    pub is_system_column: bool,
    /// Name of the column this one was loaded as. Only set during an edit
    /// session; `None` marks a newly added column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

impl ColumnDefinition {
    /// Create a nullable column of the given type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_nullable: true,
            is_unique: false,
            default_value: None,
            is_primary_key: false,
            is_system_column: false,
            original_name: None,
        }
    }

    /// Create a platform-managed column
    pub fn system(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            is_nullable: false,
            is_system_column: true,
            ..Self::new(name, column_type)
        }
    }

    /// Whether the column is platform-managed, by flag or by its reserved name
    pub fn is_system(&self) -> bool {
        self.is_system_column || is_system_column_name(&self.name)
    }

    /// Builder: set as primary key
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.is_nullable = false;
        self
    }

    /// Builder: set as not null
    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Builder: set as unique
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Builder: set default value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Builder: tag with the name the column was loaded as
    pub fn originally(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    /// True when the column was added during the current edit session
    pub fn is_new(&self) -> bool {
        self.original_name.is_none()
    }

    /// True when the column is an existing one carrying a different name
    pub fn is_renamed(&self) -> bool {
        self.original_name
            .as_deref()
            .is_some_and(|original| original != self.name)
    }

    /// Default value with empty strings treated as unset
    pub fn effective_default(&self) -> Option<&str> {
        self.default_value.as_deref().filter(|d| !d.is_empty())
    }

    /// Whether the attributes other than the name differ from `other`
    pub fn attributes_differ(&self, other: &ColumnDefinition) -> bool {
        self.column_type != other.column_type
            || self.is_nullable != other.is_nullable
            || self.is_unique != other.is_unique
            || self.effective_default() != other.effective_default()
    }
}

/// Referential action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    #[default]
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
    #[serde(rename = "RESTRICT")]
    Restrict,
}

impl ForeignKeyAction {
    pub const ALL: [ForeignKeyAction; 5] = [
        ForeignKeyAction::NoAction,
        ForeignKeyAction::Cascade,
        ForeignKeyAction::SetNull,
        ForeignKeyAction::SetDefault,
        ForeignKeyAction::Restrict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForeignKeyAction::NoAction => "NO ACTION",
            ForeignKeyAction::Cascade => "CASCADE",
            ForeignKeyAction::SetNull => "SET NULL",
            ForeignKeyAction::SetDefault => "SET DEFAULT",
            ForeignKeyAction::Restrict => "RESTRICT",
        }
    }

    /// Parse an action keyword, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
    }
}

impl std::fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Foreign key from one column of the table to a unique column elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDefinition {
    /// Local column
    pub column_name: String,
    /// Referenced table
    pub reference_table: String,
    /// Referenced column (unique in the referenced table)
    pub reference_column: String,
    #[serde(default)]
    pub on_delete: ForeignKeyAction,
    #[serde(default)]
    pub on_update: ForeignKeyAction,
}

impl ForeignKeyDefinition {
    /// Create a foreign key on `column_name` with no target yet
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            reference_table: String::new(),
            reference_column: String::new(),
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    /// Builder: set referenced table and column
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.reference_table = table.into();
        self.reference_column = column.into();
        self
    }

    /// Builder: set on delete action
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Builder: set on update action
    pub fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }

    /// Same target and actions, ignoring the local column name
    pub fn same_reference(&self, other: &ForeignKeyDefinition) -> bool {
        self.reference_table == other.reference_table
            && self.reference_column == other.reference_column
            && self.on_delete == other.on_delete
            && self.on_update == other.on_update
    }
}

/// A table: name, ordered columns and foreign keys
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
}

impl TableDefinition {
    /// Create an empty table definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Builder: add a column
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder: add a foreign key
    pub fn with_foreign_key(mut self, fk: ForeignKeyDefinition) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDefinition> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Foreign key declared on a local column
    pub fn foreign_key_for(&self, column_name: &str) -> Option<&ForeignKeyDefinition> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.column_name == column_name)
    }

    /// Columns excluding platform-managed ones
    pub fn user_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| !c.is_system())
    }

    /// Get column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Order- and tag-insensitive form used to compare two definitions.
    ///
    /// Session tags are cleared, empty defaults become unset and columns and
    /// foreign keys are sorted by name.
    pub fn normalized(&self) -> TableDefinition {
        let mut columns: Vec<ColumnDefinition> = self
            .columns
            .iter()
            .cloned()
            .map(|mut c| {
                c.original_name = None;
                if c.default_value.as_deref() == Some("") {
                    c.default_value = None;
                }
                c
            })
            .collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name));

        let mut foreign_keys = self.foreign_keys.clone();
        foreign_keys.sort_by(|a, b| {
            a.column_name
                .cmp(&b.column_name)
                .then_with(|| a.reference_table.cmp(&b.reference_table))
        });

        TableDefinition {
            name: self.name.clone(),
            columns,
            foreign_keys,
        }
    }
}

/// The operation set that turns one table definition into another
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff {
    /// Newly added columns with their full definition
    #[serde(default)]
    pub add_columns: Vec<ColumnDefinition>,
    /// Original names of dropped columns
    #[serde(default)]
    pub drop_columns: Vec<String>,
    /// Original name to new name
    #[serde(default)]
    pub rename_columns: IndexMap<String, String>,
    /// Existing columns (by new name) whose type, nullability, uniqueness or
    /// default changed
    #[serde(default)]
    pub alter_columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub add_foreign_keys: Vec<ForeignKeyDefinition>,
    #[serde(default)]
    pub drop_foreign_keys: Vec<ForeignKeyDefinition>,
}

impl SchemaDiff {
    /// True when there is nothing to send
    pub fn is_empty(&self) -> bool {
        self.operation_count() == 0
    }

    /// Total number of operations
    pub fn operation_count(&self) -> usize {
        self.add_columns.len()
            + self.drop_columns.len()
            + self.rename_columns.len()
            + self.alter_columns.len()
            + self.add_foreign_keys.len()
            + self.drop_foreign_keys.len()
    }

    /// Apply the operations to `table` and return the resulting definition.
    ///
    /// Order: foreign key drops, column drops, renames (all at once, so
    /// swapped names resolve), alterations, additions, foreign key additions.
    pub fn apply_to(&self, table: &TableDefinition) -> TableDefinition {
        let mut result = table.clone();

        result.foreign_keys.retain(|fk| {
            !self
                .drop_foreign_keys
                .iter()
                .any(|dropped| dropped.column_name == fk.column_name)
        });

        result
            .columns
            .retain(|c| !self.drop_columns.contains(&c.name));

        for column in &mut result.columns {
            if let Some(new_name) = self.rename_columns.get(&column.name) {
                column.name = new_name.clone();
            }
        }
        for fk in &mut result.foreign_keys {
            if let Some(new_name) = self.rename_columns.get(&fk.column_name) {
                fk.column_name = new_name.clone();
            }
        }

        for altered in &self.alter_columns {
            if let Some(column) = result.column_mut(&altered.name) {
                column.column_type = altered.column_type.clone();
                column.is_nullable = altered.is_nullable;
                column.is_unique = altered.is_unique;
                column.default_value = altered.default_value.clone();
            }
        }

        result
            .columns
            .extend(self.add_columns.iter().cloned());
        result
            .foreign_keys
            .extend(self.add_foreign_keys.iter().cloned());

        for column in &mut result.columns {
            column.original_name = None;
        }

        result
    }
}
