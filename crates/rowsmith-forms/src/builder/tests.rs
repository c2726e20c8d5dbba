use super::*;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn users_table() -> TableDefinition {
    TableDefinition::new("users")
        .with_column(ColumnDefinition::system("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("name", ColumnType::String).not_null())
        .with_column(ColumnDefinition::new("age", ColumnType::Integer).default("18"))
        .with_column(ColumnDefinition::new("active", ColumnType::Boolean).not_null())
        .with_column(
            ColumnDefinition::new("token", ColumnType::Uuid)
                .not_null()
                .default("gen_random_uuid()"),
        )
        .with_column(ColumnDefinition::system("created_at", ColumnType::DateTime))
}

#[test]
fn test_system_columns_excluded() {
    let form = DynamicValidationBuilder::build_form(&users_table());
    let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["name", "age", "active", "token"]);
    assert!(form.schema.field("id").is_none());
    assert!(!form.initial_values.contains_key("created_at"));
}

#[test]
fn test_reserved_columns_excluded_without_flag() {
    let table: TableDefinition = serde_json::from_str(
        r#"{
            "name": "notes",
            "columns": [
                { "name": "id", "type": "integer", "isPrimaryKey": true },
                { "name": "body", "type": "text" },
                { "name": "created_at", "type": "timestamp" },
                { "name": "updated_at", "type": "timestamp" }
            ]
        }"#,
    )
    .unwrap();

    let form = DynamicValidationBuilder::build_form(&table);
    let names: Vec<&str> = form.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["body"]);
    assert!(form.initial_values.contains_key("body"));
    assert_eq!(form.initial_values.len(), 1);
}

#[test]
fn test_initial_values() {
    let form = DynamicValidationBuilder::build_form(&users_table());
    assert_eq!(form.initial_values.get("name"), Some(&CellValue::from("")));
    assert_eq!(form.initial_values.get("age"), Some(&CellValue::Integer(18)));
    assert_eq!(form.initial_values.get("active"), Some(&CellValue::Bool(false)));
    assert_eq!(form.initial_values.get("token"), Some(&CellValue::from("")));
}

#[test]
fn test_boolean_initial_values() {
    let nullable = ColumnDefinition::new("flag", ColumnType::Boolean);
    assert_eq!(DynamicValidationBuilder::initial_value(&nullable), CellValue::Null);

    let defaulted = ColumnDefinition::new("flag", ColumnType::Boolean).default("'yes'");
    assert_eq!(
        DynamicValidationBuilder::initial_value(&defaulted),
        CellValue::Bool(true)
    );

    let off = ColumnDefinition::new("flag", ColumnType::Boolean)
        .not_null()
        .default("false");
    assert_eq!(DynamicValidationBuilder::initial_value(&off), CellValue::Bool(false));
}

#[test]
fn test_numeric_and_date_defaults() {
    let price = ColumnDefinition::new("price", ColumnType::Float).default("'9.99'::numeric");
    assert_eq!(
        DynamicValidationBuilder::initial_value(&price),
        CellValue::Float(9.99)
    );

    let bad = ColumnDefinition::new("count", ColumnType::Integer).default("nextval('seq')");
    assert_eq!(DynamicValidationBuilder::initial_value(&bad), CellValue::Null);

    let due = ColumnDefinition::new("due", ColumnType::Date).default("'2024-03-01'");
    assert_eq!(
        DynamicValidationBuilder::initial_value(&due),
        CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    );

    let now = ColumnDefinition::new("seen", ColumnType::DateTime).default("now()");
    assert_eq!(DynamicValidationBuilder::initial_value(&now), CellValue::Null);
}

#[test]
fn test_uuid_literal_default_is_kept() {
    let fixed = ColumnDefinition::new("ref", ColumnType::Uuid)
        .default("'67e55044-10b1-426f-9247-bb680e5fe0c8'::uuid");
    assert_eq!(
        DynamicValidationBuilder::initial_value(&fixed),
        CellValue::from("67e55044-10b1-426f-9247-bb680e5fe0c8")
    );
}

#[test]
fn test_boolean_validator_nullability() {
    let strict = DynamicValidationBuilder::build_schema(&[
        ColumnDefinition::new("flag", ColumnType::Boolean).not_null()
    ]);
    assert!(!strict.accepts("flag", &CellValue::Null));
    assert!(strict.accepts("flag", &CellValue::Bool(true)));

    let loose =
        DynamicValidationBuilder::build_schema(&[ColumnDefinition::new("flag", ColumnType::Boolean)]);
    assert!(loose.accepts("flag", &CellValue::Null));
    assert!(loose.accepts("flag", &CellValue::Bool(true)));
    assert!(loose.accepts("flag", &CellValue::Bool(false)));
    assert!(!loose.accepts("flag", &CellValue::from("true")));
    assert!(!loose.accepts("flag", &CellValue::Integer(1)));
}

#[test]
fn test_unknown_type_passes_through() {
    let schema = DynamicValidationBuilder::build_schema(&[ColumnDefinition::new(
        "shape",
        ColumnType::Other("geometry".into()),
    )
    .not_null()]);
    assert!(schema.accepts("shape", &CellValue::from("POINT(1 2)")));
    assert!(schema.accepts("shape", &CellValue::Null));
}

#[test]
fn test_submit_generated_uuid_is_omitted() {
    let form = DynamicValidationBuilder::build_form(&users_table());
    let mut values = form.initial_values.clone();
    values.insert("name".into(), CellValue::from("Ada"));

    let payload = form.submit(&values).unwrap();
    assert_eq!(
        payload.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["name", "age", "active"]
    );
}

#[test]
fn test_required_flags_and_placeholders() {
    let form = DynamicValidationBuilder::build_form(&users_table());
    let token = form.fields.iter().find(|f| f.name == "token").unwrap();
    assert!(!token.required);
    assert_eq!(token.placeholder.as_deref(), Some("Generated on save"));

    let name = form.fields.iter().find(|f| f.name == "name").unwrap();
    assert!(name.required);
    assert_eq!(name.label, "Name");
}

#[test]
fn test_literal_helpers() {
    assert!(is_generator_default("gen_random_uuid()"));
    assert!(is_generator_default(" uuid_generate_v4() "));
    assert!(!is_generator_default("'abc'"));
    assert!(!is_generator_default("()"));

    assert_eq!(unquote_literal("'draft'::character varying"), "draft");
    assert_eq!(unquote_literal("'it''s'"), "it's");
    assert_eq!(unquote_literal("0::integer"), "0");
    assert_eq!(unquote_literal("42"), "42");
}
