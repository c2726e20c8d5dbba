use super::*;
use crate::EditSession;
use pretty_assertions::assert_eq;
use rowsmith_core::{ColumnType, ForeignKeyAction};

fn people() -> TableDefinition {
    TableDefinition::new("people")
        .with_column(ColumnDefinition::system("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("name", ColumnType::String).not_null())
        .with_column(ColumnDefinition::new("age", ColumnType::Integer))
}

fn orders() -> TableDefinition {
    TableDefinition::new("orders")
        .with_column(ColumnDefinition::system("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("customer_id", ColumnType::Integer).not_null())
        .with_column(ColumnDefinition::new("note", ColumnType::String))
        .with_column(ColumnDefinition::new("parent_id", ColumnType::Integer))
        .with_foreign_key(
            ForeignKeyDefinition::new("customer_id")
                .references("customers", "id")
                .on_delete(ForeignKeyAction::Cascade),
        )
        .with_foreign_key(ForeignKeyDefinition::new("parent_id").references("orders", "id"))
}

fn assert_round_trip(session: &EditSession) {
    let diff = session.diff();
    let applied = diff.apply_to(session.original());
    assert_eq!(applied.normalized(), session.current().normalized());
}

#[test]
fn test_unchanged_table_has_empty_diff() {
    for table in [people(), orders(), TableDefinition::new("empty")] {
        let session = EditSession::new(table);
        assert!(session.diff().is_empty());
        assert!(!session.is_dirty());
    }
}

#[test]
fn test_rename_example() {
    let mut session = EditSession::new(people());
    session.rename_column("age", "years").unwrap();

    let diff = session.diff();
    assert!(diff.add_columns.is_empty());
    assert!(diff.drop_columns.is_empty());
    assert_eq!(diff.rename_columns.len(), 1);
    assert_eq!(diff.rename_columns.get("age").map(String::as_str), Some("years"));
    assert!(diff.alter_columns.is_empty());
    assert_round_trip(&session);
}

#[test]
fn test_single_rename_on_every_user_column() {
    let table = orders();
    for column in table.user_columns() {
        let mut session = EditSession::new(table.clone());
        let new_name = format!("{}_renamed", column.name);
        session.rename_column(&column.name, &new_name).unwrap();

        let diff = session.diff();
        assert_eq!(diff.rename_columns.len(), 1, "renaming {}", column.name);
        assert!(diff.add_columns.is_empty());
        assert!(diff.drop_columns.is_empty());
        // Foreign keys follow the rename without being re-created
        assert!(diff.add_foreign_keys.is_empty());
        assert!(diff.drop_foreign_keys.is_empty());
        assert_round_trip(&session);
    }
}

#[test]
fn test_remove_and_add_is_never_a_rename() {
    let mut session = EditSession::new(people());
    session.remove_column("age").unwrap();
    session.add_column("birthday", ColumnType::Date).unwrap();

    let diff = session.diff();
    assert_eq!(diff.drop_columns, vec!["age".to_string()]);
    assert_eq!(diff.add_columns.len(), 1);
    assert_eq!(diff.add_columns[0].name, "birthday");
    assert_eq!(diff.add_columns[0].original_name, None);
    assert!(diff.rename_columns.is_empty());
    assert_round_trip(&session);
}

#[test]
fn test_readding_same_name_is_drop_and_add() {
    let mut session = EditSession::new(people());
    session.remove_column("age").unwrap();
    session.add_column("age", ColumnType::Float).unwrap();

    let diff = session.diff();
    assert_eq!(diff.drop_columns, vec!["age".to_string()]);
    assert_eq!(diff.add_columns[0].column_type, ColumnType::Float);
    assert!(session.conflicts().is_empty());
    assert_round_trip(&session);
}

#[test]
fn test_partition_has_no_double_counting() {
    let mut session = EditSession::new(orders());
    session.rename_column("note", "comment").unwrap();
    session.remove_column("parent_id").unwrap();
    session.add_column("total", ColumnType::Float).unwrap();
    session.retype_column("comment", ColumnType::Json).unwrap();

    let diff = session.diff();
    let mut touched: Vec<&str> = diff.drop_columns.iter().map(String::as_str).collect();
    touched.extend(diff.rename_columns.keys().map(String::as_str));
    touched.extend(diff.add_columns.iter().map(|c| c.name.as_str()));
    let unique: HashSet<&str> = touched.iter().copied().collect();
    assert_eq!(unique.len(), touched.len());

    // Altered columns are keyed by their new name
    assert_eq!(diff.alter_columns.len(), 1);
    assert_eq!(diff.alter_columns[0].name, "comment");
    // Dropping parent_id drops its foreign key too
    assert_eq!(diff.drop_foreign_keys.len(), 1);
    assert_eq!(diff.drop_foreign_keys[0].column_name, "parent_id");
    assert_round_trip(&session);
}

#[test]
fn test_empty_default_is_unset() {
    let mut session = EditSession::new(people());
    let column = session.add_column("nickname", ColumnType::String).unwrap();
    column.default_value = Some(String::new());

    let diff = session.diff();
    assert_eq!(diff.add_columns[0].default_value, None);
}

#[test]
fn test_default_change_is_alteration() {
    let mut session = EditSession::new(people());
    session.set_default("age", Some("18".into())).unwrap();
    session.set_nullable("name", true).unwrap();

    let diff = session.diff();
    let altered: Vec<&str> = diff.alter_columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(altered, vec!["name", "age"]);
    assert_round_trip(&session);
}

#[test]
fn test_foreign_key_edit_is_drop_and_add() {
    let mut session = EditSession::new(orders());
    session
        .edit_foreign_key(
            "customer_id",
            ForeignKeyDefinition::new("customer_id")
                .references("accounts", "id")
                .on_delete(ForeignKeyAction::Restrict),
        )
        .unwrap();

    let diff = session.diff();
    assert_eq!(diff.drop_foreign_keys.len(), 1);
    assert_eq!(diff.drop_foreign_keys[0].reference_table, "customers");
    assert_eq!(diff.add_foreign_keys.len(), 1);
    assert_eq!(diff.add_foreign_keys[0].reference_table, "accounts");
    assert_eq!(diff.operation_count(), 2);
    assert_round_trip(&session);
}

#[test]
fn test_foreign_key_add_and_remove() {
    let mut session = EditSession::new(orders());
    session.remove_foreign_key("customer_id").unwrap();
    session.add_column("region", ColumnType::String).unwrap();
    session
        .add_foreign_key(ForeignKeyDefinition::new("region").references("regions", "code"))
        .unwrap();

    let diff = session.diff();
    assert_eq!(diff.drop_foreign_keys[0].column_name, "customer_id");
    assert_eq!(diff.add_foreign_keys[0].column_name, "region");
    assert_round_trip(&session);
}

#[test]
fn test_swap_is_reported_and_flagged() {
    let mut session = EditSession::new(people());
    {
        let table = session.current_mut();
        table.columns[1].name = "age".into();
        table.columns[2].name = "name".into();
    }

    let diff = session.diff();
    assert_eq!(diff.rename_columns.get("name").map(String::as_str), Some("age"));
    assert_eq!(diff.rename_columns.get("age").map(String::as_str), Some("name"));

    let conflicts = session.conflicts();
    assert!(conflicts.contains(&DiffConflict::RenameCollision {
        from: "name".into(),
        to: "age".into()
    }));
    assert!(conflicts.contains(&DiffConflict::RenameCollision {
        from: "age".into(),
        to: "name".into()
    }));
    // Renames apply simultaneously, so the swap still round-trips
    assert_round_trip(&session);
}

#[test]
fn test_chain_onto_dropped_column_is_flagged() {
    let mut session = EditSession::new(people());
    session.remove_column("name").unwrap();
    session.rename_column("age", "name").unwrap();

    let diff = session.diff();
    assert_eq!(diff.drop_columns, vec!["name".to_string()]);
    assert_eq!(diff.rename_columns.get("age").map(String::as_str), Some("name"));
    assert_eq!(
        session.conflicts(),
        vec![DiffConflict::RenameCollision {
            from: "age".into(),
            to: "name".into()
        }]
    );
}

#[test]
fn test_foreign_key_on_dropped_column_is_flagged() {
    let mut session = EditSession::new(orders());
    session
        .current_mut()
        .columns
        .retain(|c| c.name != "customer_id");

    assert_eq!(
        session.conflicts(),
        vec![DiffConflict::ForeignKeyOnDroppedColumn("customer_id".into())]
    );
}

#[test]
fn test_self_reference_to_dropped_column() {
    let table = TableDefinition::new("nodes")
        .with_column(ColumnDefinition::new("key", ColumnType::String).unique())
        .with_column(ColumnDefinition::new("parent_key", ColumnType::String))
        .with_foreign_key(ForeignKeyDefinition::new("parent_key").references("nodes", "key"));
    let mut session = EditSession::new(table);
    session.current_mut().columns.retain(|c| c.name != "key");

    assert_eq!(
        session.conflicts(),
        vec![DiffConflict::SelfReferenceToDroppedColumn {
            column: "parent_key".into(),
            reference_column: "key".into()
        }]
    );
}

#[test]
fn test_self_reference_follows_rename() {
    let table = TableDefinition::new("nodes")
        .with_column(ColumnDefinition::new("key", ColumnType::String).unique())
        .with_column(ColumnDefinition::new("parent_key", ColumnType::String))
        .with_foreign_key(ForeignKeyDefinition::new("parent_key").references("nodes", "key"));
    let mut session = EditSession::new(table);
    session.rename_column("key", "slug").unwrap();

    assert!(session.conflicts().is_empty());
    let diff = session.diff();
    assert_eq!(diff.drop_foreign_keys.len(), 1);
    assert_eq!(diff.add_foreign_keys[0].reference_column, "slug");
}

#[test]
fn test_system_column_modification_is_flagged() {
    let mut session = EditSession::new(people());
    session.current_mut().columns[0].column_type = ColumnType::Uuid;

    assert_eq!(
        session.conflicts(),
        vec![DiffConflict::SystemColumnModified("id".into())]
    );
}

#[test]
fn test_reserved_column_changes_are_flagged_without_flag() {
    let original = TableDefinition::new("notes")
        .with_column(ColumnDefinition::new("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("body", ColumnType::String))
        .with_column(ColumnDefinition::new("created_at", ColumnType::DateTime))
        .with_column(ColumnDefinition::new("updated_at", ColumnType::DateTime));
    let edited = TableDefinition::new("notes")
        .with_column(ColumnDefinition::new("id", ColumnType::Integer).primary_key().originally("id"))
        .with_column(ColumnDefinition::new("body", ColumnType::String).originally("body"))
        .with_column(ColumnDefinition::new("modified", ColumnType::DateTime).originally("updated_at"));

    let conflicts = SchemaDiffEngine::detect_conflicts(&original, &edited);
    assert_eq!(
        conflicts,
        vec![
            DiffConflict::SystemColumnModified("created_at".into()),
            DiffConflict::SystemColumnModified("updated_at".into()),
        ]
    );
}

#[test]
fn test_duplicate_and_invalid_names_are_flagged() {
    let mut session = EditSession::new(people());
    {
        let table = session.current_mut();
        table.columns.push(ColumnDefinition::new("Name", ColumnType::String));
        table.columns.push(ColumnDefinition::new("bad\nname", ColumnType::String));
    }

    let conflicts = session.conflicts();
    assert!(conflicts.contains(&DiffConflict::DuplicateColumn("Name".into())));
    assert!(conflicts
        .iter()
        .any(|c| matches!(c, DiffConflict::InvalidColumnName { name, .. } if name == "bad\nname")));
}

#[test]
fn test_new_table_diff_is_all_additions() {
    let mut session = EditSession::new_table("tags");
    assert_eq!(session.conflicts(), vec![DiffConflict::NoColumns]);

    session.add_column("label", ColumnType::String).unwrap();
    session.add_column("uid", ColumnType::Uuid).unwrap();

    let diff = session.diff();
    assert_eq!(diff.add_columns.len(), 2);
    assert!(diff.add_columns[1].is_unique);
    assert!(!diff.add_columns[1].is_nullable);
    assert!(session.conflicts().is_empty());
}

#[test]
fn test_stale_tag_counts_as_addition() {
    let original = people();
    let edited = TableDefinition::new("people")
        .with_column(ColumnDefinition::system("id", ColumnType::Integer).primary_key().originally("id"))
        .with_column(ColumnDefinition::new("name", ColumnType::String).not_null().originally("name"))
        .with_column(ColumnDefinition::new("age", ColumnType::Integer).originally("age"))
        .with_column(ColumnDefinition::new("ghost", ColumnType::String).originally("vanished"));

    let diff = SchemaDiffEngine::diff(&original, &edited);
    assert_eq!(diff.add_columns.len(), 1);
    assert_eq!(diff.add_columns[0].name, "ghost");
    assert!(diff.rename_columns.is_empty());
}
