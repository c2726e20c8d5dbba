use super::*;
use pretty_assertions::assert_eq;
use rowsmith_core::ForeignKeyAction;

fn orders() -> TableDefinition {
    TableDefinition::new("orders")
        .with_column(ColumnDefinition::system("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("customer_id", ColumnType::Integer).not_null())
        .with_column(ColumnDefinition::new("note", ColumnType::String))
        .with_column(ColumnDefinition::system("created_at", ColumnType::DateTime))
        .with_foreign_key(
            ForeignKeyDefinition::new("customer_id")
                .references("customers", "id")
                .on_delete(ForeignKeyAction::Cascade),
        )
}

#[test]
fn test_new_session_tags_every_column() {
    let session = EditSession::new(orders());
    assert!(
        session
            .current()
            .columns
            .iter()
            .all(|c| c.original_name.as_deref() == Some(c.name.as_str()))
    );
    assert!(session.original().columns.iter().all(|c| c.original_name.is_none()));
    assert!(!session.is_dirty());
    assert!(!session.dirty().any());
}

#[test]
fn test_add_column_uses_catalog_defaults() {
    let mut session = EditSession::new(orders());
    let column = session.add_column("token", ColumnType::Uuid).unwrap();
    assert!(!column.is_nullable);
    assert!(column.is_unique);
    assert!(column.is_new());

    let column = session.add_column("amount", ColumnType::Float).unwrap();
    assert!(column.is_nullable);
    assert!(!column.is_unique);

    assert!(session.dirty().columns);
    assert!(session.is_dirty());
}

#[test]
fn test_add_column_rejects_duplicates_and_bad_names() {
    let mut session = EditSession::new(orders());
    assert_eq!(
        session.add_column("note", ColumnType::String).unwrap_err(),
        DesignError::DuplicateColumn("note".into())
    );
    assert!(matches!(
        session.add_column("  ", ColumnType::String).unwrap_err(),
        DesignError::InvalidName { .. }
    ));
    assert!(!session.is_dirty());
}

#[test]
fn test_insert_column_clears_tag() {
    let mut session = EditSession::new(orders());
    let column = session
        .insert_column(ColumnDefinition::new("total", ColumnType::Float).originally("note"))
        .unwrap();
    assert_eq!(column.original_name, None);
    assert_eq!(session.diff().add_columns.len(), 1);
    assert!(session.diff().rename_columns.is_empty());
}

#[test]
fn test_system_columns_are_guarded() {
    let mut session = EditSession::new(orders());
    let refused = DesignError::SystemColumn("created_at".into());

    assert_eq!(session.remove_column("created_at").unwrap_err(), refused);
    assert_eq!(session.rename_column("created_at", "made_at").unwrap_err(), refused);
    assert_eq!(
        session.retype_column("created_at", ColumnType::Date).unwrap_err(),
        refused
    );
    assert_eq!(session.set_nullable("created_at", false).unwrap_err(), refused);
    assert_eq!(session.set_default("created_at", None).unwrap_err(), refused);
    assert!(!session.is_dirty());

    // Reordering is allowed
    session.move_column_up("created_at").unwrap();
    assert!(session.dirty().order);
}

#[test]
fn test_reserved_names_are_guarded_without_flag() {
    let table = TableDefinition::new("notes")
        .with_column(ColumnDefinition::new("id", ColumnType::Integer).primary_key())
        .with_column(ColumnDefinition::new("body", ColumnType::String))
        .with_column(ColumnDefinition::new("created_at", ColumnType::DateTime))
        .with_column(ColumnDefinition::new("updated_at", ColumnType::DateTime));
    let mut session = EditSession::new(table);

    assert_eq!(
        session.remove_column("created_at").unwrap_err(),
        DesignError::SystemColumn("created_at".into())
    );
    assert_eq!(
        session.rename_column("updated_at", "modified").unwrap_err(),
        DesignError::SystemColumn("updated_at".into())
    );
    assert_eq!(
        session.retype_column("id", ColumnType::Uuid).unwrap_err(),
        DesignError::SystemColumn("id".into())
    );
    assert!(session.diff().is_empty());
    assert!(session.conflicts().is_empty());
}

#[test]
fn test_missing_column_is_reported() {
    let mut session = EditSession::new(orders());
    assert_eq!(
        session.set_unique("nope", true).unwrap_err(),
        DesignError::NoSuchColumn("nope".into())
    );
}

#[test]
fn test_rename_carries_foreign_key() {
    let mut session = EditSession::new(orders());
    session.rename_column("customer_id", "buyer_id").unwrap();

    let current = session.current();
    assert_eq!(current.foreign_keys[0].column_name, "buyer_id");
    let column = current.column("buyer_id").unwrap();
    assert!(column.is_renamed());
    assert_eq!(column.original_name.as_deref(), Some("customer_id"));
}

#[test]
fn test_rename_to_existing_name_is_refused() {
    let mut session = EditSession::new(orders());
    assert_eq!(
        session.rename_column("note", "customer_id").unwrap_err(),
        DesignError::DuplicateColumn("customer_id".into())
    );
    // Renaming to itself is a no-op
    session.rename_column("note", "note").unwrap();
    assert!(!session.is_dirty());
}

#[test]
fn test_rename_back_is_clean() {
    let mut session = EditSession::new(orders());
    session.rename_column("note", "comment").unwrap();
    session.rename_column("comment", "note").unwrap();
    assert!(!session.is_dirty());
    assert!(session.diff().is_empty());
}

#[test]
fn test_remove_column_drops_its_foreign_key() {
    let mut session = EditSession::new(orders());
    let removed = session.remove_column("customer_id").unwrap();
    assert_eq!(removed.name, "customer_id");
    assert!(session.current().foreign_keys.is_empty());
    assert!(session.dirty().foreign_keys);
    assert!(session.conflicts().is_empty());
}

#[test]
fn test_set_default_empty_clears() {
    let mut session = EditSession::new(orders());
    session.set_default("note", Some("hello".into())).unwrap();
    assert_eq!(
        session.current().column("note").unwrap().default_value.as_deref(),
        Some("hello")
    );
    session.set_default("note", Some(String::new())).unwrap();
    assert_eq!(session.current().column("note").unwrap().default_value, None);
}

#[test]
fn test_move_columns() {
    let mut session = EditSession::new(orders());
    session.move_column_down("id").unwrap();
    assert_eq!(
        session.current().column_names(),
        vec!["customer_id", "id", "note", "created_at"]
    );
    session.move_column_down("created_at").unwrap();
    session.move_column_up("customer_id").unwrap();
    assert_eq!(
        session.current().column_names(),
        vec!["customer_id", "id", "note", "created_at"]
    );
    assert!(session.dirty().order);
    assert!(!session.dirty().columns);
    // Reordering alone produces no schema operations
    assert!(session.diff().is_empty());
}

#[test]
fn test_foreign_key_operations() {
    let mut session = EditSession::new(orders());

    assert_eq!(
        session
            .add_foreign_key(ForeignKeyDefinition::new("customer_id").references("x", "id"))
            .unwrap_err(),
        DesignError::ForeignKeyExists("customer_id".into())
    );
    assert_eq!(
        session
            .add_foreign_key(ForeignKeyDefinition::new("ghost").references("x", "id"))
            .unwrap_err(),
        DesignError::NoSuchColumn("ghost".into())
    );

    session
        .add_foreign_key(ForeignKeyDefinition::new("note").references("notes", "slug"))
        .unwrap();
    session
        .edit_foreign_key(
            "customer_id",
            ForeignKeyDefinition::new("ignored")
                .references("accounts", "id")
                .on_update(ForeignKeyAction::Cascade),
        )
        .unwrap();

    let fk = session.current().foreign_key_for("customer_id").unwrap();
    assert_eq!(fk.reference_table, "accounts");
    assert_eq!(fk.on_update, ForeignKeyAction::Cascade);

    let removed = session.remove_foreign_key("note").unwrap();
    assert_eq!(removed.reference_table, "notes");
    assert_eq!(
        session.remove_foreign_key("note").unwrap_err(),
        DesignError::NoSuchForeignKey("note".into())
    );
}

#[test]
fn test_revert_discards_everything() {
    let mut session = EditSession::new(orders());
    session.rename_column("note", "comment").unwrap();
    session.add_column("total", ColumnType::Float).unwrap();
    session.remove_foreign_key("customer_id").unwrap();

    session.revert();
    assert!(!session.is_dirty());
    assert!(!session.dirty().any());
    assert!(session.diff().is_empty());
}

#[test]
fn test_rebase_keeps_edits_and_untags_vanished_columns() {
    let mut session = EditSession::new(orders());
    session.rename_column("note", "comment").unwrap();
    session.add_column("total", ColumnType::Float).unwrap();

    // Someone else dropped "note" meanwhile
    let mut fresh = orders();
    fresh.columns.retain(|c| c.name != "note");
    session.rebase(fresh);

    let comment = session.current().column("comment").unwrap();
    assert_eq!(comment.original_name, None);

    let diff = session.diff();
    let added: Vec<&str> = diff.add_columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(added, vec!["comment", "total"]);
    assert!(diff.rename_columns.is_empty());
    assert!(diff.drop_columns.is_empty());
}

#[test]
fn test_new_table_session() {
    let mut session = EditSession::new_table("tags");
    assert!(session.is_new());
    assert!(!session.is_dirty());

    session.add_column("label", ColumnType::String).unwrap();
    assert!(session.is_dirty());

    let table = session.clone().into_current();
    assert_eq!(table.name, "tags");
    assert_eq!(table.columns[0].original_name, None);

    session.revert();
    assert!(session.current().columns.is_empty());
}

#[test]
fn test_current_mut_marks_dirty() {
    let mut session = EditSession::new(orders());
    session.current_mut().columns[2].is_unique = true;
    assert!(session.dirty().columns);
    assert!(session.is_dirty());
    assert_eq!(session.diff().alter_columns.len(), 1);
}
