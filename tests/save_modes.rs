mod support;

use std::sync::Arc;

use flexrow::{
    AdapterError, ColumnValue, Container, ContainerAdapter, ExecutionMode, SaveMode,
    StorageError, WriteError,
};
use support::{harness, tags_schema, todos_schema};

// --- Auto ---

#[test]
fn auto_inserts_new_rows_then_updates_them() {
    let schema = todos_schema();
    let h = harness(Arc::clone(&schema));

    let todo = Container::new(Arc::clone(&schema));
    todo.set("title", "v1").unwrap();
    h.writer
        .save(&todo, SaveMode::Auto, ExecutionMode::Immediate)
        .unwrap();
    assert_eq!(h.storage.row_count("todos"), 1);
    assert_eq!(h.writer.adapter().read_auto_increment_id(&todo), 1);

    // The write-back made the identity concrete: the second save updates.
    todo.set("title", "v2").unwrap();
    h.writer
        .save(&todo, SaveMode::Auto, ExecutionMode::Immediate)
        .unwrap();
    assert_eq!(h.storage.row_count("todos"), 1);

    let predicate = h.writer.adapter().primary_key_predicate(&todo).unwrap();
    let rows = h.storage.find_matching("todos", &predicate).unwrap();
    assert_eq!(rows[0].get("title"), Some(&ColumnValue::Text("v2".into())));

    h.finish();
}

#[test]
fn auto_with_unset_autoincrement_key_always_inserts() {
    let schema = todos_schema();
    let h = harness(Arc::clone(&schema));

    for n in 0..2 {
        let todo = Container::new(Arc::clone(&schema));
        todo.set("title", format!("row {}", n)).unwrap();
        h.writer
            .save(&todo, SaveMode::Auto, ExecutionMode::Immediate)
            .unwrap();
    }

    assert_eq!(h.storage.row_count("todos"), 2);
    h.finish();
}

#[test]
fn auto_with_missing_plain_primary_key_is_an_error() {
    let schema = tags_schema();
    let h = harness(Arc::clone(&schema));

    let partial = Container::new(Arc::clone(&schema));
    partial.set("todo_id", 1i64).unwrap();

    let err = h
        .writer
        .save(&partial, SaveMode::Auto, ExecutionMode::Immediate)
        .unwrap_err();
    assert!(matches!(
        err,
        WriteError::Storage(StorageError::Metadata(AdapterError::MissingPrimaryKey { .. }))
    ));
    assert_eq!(h.storage.row_count("tags"), 0);

    h.finish();
}

// --- InsertOnly / UpdateOnly ---

#[test]
fn insert_only_rejects_an_existing_identity() {
    let schema = tags_schema();
    let h = harness(Arc::clone(&schema));

    let tag = Container::new(Arc::clone(&schema));
    tag.load([
        ("todo_id", ColumnValue::Integer(1)),
        ("label", ColumnValue::Text("once".into())),
    ])
    .unwrap();

    h.writer
        .save(&tag, SaveMode::InsertOnly, ExecutionMode::Immediate)
        .unwrap();
    let err = h
        .writer
        .save(&tag, SaveMode::InsertOnly, ExecutionMode::Immediate)
        .unwrap_err();
    assert!(matches!(
        err,
        WriteError::Storage(StorageError::Constraint { .. })
    ));
    assert_eq!(h.storage.row_count("tags"), 1);

    h.finish();
}

#[test]
fn update_only_against_no_rows_is_quiet() {
    let schema = todos_schema();
    let h = harness(Arc::clone(&schema));

    let todo = Container::new(Arc::clone(&schema));
    todo.set("id", 12i64).unwrap();
    todo.set("title", "nothing to update").unwrap();

    h.writer
        .save(&todo, SaveMode::UpdateOnly, ExecutionMode::Immediate)
        .unwrap();
    assert_eq!(h.storage.row_count("todos"), 0);

    h.finish();
}

// --- Queued save ---

#[test]
fn queued_save_lands_after_the_queue_drains() {
    let schema = todos_schema();
    let h = harness(Arc::clone(&schema));

    let todo = Container::new(Arc::clone(&schema));
    todo.set("title", "deferred save").unwrap();
    h.writer
        .save(&todo, SaveMode::Auto, ExecutionMode::Queued)
        .unwrap();

    let storage = Arc::clone(&h.storage);
    let stats = h.finish();
    assert_eq!(stats.tasks_run, 1);
    assert_eq!(storage.row_count("todos"), 1);
}
