#![cfg(feature = "emitter")]

mod support;

use std::sync::{Arc, Mutex};

use flexrow::{
    ChangeNotifier, Container, ExecutionMode, InMemoryStorage, ModelWriter, SaveMode,
    SchemaAdapter, StorageMutator, WorkQueue,
};
use support::todos_schema;

fn collecting_notifier() -> (Arc<ChangeNotifier>, Arc<Mutex<Vec<String>>>) {
    let notifier = Arc::new(ChangeNotifier::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    notifier.on("todos", move |kind| sink.lock().unwrap().push(kind));

    (notifier, seen)
}

#[test]
fn immediate_mutations_notify_in_order() {
    let schema = todos_schema();
    let storage = Arc::new(InMemoryStorage::new());
    let queue = WorkQueue::spawn();
    let (notifier, seen) = collecting_notifier();

    let writer = ModelWriter::new(
        SchemaAdapter::new(Arc::clone(&schema)),
        Arc::clone(&storage) as Arc<dyn StorageMutator>,
        Arc::new(queue.handle()),
    )
    .with_notifier(notifier);

    let todo = Container::new(Arc::clone(&schema));
    todo.set("title", "watch me").unwrap();

    writer.insert(&todo, ExecutionMode::Immediate).unwrap();
    todo.set("title", "watched").unwrap();
    writer.update(&todo, ExecutionMode::Immediate).unwrap();
    writer.delete(&todo, ExecutionMode::Immediate).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["inserted", "updated", "deleted"]);
    queue.stop();
}

#[test]
fn queued_mutations_notify_after_the_queue_runs_them() {
    let schema = todos_schema();
    let storage = Arc::new(InMemoryStorage::new());
    let queue = WorkQueue::spawn();
    let (notifier, seen) = collecting_notifier();

    let writer = ModelWriter::new(
        SchemaAdapter::new(Arc::clone(&schema)),
        Arc::clone(&storage) as Arc<dyn StorageMutator>,
        Arc::new(queue.handle()),
    )
    .with_notifier(notifier);

    let todo = Container::new(Arc::clone(&schema));
    todo.set("title", "deferred").unwrap();
    writer
        .save(&todo, SaveMode::Auto, ExecutionMode::Queued)
        .unwrap();

    queue.stop();
    assert_eq!(*seen.lock().unwrap(), vec!["saved"]);
}

#[test]
fn failed_mutations_do_not_notify() {
    let schema = todos_schema();
    let storage = Arc::new(InMemoryStorage::new());
    let queue = WorkQueue::spawn();
    let (notifier, seen) = collecting_notifier();

    let writer = ModelWriter::new(
        SchemaAdapter::new(Arc::clone(&schema)),
        Arc::clone(&storage) as Arc<dyn StorageMutator>,
        Arc::new(queue.handle()),
    )
    .with_notifier(notifier);

    let todo = Container::new(Arc::clone(&schema));
    todo.set("title", "only once").unwrap();
    writer.insert(&todo, ExecutionMode::Immediate).unwrap();

    // Duplicate identity: the insert fails and no notification fires.
    writer.insert(&todo, ExecutionMode::Immediate).unwrap_err();

    assert_eq!(*seen.lock().unwrap(), vec!["inserted"]);
    queue.stop();
}
