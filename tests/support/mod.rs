#![allow(dead_code)]

use std::sync::Arc;

use flexrow::{
    ColumnType, InMemoryStorage, ModelWriter, QueueStats, SchemaAdapter, StorageMutator,
    TableSchema, WorkQueue,
};

/// Todos: autoincrementing integer identity plus payload columns.
pub fn todos_schema() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::builder("todos")
            .primary_key("id", ColumnType::Integer)
            .auto_increment("id")
            .column("title", ColumnType::Text)
            .column("done", ColumnType::Integer)
            .column("attachment", ColumnType::Blob)
            .build()
            .unwrap(),
    )
}

/// Tags: composite primary key, no autoincrement.
pub fn tags_schema() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::builder("tags")
            .primary_key("todo_id", ColumnType::Integer)
            .primary_key("label", ColumnType::Text)
            .column("weight", ColumnType::Real)
            .build()
            .unwrap(),
    )
}

/// A writer wired to in-memory storage and a live work queue.
pub struct Harness {
    pub storage: Arc<InMemoryStorage>,
    pub queue: WorkQueue,
    pub writer: ModelWriter<SchemaAdapter>,
}

impl Harness {
    /// Stop the queue, draining any queued work, and return its stats.
    pub fn finish(self) -> QueueStats {
        self.queue.stop()
    }
}

pub fn harness(schema: Arc<TableSchema>) -> Harness {
    let storage = Arc::new(InMemoryStorage::new());
    let queue = WorkQueue::spawn();
    let writer = ModelWriter::new(
        SchemaAdapter::new(schema),
        Arc::clone(&storage) as Arc<dyn StorageMutator>,
        Arc::new(queue.handle()),
    );
    Harness {
        storage,
        queue,
        writer,
    }
}
