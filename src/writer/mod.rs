//! CRUD dispatch: translating container mutations into storage operations,
//! inline or on an execution queue.
//!
//! [`ModelWriter`] binds one adapter to a storage mutator and a task queue.
//! Every entry point takes `&self` and holds no per-call state, so one writer
//! serves concurrent calls for different containers. Queued dispatch is
//! fire-and-forget: the call returns once the task is accepted, and storage
//! failures inside the task are reported through logging only.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::adapter::{AdapterError, ContainerAdapter};
use crate::container::Container;
#[cfg(feature = "emitter")]
use crate::notify::ChangeNotifier;
use crate::queue::{QueueError, Task, TaskSubmitter};
use crate::storage::{SaveMode, StorageError, StorageMutator};

/// Whether a CRUD call runs on the caller's thread or is submitted to the
/// execution queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Immediate,
    Queued,
}

/// Which mutation a change notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Saved,
    Inserted,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Saved => "saved",
            ChangeKind::Inserted => "inserted",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteError {
    Metadata(AdapterError),
    Storage(StorageError),
    Queue(QueueError),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Metadata(err) => write!(f, "{}", err),
            WriteError::Storage(err) => write!(f, "{}", err),
            WriteError::Queue(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for WriteError {}

impl From<AdapterError> for WriteError {
    fn from(err: AdapterError) -> Self {
        WriteError::Metadata(err)
    }
}

impl From<StorageError> for WriteError {
    fn from(err: StorageError) -> Self {
        WriteError::Storage(err)
    }
}

impl From<QueueError> for WriteError {
    fn from(err: QueueError) -> Self {
        WriteError::Queue(err)
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Save(SaveMode),
    Insert,
    Update,
    Delete,
}

impl Op {
    fn name(self) -> &'static str {
        match self {
            Op::Save(_) => "save",
            Op::Insert => "insert",
            Op::Update => "update",
            Op::Delete => "delete",
        }
    }

    fn kind(self) -> ChangeKind {
        match self {
            Op::Save(_) => ChangeKind::Saved,
            Op::Insert => ChangeKind::Inserted,
            Op::Update => ChangeKind::Updated,
            Op::Delete => ChangeKind::Deleted,
        }
    }
}

/// Post-mutation notification hook; empty when the emitter feature is off.
#[derive(Clone, Default)]
struct Notify {
    #[cfg(feature = "emitter")]
    notifier: Option<Arc<ChangeNotifier>>,
}

impl Notify {
    fn emit(&self, table: &str, kind: ChangeKind) {
        #[cfg(feature = "emitter")]
        if let Some(notifier) = &self.notifier {
            notifier.notify(table, kind);
        }
        #[cfg(not(feature = "emitter"))]
        {
            let _ = (table, kind);
        }
    }
}

/// CRUD entry points for one model kind.
///
/// ## Example
///
/// ```ignore
/// use std::sync::Arc;
/// use flexrow::{
///     Container, ExecutionMode, InMemoryStorage, ModelWriter, SchemaAdapter, WorkQueue,
/// };
///
/// let queue = WorkQueue::spawn();
/// let writer = ModelWriter::new(
///     SchemaAdapter::new(Arc::clone(&schema)),
///     Arc::new(InMemoryStorage::new()),
///     Arc::new(queue.handle()),
/// );
///
/// let todo = Container::new(schema);
/// todo.set("title", "ship it")?;
///
/// // Inline: the generated id is readable as soon as the call returns.
/// writer.insert(&todo, ExecutionMode::Immediate)?;
///
/// // Deferred: returns immediately, the mutation runs on the queue.
/// todo.set("title", "shipped")?;
/// writer.update(&todo, ExecutionMode::Queued)?;
/// ```
pub struct ModelWriter<A> {
    adapter: Arc<A>,
    storage: Arc<dyn StorageMutator>,
    queue: Arc<dyn TaskSubmitter>,
    notify: Notify,
}

impl<A: ContainerAdapter + 'static> ModelWriter<A> {
    pub fn new(
        adapter: A,
        storage: Arc<dyn StorageMutator>,
        queue: Arc<dyn TaskSubmitter>,
    ) -> Self {
        ModelWriter {
            adapter: Arc::new(adapter),
            storage,
            queue,
            notify: Notify::default(),
        }
    }

    /// Attach a change notifier; it fires after each successful mutation, on
    /// the thread that executed it.
    #[cfg(feature = "emitter")]
    pub fn with_notifier(mut self, notifier: Arc<ChangeNotifier>) -> Self {
        self.notify.notifier = Some(notifier);
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Persist the container as an insert or an update per `mode`.
    pub fn save(
        &self,
        container: &Container,
        mode: SaveMode,
        exec: ExecutionMode,
    ) -> Result<(), WriteError> {
        self.run(Op::Save(mode), container, exec)
    }

    /// Insert the container's values. With an autoincrement column declared,
    /// the generated id is written back into the container before an
    /// immediate call returns, or before the queued task completes.
    pub fn insert(&self, container: &Container, exec: ExecutionMode) -> Result<(), WriteError> {
        self.run(Op::Insert, container, exec)
    }

    /// Update the row matching the container's primary-key identity.
    /// Matching zero rows is a no-op, not an error.
    pub fn update(&self, container: &Container, exec: ExecutionMode) -> Result<(), WriteError> {
        // An absent primary-key value is a caller error; surface it before
        // any storage call or enqueue.
        self.adapter.primary_key_predicate(container)?;
        self.run(Op::Update, container, exec)
    }

    /// Delete the row matching the container's primary-key identity.
    pub fn delete(&self, container: &Container, exec: ExecutionMode) -> Result<(), WriteError> {
        self.adapter.primary_key_predicate(container)?;
        self.run(Op::Delete, container, exec)
    }

    fn run(&self, op: Op, container: &Container, exec: ExecutionMode) -> Result<(), WriteError> {
        match exec {
            ExecutionMode::Immediate => {
                apply(op, self.storage.as_ref(), self.adapter.as_ref(), container)?;
                self.notify.emit(self.adapter.schema().table(), op.kind());
                Ok(())
            }
            ExecutionMode::Queued => {
                let storage = Arc::clone(&self.storage);
                let adapter = Arc::clone(&self.adapter);
                let container = container.clone();
                let notify = self.notify.clone();
                let table = self.adapter.schema().table().to_string();

                let task: Task = Box::new(move || {
                    match apply(op, storage.as_ref(), adapter.as_ref(), &container) {
                        Ok(()) => notify.emit(&table, op.kind()),
                        Err(err) => {
                            warn!(table = %table, op = op.name(), error = %err, "queued write failed")
                        }
                    }
                });
                self.queue.submit(task)?;
                Ok(())
            }
        }
    }
}

fn apply(
    op: Op,
    storage: &dyn StorageMutator,
    adapter: &dyn ContainerAdapter,
    container: &Container,
) -> Result<(), StorageError> {
    match op {
        Op::Save(mode) => storage.apply_save(container, adapter, mode).map(|_| ()),
        Op::Insert => storage.apply_insert(container, adapter).map(|rowid| {
            debug!(table = %adapter.schema().table(), rowid, "container inserted");
        }),
        Op::Update => storage.apply_update(container, adapter).map(|_| ()),
        Op::Delete => storage.apply_delete(container, adapter).map(|_| ()),
    }
}
