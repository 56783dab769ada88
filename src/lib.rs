mod adapter;
mod container;
#[cfg(feature = "emitter")]
mod notify;
mod predicate;
mod queue;
mod schema;
mod storage;
mod value;
mod writer;

pub use adapter::{AdapterError, ContainerAdapter, SchemaAdapter};
pub use container::{Container, ContainerError};
#[cfg(feature = "emitter")]
pub use notify::ChangeNotifier;
pub use predicate::{Clause, Predicate, PredicateBuilder, PredicateError};
pub use queue::{QueueError, QueueHandle, QueueStats, Task, TaskSubmitter, WorkQueue};
pub use schema::{AutoIncrement, ColumnDef, SchemaBuilder, SchemaError, TableSchema};
pub use storage::{InMemoryStorage, SaveMode, SaveOutcome, StorageError, StorageMutator};
pub use value::{ColumnType, ColumnValue};
pub use writer::{ChangeKind, ExecutionMode, ModelWriter, WriteError};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
