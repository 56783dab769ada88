//! Storage mutation: the contract between adapters and the backing engine,
//! plus an in-memory engine for testing and single-process use.

mod in_memory;
mod mutator;

pub use in_memory::InMemoryStorage;
pub use mutator::StorageMutator;

use std::fmt;

use crate::adapter::AdapterError;

/// How `save` resolves between insert and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Update when the primary-key predicate matches an existing row,
    /// insert otherwise.
    Auto,
    /// Always insert.
    InsertOnly,
    /// Always update; matching zero rows is a no-op.
    UpdateOnly,
}

/// What a `save` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Inserted; carries the engine-assigned rowid.
    Inserted(i64),
    /// Updated; carries the number of rows matched.
    Updated(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    Encode(String),
    Decode(String),
    /// A relational constraint rejected the mutation, e.g. inserting a row
    /// whose primary key already exists.
    Constraint { table: String, message: String },
    /// The adapter could not supply required metadata (identity predicate,
    /// column value) for this mutation.
    Metadata(AdapterError),
    LockPoisoned(&'static str),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Encode(message) => write!(f, "row encode error: {}", message),
            StorageError::Decode(message) => write!(f, "row decode error: {}", message),
            StorageError::Constraint { table, message } => {
                write!(f, "constraint violation on table {}: {}", table, message)
            }
            StorageError::Metadata(err) => write!(f, "{}", err),
            StorageError::LockPoisoned(operation) => {
                write!(f, "storage lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<AdapterError> for StorageError {
    fn from(err: AdapterError) -> Self {
        StorageError::Metadata(err)
    }
}
