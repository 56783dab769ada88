//! The mutation primitives a backing engine provides.

use super::{SaveMode, SaveOutcome, StorageError};
use crate::adapter::ContainerAdapter;
use crate::container::Container;

/// Save/insert/update/delete primitives over container rows.
///
/// The adapter is used purely as a metadata source: identity predicate,
/// column types, and the autoincrement setter. Engines do not interpret
/// container contents beyond what the adapter tells them.
pub trait StorageMutator: Send + Sync {
    /// Persist the container as an insert or an update per `mode`.
    fn apply_save(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
        mode: SaveMode,
    ) -> Result<SaveOutcome, StorageError>;

    /// Insert the container's values and return the engine-assigned rowid.
    ///
    /// When the adapter declares an autoincrement column, the generated id is
    /// threaded back through `write_auto_increment_id` before this returns.
    fn apply_insert(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<i64, StorageError>;

    /// Update the rows matching the adapter's primary-key predicate with the
    /// container's set values. Returns the number of rows matched; zero is a
    /// no-op, not an error.
    fn apply_update(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<u64, StorageError>;

    /// Delete the rows matching the adapter's primary-key predicate.
    /// Returns the number of rows removed.
    fn apply_delete(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<u64, StorageError>;
}
