//! HashMap-backed storage engine for testing and single-process use.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::{SaveMode, SaveOutcome, StorageError, StorageMutator};
use crate::adapter::{AdapterError, ContainerAdapter};
use crate::container::Container;
use crate::predicate::Predicate;
use crate::value::ColumnValue;

type Row = BTreeMap<String, ColumnValue>;

/// One stored row: the engine-assigned rowid plus the encoded column map.
struct StoredRow {
    rowid: i64,
    bytes: Vec<u8>,
}

struct TableData {
    rows: Vec<StoredRow>,
    next_rowid: i64,
}

impl Default for TableData {
    fn default() -> Self {
        TableData {
            rows: Vec::new(),
            next_rowid: 1,
        }
    }
}

/// In-memory storage engine backed by a HashMap of tables.
///
/// Rows are stored as bitcode-encoded column maps. Clone-friendly via Arc:
/// clones share the same tables. Tables appear on first insert; mutating an
/// absent table matches zero rows.
#[derive(Clone)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<HashMap<String, TableData>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn encode(row: &Row) -> Result<Vec<u8>, StorageError> {
        bitcode::serialize(row).map_err(|err| StorageError::Encode(err.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Row, StorageError> {
        bitcode::deserialize(bytes).map_err(|err| StorageError::Decode(err.to_string()))
    }

    /// Number of rows currently stored for a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(table).map(|data| data.rows.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    /// Decoded images of the rows a predicate matches. Test-facing.
    pub fn find_matching(
        &self,
        table: &str,
        predicate: &Predicate,
    ) -> Result<Vec<Row>, StorageError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StorageError::LockPoisoned("read"))?;
        let Some(data) = tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for stored in &data.rows {
            let row = Self::decode(&stored.bytes)?;
            if predicate.matches(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn count_matching(&self, table: &str, predicate: &Predicate) -> Result<u64, StorageError> {
        Ok(self.find_matching(table, predicate)?.len() as u64)
    }

    fn insert_row(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<i64, StorageError> {
        let schema = adapter.schema();
        let auto_column = schema.auto_increment_column();

        // Identity check up front: a fully-populated primary key must not
        // collide; an unset autoincrement key is the one legitimate gap.
        match adapter.primary_key_predicate(container) {
            Ok(predicate) => {
                if self.count_matching(schema.table(), &predicate)? > 0 {
                    return Err(StorageError::Constraint {
                        table: schema.table().to_string(),
                        message: "primary key already exists".to_string(),
                    });
                }
            }
            Err(AdapterError::MissingPrimaryKey { ref column, .. })
                if auto_column == Some(column.as_str()) => {}
            Err(err) => return Err(StorageError::Metadata(err)),
        }

        let provided = match auto_column {
            Some(column) => container
                .get(column)
                .map_err(|err| StorageError::Metadata(err.into()))?
                .and_then(|value| value.as_integer()),
            None => None,
        };

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        let data = tables.entry(schema.table().to_string()).or_default();

        let rowid = match provided {
            Some(id) => {
                data.next_rowid = data.next_rowid.max(id + 1);
                id
            }
            None => {
                let id = data.next_rowid;
                data.next_rowid += 1;
                id
            }
        };

        if auto_column.is_some() {
            adapter
                .write_auto_increment_id(container, rowid)
                .map_err(StorageError::Metadata)?;
        }

        let row = container
            .snapshot()
            .map_err(|err| StorageError::Metadata(err.into()))?;
        let bytes = Self::encode(&row)?;
        data.rows.push(StoredRow { rowid, bytes });

        debug!(table = %schema.table(), rowid, "row inserted");
        Ok(rowid)
    }

    fn update_rows(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<u64, StorageError> {
        let schema = adapter.schema();
        let predicate = adapter.primary_key_predicate(container)?;
        let updates = container
            .snapshot()
            .map_err(|err| StorageError::Metadata(err.into()))?;

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        let Some(data) = tables.get_mut(schema.table()) else {
            return Ok(0);
        };

        let mut matched = 0;
        for stored in data.rows.iter_mut() {
            let mut row = Self::decode(&stored.bytes)?;
            if predicate.matches(&row) {
                for (column, value) in &updates {
                    row.insert(column.clone(), value.clone());
                }
                stored.bytes = Self::encode(&row)?;
                matched += 1;
            }
        }

        debug!(table = %schema.table(), matched, "rows updated");
        Ok(matched)
    }

    fn delete_rows(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<u64, StorageError> {
        let schema = adapter.schema();
        let predicate = adapter.primary_key_predicate(container)?;

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StorageError::LockPoisoned("write"))?;
        let Some(data) = tables.get_mut(schema.table()) else {
            return Ok(0);
        };

        let decoded = data
            .rows
            .iter()
            .map(|stored| Self::decode(&stored.bytes))
            .collect::<Result<Vec<Row>, StorageError>>()?;

        let mut removed = 0;
        let mut index = 0;
        data.rows.retain(|_| {
            let keep = !predicate.matches(&decoded[index]);
            index += 1;
            if !keep {
                removed += 1;
            }
            keep
        });

        debug!(table = %schema.table(), removed, "rows deleted");
        Ok(removed)
    }
}

impl StorageMutator for InMemoryStorage {
    fn apply_save(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
        mode: SaveMode,
    ) -> Result<SaveOutcome, StorageError> {
        match mode {
            SaveMode::InsertOnly => self
                .insert_row(container, adapter)
                .map(SaveOutcome::Inserted),
            SaveMode::UpdateOnly => self
                .update_rows(container, adapter)
                .map(SaveOutcome::Updated),
            SaveMode::Auto => {
                let schema = adapter.schema();
                match adapter.primary_key_predicate(container) {
                    Ok(predicate) => {
                        if self.count_matching(schema.table(), &predicate)? > 0 {
                            self.update_rows(container, adapter).map(SaveOutcome::Updated)
                        } else {
                            self.insert_row(container, adapter).map(SaveOutcome::Inserted)
                        }
                    }
                    Err(AdapterError::MissingPrimaryKey { ref column, .. })
                        if schema.auto_increment_column() == Some(column.as_str()) =>
                    {
                        self.insert_row(container, adapter).map(SaveOutcome::Inserted)
                    }
                    Err(err) => Err(StorageError::Metadata(err)),
                }
            }
        }
    }

    fn apply_insert(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<i64, StorageError> {
        self.insert_row(container, adapter)
    }

    fn apply_update(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<u64, StorageError> {
        self.update_rows(container, adapter)
    }

    fn apply_delete(
        &self,
        container: &Container,
        adapter: &dyn ContainerAdapter,
    ) -> Result<u64, StorageError> {
        self.delete_rows(container, adapter)
    }
}
