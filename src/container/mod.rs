//! Name-indexed row containers.
//!
//! A [`Container`] holds one logical row of some model without a concrete
//! struct: field values are looked up by column name against a fixed schema.
//! Unknown columns are signaled distinctly from declared-but-unset columns.
//!
//! `Clone` shares the value map. This is what lets a queued write thread the
//! storage-assigned id back into the same logical container the caller still
//! holds.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::schema::TableSchema;
use crate::value::{ColumnType, ColumnValue};

#[derive(Debug, Clone, PartialEq)]
pub enum ContainerError {
    UnknownColumn {
        table: String,
        column: String,
    },
    TypeMismatch {
        table: String,
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },
    LockPoisoned(&'static str),
    Serde(String),
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::UnknownColumn { table, column } => {
                write!(f, "unknown column {} on table {}", column, table)
            }
            ContainerError::TypeMismatch {
                table,
                column,
                expected,
                found,
            } => write!(
                f,
                "column {} on table {} holds {}, got {}",
                column, table, expected, found
            ),
            ContainerError::LockPoisoned(operation) => {
                write!(f, "container lock poisoned during {}", operation)
            }
            ContainerError::Serde(message) => write!(f, "container serde error: {}", message),
        }
    }
}

impl std::error::Error for ContainerError {}

/// Schema-bound, name-indexed holder of row field values.
///
/// ```
/// use std::sync::Arc;
/// use flexrow::{ColumnType, Container, TableSchema};
///
/// let schema = Arc::new(
///     TableSchema::builder("todos")
///         .primary_key("id", ColumnType::Integer)
///         .column("title", ColumnType::Text)
///         .build()
///         .unwrap(),
/// );
///
/// let todo = Container::new(schema);
/// todo.set("title", "write docs").unwrap();
///
/// // Declared but unset is Ok(None); a foreign name is an error.
/// assert!(todo.get("id").unwrap().is_none());
/// assert!(todo.get("priority").is_err());
/// ```
#[derive(Clone)]
pub struct Container {
    schema: Arc<TableSchema>,
    values: Arc<RwLock<BTreeMap<String, ColumnValue>>>,
}

impl Container {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Container {
            schema,
            values: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    fn declared_type(&self, column: &str) -> Result<ColumnType, ContainerError> {
        self.schema
            .column_type(column)
            .ok_or_else(|| ContainerError::UnknownColumn {
                table: self.schema.table().to_string(),
                column: column.to_string(),
            })
    }

    /// Current value of a column: `Ok(None)` when declared but unset,
    /// `UnknownColumn` for names outside the schema.
    pub fn get(&self, column: &str) -> Result<Option<ColumnValue>, ContainerError> {
        self.declared_type(column)?;
        let values = self
            .values
            .read()
            .map_err(|_| ContainerError::LockPoisoned("read"))?;
        Ok(values.get(column).cloned())
    }

    /// Store a value under a column, checking the name and the value's kind
    /// against the schema. `Null` is accepted under any declared type.
    pub fn set(
        &self,
        column: &str,
        value: impl Into<ColumnValue>,
    ) -> Result<(), ContainerError> {
        let declared = self.declared_type(column)?;
        let value = value.into();
        if !value.matches_type(declared) {
            return Err(ContainerError::TypeMismatch {
                table: self.schema.table().to_string(),
                column: column.to_string(),
                expected: declared,
                found: value.kind().unwrap_or(declared),
            });
        }

        let mut values = self
            .values
            .write()
            .map_err(|_| ContainerError::LockPoisoned("write"))?;
        values.insert(column.to_string(), value);
        Ok(())
    }

    /// Remove a column's value, returning it to the declared-but-unset state.
    pub fn unset(&self, column: &str) -> Result<(), ContainerError> {
        self.declared_type(column)?;
        let mut values = self
            .values
            .write()
            .map_err(|_| ContainerError::LockPoisoned("write"))?;
        values.remove(column);
        Ok(())
    }

    pub fn is_set(&self, column: &str) -> Result<bool, ContainerError> {
        self.declared_type(column)?;
        let values = self
            .values
            .read()
            .map_err(|_| ContainerError::LockPoisoned("read"))?;
        Ok(values.contains_key(column))
    }

    /// Number of columns currently holding a value.
    pub fn set_count(&self) -> usize {
        self.values.read().map(|values| values.len()).unwrap_or(0)
    }

    /// Copy of the current row image, handed to storage engines.
    pub fn snapshot(&self) -> Result<BTreeMap<String, ColumnValue>, ContainerError> {
        let values = self
            .values
            .read()
            .map_err(|_| ContainerError::LockPoisoned("read"))?;
        Ok(values.clone())
    }

    /// Bulk-fill from (column, value) pairs; every pair is validated.
    pub fn load<K, V, I>(&self, pairs: I) -> Result<(), ContainerError>
    where
        K: AsRef<str>,
        V: Into<ColumnValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (column, value) in pairs {
            self.set(column.as_ref(), value)?;
        }
        Ok(())
    }

    /// Fill from a JSON object, coercing each member to its declared column
    /// type (blobs from base64 text). The shape callers use when the row
    /// arrives from deserialization instead of code.
    pub fn load_json(&self, value: &serde_json::Value) -> Result<(), ContainerError> {
        let object = value.as_object().ok_or_else(|| {
            ContainerError::Serde(format!(
                "expected a JSON object for table {}",
                self.schema.table()
            ))
        })?;

        for (column, member) in object {
            let declared = self.declared_type(column)?;
            let coerced = ColumnValue::coerce_json(declared, member).ok_or_else(|| {
                ContainerError::Serde(format!(
                    "cannot read {} as {} for column {} on table {}",
                    member,
                    declared,
                    column,
                    self.schema.table()
                ))
            })?;
            self.set(column, coerced)?;
        }
        Ok(())
    }

    /// Deserialize the currently set columns into a concrete model type.
    /// Blob columns surface as base64 text.
    pub fn to_model<T: serde::de::DeserializeOwned>(&self) -> Result<T, ContainerError> {
        serde_json::from_value(self.to_json()?)
            .map_err(|err| ContainerError::Serde(err.to_string()))
    }

    /// Fill from a concrete model, coercing each field to its declared
    /// column type.
    pub fn load_model<T: serde::Serialize>(&self, model: &T) -> Result<(), ContainerError> {
        let value =
            serde_json::to_value(model).map_err(|err| ContainerError::Serde(err.to_string()))?;
        self.load_json(&value)
    }

    /// JSON object of the currently set columns. Blobs render as base64 text.
    pub fn to_json(&self) -> Result<serde_json::Value, ContainerError> {
        let values = self
            .values
            .read()
            .map_err(|_| ContainerError::LockPoisoned("read"))?;
        let mut object = serde_json::Map::new();
        for (column, value) in values.iter() {
            object.insert(column.clone(), value.to_json());
        }
        Ok(serde_json::Value::Object(object))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Container");
        debug.field("table", &self.schema.table());
        match self.values.read() {
            Ok(values) => debug.field("values", &*values).finish(),
            Err(_) => debug.field("values", &"<poisoned>").finish(),
        }
    }
}
