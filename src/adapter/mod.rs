//! The per-model-kind adapter contract.
//!
//! A [`ContainerAdapter`] is the metadata source the storage layer consults
//! when persisting a container: the fixed schema, the primary-key identity
//! predicate, dynamic column typing, and the autoincrement pair. Adapters are
//! shared, hold no per-call state, and are safe to use concurrently for
//! different containers.
//!
//! The trait carries the default behaviors; model kinds without an
//! autoincrement column inherit the no-op write-back and the 0 read-back.

mod schema_adapter;

pub use schema_adapter::SchemaAdapter;

use std::fmt;
use std::sync::Arc;

use crate::container::{Container, ContainerError};
use crate::predicate::{Predicate, PredicateError};
use crate::schema::TableSchema;
use crate::value::ColumnType;

#[derive(Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// A primary-key column has no value in the container; the caller handed
    /// us an under-populated row.
    MissingPrimaryKey { table: String, column: String },
    UnknownColumn { table: String, column: String },
    Container(ContainerError),
    Predicate(PredicateError),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::MissingPrimaryKey { table, column } => {
                write!(
                    f,
                    "primary-key column {} on table {} has no value",
                    column, table
                )
            }
            AdapterError::UnknownColumn { table, column } => {
                write!(f, "unknown column {} on table {}", column, table)
            }
            AdapterError::Container(err) => write!(f, "{}", err),
            AdapterError::Predicate(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AdapterError {}

impl From<ContainerError> for AdapterError {
    fn from(err: ContainerError) -> Self {
        AdapterError::Container(err)
    }
}

impl From<PredicateError> for AdapterError {
    fn from(err: PredicateError) -> Self {
        AdapterError::Predicate(err)
    }
}

/// Metadata contract between containers and storage for one model kind.
pub trait ContainerAdapter: Send + Sync {
    /// The fixed schema for this model kind.
    fn schema(&self) -> &Arc<TableSchema>;

    /// Build the predicate "every primary-key column equals its current value
    /// in this container". Fails fast when a required value is absent; a
    /// partial identity predicate is never built.
    fn primary_key_predicate(&self, container: &Container) -> Result<Predicate, AdapterError> {
        let schema = self.schema();
        let mut builder = Predicate::builder();
        for column in schema.primary_key_columns() {
            match container.get(&column.name)? {
                Some(value) => builder = builder.eq(column.name.as_str(), value),
                None => {
                    return Err(AdapterError::MissingPrimaryKey {
                        table: schema.table().to_string(),
                        column: column.name.clone(),
                    })
                }
            }
        }
        Ok(builder.build()?)
    }

    /// Declared type of a column, for callers coercing raw stored values
    /// without static knowledge of the container's shape. Unknown names are
    /// an error, never silently defaulted.
    fn column_type(&self, column: &str) -> Result<ColumnType, AdapterError> {
        self.schema()
            .column_type(column)
            .ok_or_else(|| AdapterError::UnknownColumn {
                table: self.schema().table().to_string(),
                column: column.to_string(),
            })
    }

    /// Store a generated id into the container's autoincrement column.
    /// Model kinds without one keep this default no-op.
    fn write_auto_increment_id(
        &self,
        _container: &Container,
        _id: i64,
    ) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Current autoincrement value, or 0 when none is declared. "Not yet
    /// assigned" also reads as 0; this default does not distinguish the two.
    fn read_auto_increment_id(&self, _container: &Container) -> i64 {
        0
    }
}
