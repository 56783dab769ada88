//! Schema-driven adapter: the generic implementation for any model kind.

use std::sync::Arc;

use super::{AdapterError, ContainerAdapter};
use crate::container::Container;
use crate::schema::TableSchema;
use crate::value::ColumnValue;

/// [`ContainerAdapter`] resolved entirely from a [`TableSchema`].
///
/// No per-type code: identity, column typing, and the autoincrement pair all
/// come from the schema the adapter was constructed with. Configuration-only;
/// a single instance serves any number of concurrent calls.
pub struct SchemaAdapter {
    schema: Arc<TableSchema>,
}

impl SchemaAdapter {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        SchemaAdapter { schema }
    }
}

impl ContainerAdapter for SchemaAdapter {
    fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    fn write_auto_increment_id(&self, container: &Container, id: i64) -> Result<(), AdapterError> {
        match self.schema.auto_increment_column() {
            Some(column) => Ok(container.set(column, ColumnValue::Integer(id))?),
            None => Ok(()),
        }
    }

    fn read_auto_increment_id(&self, container: &Container) -> i64 {
        let Some(column) = self.schema.auto_increment_column() else {
            return 0;
        };
        match container.get(column) {
            Ok(Some(ColumnValue::Integer(id))) => id,
            _ => 0,
        }
    }
}
