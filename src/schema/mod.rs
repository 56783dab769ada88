//! Per-model-kind schemas: column names, types, primary keys, and the
//! autoincrement policy.
//!
//! A schema is built once at startup and shared behind `Arc`. Adapters never
//! change their notion of primary keys or column types between calls.

use std::collections::HashSet;
use std::fmt;

use crate::value::ColumnType;

/// Autoincrement policy for a table, chosen at schema construction time.
///
/// With `None`, id write-back is a no-op and read-back reports 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoIncrement {
    None,
    /// The named column receives the storage-assigned id on insert.
    Column(String),
}

/// A single column declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
}

/// Fixed description of one table: ordered columns, primary-key set, and the
/// autoincrement policy.
#[derive(Debug)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnDef>,
    auto_increment: AutoIncrement,
}

impl TableSchema {
    pub fn builder(table: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            table: table.into(),
            columns: Vec::new(),
            auto_increment: None,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|def| def.name == column)
    }

    /// Declared type of a column, or `None` for names outside the schema.
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|def| def.name == column)
            .map(|def| def.column_type)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|def| def.primary_key)
    }

    pub fn auto_increment(&self) -> &AutoIncrement {
        &self.auto_increment
    }

    pub fn auto_increment_column(&self) -> Option<&str> {
        match &self.auto_increment {
            AutoIncrement::Column(name) => Some(name),
            AutoIncrement::None => None,
        }
    }
}

/// Fluent construction for [`TableSchema`], validated at `build`.
///
/// ```
/// use flexrow::{ColumnType, TableSchema};
///
/// let schema = TableSchema::builder("todos")
///     .primary_key("id", ColumnType::Integer)
///     .auto_increment("id")
///     .column("title", ColumnType::Text)
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.auto_increment_column(), Some("id"));
/// ```
pub struct SchemaBuilder {
    table: String,
    columns: Vec<ColumnDef>,
    auto_increment: Option<String>,
}

impl SchemaBuilder {
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            column_type,
            primary_key: false,
        });
        self
    }

    pub fn primary_key(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(ColumnDef {
            name: name.into(),
            column_type,
            primary_key: true,
        });
        self
    }

    /// Mark an already-declared column as the autoincrementing identity.
    /// The column must be the sole `Integer` primary key.
    pub fn auto_increment(mut self, name: impl Into<String>) -> Self {
        self.auto_increment = Some(name.into());
        self
    }

    pub fn build(self) -> Result<TableSchema, SchemaError> {
        if self.columns.is_empty() {
            return Err(SchemaError::NoColumns { table: self.table });
        }

        let mut seen = HashSet::new();
        for def in &self.columns {
            if !seen.insert(def.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.table.clone(),
                    column: def.name.clone(),
                });
            }
        }

        if !self.columns.iter().any(|def| def.primary_key) {
            return Err(SchemaError::NoPrimaryKey { table: self.table });
        }

        let auto_increment = match self.auto_increment {
            None => AutoIncrement::None,
            Some(name) => {
                let def = match self.columns.iter().find(|def| def.name == name) {
                    Some(def) => def,
                    None => {
                        return Err(SchemaError::AutoIncrement {
                            table: self.table,
                            column: name,
                            reason: "not declared",
                        })
                    }
                };
                if def.column_type != ColumnType::Integer {
                    return Err(SchemaError::AutoIncrement {
                        table: self.table,
                        column: name,
                        reason: "must be an integer column",
                    });
                }
                if !def.primary_key
                    || self.columns.iter().filter(|def| def.primary_key).count() != 1
                {
                    return Err(SchemaError::AutoIncrement {
                        table: self.table,
                        column: name,
                        reason: "must be the sole primary key",
                    });
                }
                AutoIncrement::Column(name)
            }
        };

        Ok(TableSchema {
            table: self.table,
            columns: self.columns,
            auto_increment,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    NoColumns {
        table: String,
    },
    DuplicateColumn {
        table: String,
        column: String,
    },
    NoPrimaryKey {
        table: String,
    },
    AutoIncrement {
        table: String,
        column: String,
        reason: &'static str,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NoColumns { table } => {
                write!(f, "table {} declares no columns", table)
            }
            SchemaError::DuplicateColumn { table, column } => {
                write!(f, "table {} declares column {} twice", table, column)
            }
            SchemaError::NoPrimaryKey { table } => {
                write!(f, "table {} declares no primary key", table)
            }
            SchemaError::AutoIncrement {
                table,
                column,
                reason,
            } => write!(
                f,
                "autoincrement column {} on table {}: {}",
                column, table, reason
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn todos() -> SchemaBuilder {
        TableSchema::builder("todos")
            .primary_key("id", ColumnType::Integer)
            .column("title", ColumnType::Text)
            .column("score", ColumnType::Real)
    }

    #[test]
    fn build_and_lookup() {
        let schema = todos().build().unwrap();
        assert_eq!(schema.table(), "todos");
        assert_eq!(schema.columns().len(), 3);
        assert!(schema.contains("title"));
        assert!(!schema.contains("missing"));
        assert_eq!(schema.column_type("score"), Some(ColumnType::Real));
        assert_eq!(schema.column_type("missing"), None);
        assert_eq!(schema.auto_increment(), &AutoIncrement::None);
        assert_eq!(schema.auto_increment_column(), None);
    }

    #[test]
    fn primary_key_columns_in_declaration_order() {
        let schema = TableSchema::builder("tags")
            .primary_key("todo_id", ColumnType::Integer)
            .primary_key("label", ColumnType::Text)
            .column("weight", ColumnType::Real)
            .build()
            .unwrap();

        let keys: Vec<&str> = schema
            .primary_key_columns()
            .map(|def| def.name.as_str())
            .collect();
        assert_eq!(keys, vec!["todo_id", "label"]);
    }

    #[test]
    fn no_columns_rejected() {
        let err = TableSchema::builder("empty").build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::NoColumns {
                table: "empty".into()
            }
        );
    }

    #[test]
    fn duplicate_column_rejected() {
        let err = todos().column("title", ColumnType::Text).build().unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }

    #[test]
    fn missing_primary_key_rejected() {
        let err = TableSchema::builder("loose")
            .column("name", ColumnType::Text)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::NoPrimaryKey { .. }));
    }

    #[test]
    fn auto_increment_must_be_declared() {
        let err = todos().auto_increment("nope").build().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::AutoIncrement {
                reason: "not declared",
                ..
            }
        ));
    }

    #[test]
    fn auto_increment_must_be_integer() {
        let err = TableSchema::builder("t")
            .primary_key("name", ColumnType::Text)
            .auto_increment("name")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::AutoIncrement {
                reason: "must be an integer column",
                ..
            }
        ));
    }

    #[test]
    fn auto_increment_must_be_sole_primary_key() {
        let err = TableSchema::builder("t")
            .primary_key("id", ColumnType::Integer)
            .primary_key("region", ColumnType::Text)
            .auto_increment("id")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::AutoIncrement {
                reason: "must be the sole primary key",
                ..
            }
        ));

        let err = TableSchema::builder("t")
            .primary_key("id", ColumnType::Integer)
            .column("count", ColumnType::Integer)
            .auto_increment("count")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::AutoIncrement { .. }));
    }

    #[test]
    fn auto_increment_accepted() {
        let schema = TableSchema::builder("todos")
            .primary_key("id", ColumnType::Integer)
            .auto_increment("id")
            .column("title", ColumnType::Text)
            .build()
            .unwrap();
        assert_eq!(schema.auto_increment_column(), Some("id"));
    }
}
