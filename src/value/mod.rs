//! Column values and their dynamic type tags.
//!
//! A container row is a mapping from column name to [`ColumnValue`]. The
//! [`ColumnType`] tag is what callers use to coerce raw data into the right
//! shape when the model's concrete type is not known at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The declared storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Blob => "blob",
        };
        write!(f, "{}", name)
    }
}

/// A single cell value inside a container row.
///
/// `Null` is a present-but-null value. A column that was never set is
/// represented by absence from the container, not by `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(#[serde(with = "blob_serde")] Vec<u8>),
}

mod blob_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

impl ColumnValue {
    /// The type tag of this value, or `None` for `Null`.
    pub fn kind(&self) -> Option<ColumnType> {
        match self {
            ColumnValue::Null => None,
            ColumnValue::Integer(_) => Some(ColumnType::Integer),
            ColumnValue::Real(_) => Some(ColumnType::Real),
            ColumnValue::Text(_) => Some(ColumnType::Text),
            ColumnValue::Blob(_) => Some(ColumnType::Blob),
        }
    }

    /// Whether this value can be stored under the given declared type.
    /// `Null` is storable under any type.
    pub fn matches_type(&self, column_type: ColumnType) -> bool {
        match self.kind() {
            Some(kind) => kind == column_type,
            None => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ColumnValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Real view of this value; integers widen to `f64`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ColumnValue::Real(value) => Some(*value),
            ColumnValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::Blob(value) => Some(value),
            _ => None,
        }
    }

    /// Coerce a JSON value into the given column type.
    ///
    /// Returns `None` when the JSON shape does not fit the declared type.
    /// Blobs are read from base64 text.
    pub fn coerce_json(column_type: ColumnType, value: &serde_json::Value) -> Option<ColumnValue> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        use serde_json::Value;

        match value {
            Value::Null => Some(ColumnValue::Null),
            Value::Bool(flag) if column_type == ColumnType::Integer => {
                Some(ColumnValue::Integer(*flag as i64))
            }
            Value::Number(number) => match column_type {
                ColumnType::Integer => number.as_i64().map(ColumnValue::Integer),
                ColumnType::Real => number.as_f64().map(ColumnValue::Real),
                _ => None,
            },
            Value::String(text) => match column_type {
                ColumnType::Text => Some(ColumnValue::Text(text.clone())),
                ColumnType::Blob => STANDARD.decode(text).ok().map(ColumnValue::Blob),
                _ => None,
            },
            _ => None,
        }
    }

    /// JSON form of this value. Blobs render as base64 text.
    pub fn to_json(&self) -> serde_json::Value {
        use base64::{engine::general_purpose::STANDARD, Engine};
        use serde_json::Value;

        match self {
            ColumnValue::Null => Value::Null,
            ColumnValue::Integer(value) => Value::from(*value),
            ColumnValue::Real(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnValue::Text(value) => Value::from(value.as_str()),
            ColumnValue::Blob(bytes) => Value::from(STANDARD.encode(bytes)),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        ColumnValue::Integer(value)
    }
}

impl From<i32> for ColumnValue {
    fn from(value: i32) -> Self {
        ColumnValue::Integer(value as i64)
    }
}

impl From<f64> for ColumnValue {
    fn from(value: f64) -> Self {
        ColumnValue::Real(value)
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::Text(value.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        ColumnValue::Text(value)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(value: Vec<u8>) -> Self {
        ColumnValue::Blob(value)
    }
}

impl From<bool> for ColumnValue {
    fn from(value: bool) -> Self {
        ColumnValue::Integer(value as i64)
    }
}
