use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A stored row: a JSON object keyed by column name.
pub type Row = Map<String, Value>;

/// Serialize a record into a row. The record must serialize to an object.
pub fn to_row<T: Serialize>(record: &T) -> StoreResult<Row> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Serialization(format!(
            "expected an object, got {}",
            kind_name(&other)
        ))),
        Err(e) => Err(StoreError::Serialization(e.to_string())),
    }
}

/// Deserialize a row into a record.
pub fn from_row<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
