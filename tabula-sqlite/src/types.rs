//! Conversions between bind values, SQLite values and JSON rows.

use rusqlite::types::{Value, ValueRef};
use serde_json::Value as JsonValue;
use tabula_core::{BindValue, Row};

/// Convert a bind value to a SQLite value. Lists are stored as JSON text.
pub fn bind_to_sqlite(value: &BindValue) -> Value {
    match value {
        BindValue::Null => Value::Null,
        BindValue::Bool(b) => Value::Integer(i64::from(*b)),
        BindValue::Int(i) => Value::Integer(*i),
        BindValue::Float(f) => Value::Real(*f),
        BindValue::Text(s) => Value::Text(s.clone()),
        BindValue::List(items) => {
            Value::Text(JsonValue::Array(items.iter().map(bind_to_json).collect()).to_string())
        }
    }
}

fn bind_to_json(value: &BindValue) -> JsonValue {
    match value {
        BindValue::Null => JsonValue::Null,
        BindValue::Bool(b) => JsonValue::Bool(*b),
        BindValue::Int(i) => JsonValue::from(*i),
        BindValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        BindValue::Text(s) => JsonValue::String(s.clone()),
        BindValue::List(items) => JsonValue::Array(items.iter().map(bind_to_json).collect()),
    }
}

/// Convert a SQLite value to JSON.
pub fn from_sqlite_value(value: ValueRef<'_>) -> JsonValue {
    match value {
        ValueRef::Null => JsonValue::Null,
        ValueRef::Integer(i) => JsonValue::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        ValueRef::Text(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => JsonValue::String(s.to_string()),
            Err(_) => JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect()),
        },
    }
}

/// Read a whole row into a column-keyed map.
pub(crate) fn row_to_map(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Row> {
    let mut map = Row::new();
    for (i, column) in columns.iter().enumerate() {
        map.insert(column.clone(), from_sqlite_value(row.get_ref(i)?));
    }
    Ok(map)
}
