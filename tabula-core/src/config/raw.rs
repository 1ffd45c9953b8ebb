//! Loose key-value configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TabulaError, TabulaResult};

/// A heterogeneous configuration mapping.
///
/// Values keep their loose types (strings, numbers, booleans, lists, maps) until
/// normalization decides what each key means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig {
    values: Map<String, Value>,
}

impl RawConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> TabulaResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(TabulaError::invalid_configuration(format!(
                "Configuration must be a mapping, {} given",
                type_name(&other)
            ))),
        }
    }

    /// Parse a JSON document.
    pub fn from_json_str(input: &str) -> TabulaResult<Self> {
        let value: Value = serde_json::from_str(input).map_err(|e| {
            TabulaError::invalid_configuration(format!("Invalid JSON configuration: {}", e))
                .with_source(e)
        })?;
        Self::from_value(value)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(input: &str) -> TabulaResult<Self> {
        let value: Value = toml::from_str(input).map_err(|e| {
            TabulaError::invalid_configuration(format!("Invalid TOML configuration: {}", e))
                .with_source(e)
        })?;
        Self::from_value(value)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Whether the key is present with a non-null value.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_null())
    }

    /// Whether the key is absent or holds an empty value (see [`is_empty_value`]).
    pub fn is_empty_at(&self, key: &str) -> bool {
        self.values.get(key).is_none_or(is_empty_value)
    }

    /// Get a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Mutably borrow the underlying map.
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.values
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for RawConfig {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Loose emptiness: null, `false`, zero, `""`, `"0"` and empty collections are empty.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Type name used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Whether the value is a number or a numeric string.
pub(crate) fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => parse_numeric(s).is_some(),
        _ => false,
    }
}

/// Integer cast of a numeric value, truncating fractions.
pub(crate) fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| parse_numeric(s).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

/// A value that is an integer, either a JSON integer or an integral string.
pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Textual form of a scalar value.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        _ => None,
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    let plausible = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && s.chars().any(|c| c.is_ascii_digit());
    if plausible { s.parse::<f64>().ok() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emptiness() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!(false)));
        assert!(is_empty_value(&json!(0)));
        assert!(is_empty_value(&json!(0.0)));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!("0")));
        assert!(is_empty_value(&json!([])));
        assert!(!is_empty_value(&json!("00")));
        assert!(!is_empty_value(&json!(" ")));
        assert!(!is_empty_value(&json!(-1)));
    }

    #[test]
    fn test_numeric_helpers() {
        assert!(is_numeric(&json!("12")));
        assert!(is_numeric(&json!(" 7.5 ")));
        assert!(is_numeric(&json!("1e3")));
        assert!(!is_numeric(&json!("abc")));
        assert!(!is_numeric(&json!("inf")));
        assert!(!is_numeric(&json!(true)));

        assert_eq!(to_int(&json!("7.9")), Some(7));
        assert_eq!(to_int(&json!(3.99)), Some(3));
        assert_eq!(to_int(&json!("1e3")), Some(1000));
        assert_eq!(to_int(&json!(-4)), Some(-4));
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(as_integer(&json!(3306)), Some(3306));
        assert_eq!(as_integer(&json!("-3306")), Some(-3306));
        assert_eq!(as_integer(&json!(3306.0)), None);
    }

    #[test]
    fn test_from_toml() {
        let config = RawConfig::from_toml_str(
            r#"
            dbname = "shop"
            port = 3307
            [options]
            2 = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.get_str("dbname"), Some("shop"));
        assert_eq!(config.get("port"), Some(&json!(3307)));
        assert_eq!(config.get("options"), Some(&json!({"2": 9})));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = RawConfig::from_value(json!([1, 2])).unwrap_err();
        assert!(err.message.contains("list"));
    }
}
