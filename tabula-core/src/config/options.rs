//! Driver option maps keyed by numeric attribute codes.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

/// Attribute code for the connect timeout.
pub const ATTR_TIMEOUT: i64 = 2;

/// Attribute code for the error reporting mode.
pub const ATTR_ERRMODE: i64 = 3;

/// Error mode value that raises on failure.
pub const ERRMODE_EXCEPTION: i64 = 2;

/// A driver option value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionValue {
    /// Integer value.
    Int(i64),
    /// Float value, only accepted for the timeout attribute.
    Float(f64),
}

impl OptionValue {
    /// Integer view, truncating floats.
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Int(i) => *i,
            Self::Float(f) => f.trunc() as i64,
        }
    }

    fn to_value(self) -> Value {
        match self {
            Self::Int(i) => Value::from(i),
            Self::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        }
    }
}

/// Ordered map of attribute code to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverOptions {
    entries: BTreeMap<i64, OptionValue>,
}

impl DriverOptions {
    /// Create an empty option map.
    pub fn new() -> Self {
        Self::default()
    }

    /// The options applied when the configuration supplies none.
    pub fn defaults() -> Self {
        let mut options = Self::new();
        options.insert(ATTR_TIMEOUT, OptionValue::Int(super::DEFAULT_TIMEOUT));
        options.insert(ATTR_ERRMODE, OptionValue::Int(ERRMODE_EXCEPTION));
        options
    }

    /// Read the entries that qualify as driver options from a loose value.
    ///
    /// Integer keys with integer values are kept, as is a float under [`ATTR_TIMEOUT`].
    /// Anything that is not a list or mapping yields an empty map.
    pub fn from_value(value: &Value) -> Self {
        let mut options = Self::new();
        for (key, value) in entries(value) {
            match value {
                Value::Number(n) if n.is_i64() => {
                    if let Some(i) = n.as_i64() {
                        options.insert(key, OptionValue::Int(i));
                    }
                }
                Value::Number(n) if n.is_f64() && key == ATTR_TIMEOUT => {
                    if let Some(f) = n.as_f64() {
                        options.insert(key, OptionValue::Float(f));
                    }
                }
                _ => {}
            }
        }
        options
    }

    /// Add integer entries from `value` whose keys are not yet present.
    pub fn fill_from(&mut self, value: &Value) {
        for (key, value) in entries(value) {
            if let Some(i) = value.as_i64().filter(|_| value.is_i64()) {
                self.entries.entry(key).or_insert(OptionValue::Int(i));
            }
        }
    }

    /// Get an option.
    pub fn get(&self, key: i64) -> Option<OptionValue> {
        self.entries.get(&key).copied()
    }

    /// Set an option.
    pub fn insert(&mut self, key: i64, value: OptionValue) {
        self.entries.insert(key, value);
    }

    /// Whether an option is set.
    pub fn contains(&self, key: i64) -> bool {
        self.entries.contains_key(&key)
    }

    /// Connect timeout option, if set.
    pub fn timeout(&self) -> Option<OptionValue> {
        self.get(ATTR_TIMEOUT)
    }

    /// Iterate in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, OptionValue)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no options are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mapping form with decimal string keys.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_value()))
                .collect::<Map<String, Value>>(),
        )
    }
}

/// Whether a value is a list or mapping usable as an option source.
pub(crate) fn is_collection(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Integer-keyed entries of a list or mapping; mapping keys must be decimal integers.
fn entries(value: &Value) -> Vec<(i64, &Value)> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| i64::try_from(i).ok().map(|i| (i, v)))
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| integer_key(k).map(|k| (k, v)))
            .collect(),
        _ => Vec::new(),
    }
}

fn integer_key(key: &str) -> Option<i64> {
    let canonical = key == "0"
        || (!key.starts_with('0') && !key.starts_with("-0") && !key.starts_with('+'));
    if canonical { key.parse().ok() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = DriverOptions::defaults();
        assert_eq!(options.to_value(), json!({"2": 5, "3": 2}));
    }

    #[test]
    fn test_from_value_filters_entries() {
        let options = DriverOptions::from_value(&json!({
            "2": 1.5,
            "3": 0,
            "7": "text",
            "8": 2.5,
            "name": 4,
            "012": 9
        }));
        assert_eq!(options.get(ATTR_TIMEOUT), Some(OptionValue::Float(1.5)));
        assert_eq!(options.get(ATTR_ERRMODE), Some(OptionValue::Int(0)));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_list_indices_are_keys() {
        let options = DriverOptions::from_value(&json!([10, 11, 12]));
        assert_eq!(options.get(2), Some(OptionValue::Int(12)));
    }

    #[test]
    fn test_fill_from_keeps_existing() {
        let mut options = DriverOptions::from_value(&json!({"3": 1}));
        options.fill_from(&json!({"3": 9, "4": 4, "5": 1.0}));
        assert_eq!(options.get(3), Some(OptionValue::Int(1)));
        assert_eq!(options.get(4), Some(OptionValue::Int(4)));
        assert!(!options.contains(5));
    }

    #[test]
    fn test_non_collection_is_empty() {
        assert!(DriverOptions::from_value(&json!("2=5")).is_empty());
        assert!(!is_collection(&json!(7)));
    }
}
