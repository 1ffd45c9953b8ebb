//! Values bound into `?` placeholders.

use serde_json::Value;

/// A value to substitute for one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value, rendered without quoting.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// List value, rendered as a parenthesized, comma-separated group.
    List(Vec<BindValue>),
}

impl BindValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Loose emptiness of a single value.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::Text(s) => s.is_empty() || s == "0",
            Self::List(items) => items.is_empty(),
        }
    }

    /// Text a quoting primitive receives for a scalar.
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => String::new(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(BindValue::to_text)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl<T: Into<BindValue>> From<Option<T>> for BindValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<BindValue>> From<Vec<T>> for BindValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for BindValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::List(map.into_iter().map(|(_, v)| Self::from(v)).collect()),
        }
    }
}

/// Ordered values for the placeholders of one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: Vec<BindValue>,
}

impl Bindings {
    /// No bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value.
    pub fn push(mut self, value: impl Into<BindValue>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the values.
    pub fn as_slice(&self) -> &[BindValue] {
        &self.values
    }

    /// Consume into the values.
    pub fn into_vec(self) -> Vec<BindValue> {
        self.values
    }
}

impl<T: Into<BindValue>> From<Vec<T>> for Bindings {
    fn from(values: Vec<T>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single value binds one placeholder; a list spreads over several, and an empty
/// scalar means no bindings at all.
impl From<BindValue> for Bindings {
    fn from(value: BindValue) -> Self {
        match value {
            BindValue::List(values) => Self { values },
            v if v.is_empty() => Self::new(),
            v => Self { values: vec![v] },
        }
    }
}

impl<T: Into<BindValue>> FromIterator<T> for Bindings {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a BindValue;
    type IntoIter = std::slice::Iter<'a, BindValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
