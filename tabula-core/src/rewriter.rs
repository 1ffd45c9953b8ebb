//! Table and identifier rewriting over nested selectors.
//!
//! Every operation maps a [`Selector`] onto a selector of the same shape, rewriting only the
//! names at its leaves.
//!
//! ```rust
//! use tabula_core::{IdentifierRewriter, Selector};
//!
//! let rewriter = IdentifierRewriter::new('`', "wp_", "mydb");
//! assert_eq!(rewriter.prefix_name("mydb.orders", false), "mydb.wp_orders");
//! assert_eq!(rewriter.prefix_name(" orders ", true), "`wp_orders`");
//!
//! let list = Selector::from(vec!["users", "wp_posts"]);
//! assert_eq!(
//!     rewriter.prefix_tables(&list, false).unwrap(),
//!     Selector::from(vec!["wp_users", "wp_posts"])
//! );
//! ```

use indexmap::IndexMap;
use serde_json::Value;

use crate::bind::BindValue;
use crate::connection::Quoter;
use crate::error::{TabulaError, TabulaResult};

/// A table name, or a nested list or record of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single, possibly dotted, name.
    Name(String),
    /// An ordered list.
    List(Vec<Selector>),
    /// A keyed record; keys are kept as is.
    Record(IndexMap<String, Selector>),
    /// A leaf with no textual form, such as a callback or handle. Carries a description.
    Opaque(String),
}

impl Selector {
    /// The name, if this is a single name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// All leaf names in traversal order.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Name(name) => out.push(name),
            Self::List(items) => items.iter().for_each(|s| s.collect_names(out)),
            Self::Record(map) => map.values().for_each(|s| s.collect_names(out)),
            Self::Opaque(_) => {}
        }
    }

    fn try_map<F>(&self, leaf: &mut F) -> TabulaResult<Selector>
    where
        F: FnMut(&str) -> TabulaResult<String>,
    {
        Ok(match self {
            Self::Name(name) => Self::Name(leaf(name)?),
            Self::List(items) => Self::List(
                items
                    .iter()
                    .map(|s| s.try_map(leaf))
                    .collect::<TabulaResult<_>>()?,
            ),
            Self::Record(map) => Self::Record(
                map.iter()
                    .map(|(k, s)| Ok((k.clone(), s.try_map(leaf)?)))
                    .collect::<TabulaResult<_>>()?,
            ),
            Self::Opaque(description) => Self::Opaque(description.clone()),
        })
    }

    fn map<F>(&self, leaf: &mut F) -> Selector
    where
        F: FnMut(&str) -> String,
    {
        match self {
            Self::Name(name) => Self::Name(leaf(name)),
            Self::List(items) => Self::List(items.iter().map(|s| s.map(leaf)).collect()),
            Self::Record(map) => {
                Self::Record(map.iter().map(|(k, s)| (k.clone(), s.map(leaf))).collect())
            }
            Self::Opaque(description) => Self::Opaque(description.clone()),
        }
    }

    fn first_opaque(&self) -> Option<&str> {
        match self {
            Self::Opaque(description) => Some(description),
            Self::List(items) => items.iter().find_map(Self::first_opaque),
            Self::Record(map) => map.values().find_map(Self::first_opaque),
            Self::Name(_) => None,
        }
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<T: Into<Selector>> From<Vec<T>> for Selector {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Selector {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Name(String::new()),
            Value::Bool(true) => Self::Name("1".to_string()),
            Value::Bool(false) => Self::Name(String::new()),
            Value::Number(n) => Self::Name(n.to_string()),
            Value::String(s) => Self::Name(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Record(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// Rewrites table names with a quote character, table prefix and database name.
#[derive(Debug, Clone)]
pub struct IdentifierRewriter {
    quote_char: char,
    prefix: String,
    database: String,
}

impl IdentifierRewriter {
    /// Create a rewriter.
    pub fn new(quote_char: char, prefix: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            quote_char,
            prefix: prefix.into(),
            database: database.into(),
        }
    }

    /// The identifier quote character.
    pub fn quote_char(&self) -> char {
        self.quote_char
    }

    /// The table prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The database name compared against qualified names.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Trim whitespace and quote characters from every dotted segment.
    pub fn trim(&self, selector: &Selector) -> Selector {
        selector.map(&mut |name| self.trim_name(name))
    }

    /// Trim a single name.
    pub fn trim_name(&self, name: &str) -> String {
        self.segments(name).join(".")
    }

    /// Trim, then quote every name as an identifier.
    pub fn quote_identifiers<Q: Quoter + ?Sized>(
        &self,
        selector: &Selector,
        quoter: &Q,
    ) -> TabulaResult<Selector> {
        reject_opaque(selector, "quote identifier")?;
        selector.try_map(&mut |name| Ok(quoter.quote_identifier(&self.trim_name(name))))
    }

    /// Trim, then quote every name as a string literal.
    pub fn quotes<Q: Quoter + ?Sized>(
        &self,
        selector: &Selector,
        quoter: &Q,
    ) -> TabulaResult<Selector> {
        reject_opaque(selector, "quote")?;
        selector.try_map(&mut |name| Ok(quoter.quote(&BindValue::Text(self.trim_name(name)))))
    }

    /// Apply the table prefix to every name.
    pub fn prefix_tables(&self, selector: &Selector, use_identifier: bool) -> TabulaResult<Selector> {
        reject_opaque(selector, "prefix table")?;
        selector.try_map(&mut |name| Ok(self.prefix_name(name, use_identifier)))
    }

    /// Apply the table prefix to one name.
    ///
    /// A name that already contains the quote character is always re-quoted. In a qualified
    /// name only the segment after the configured database is prefixed, and never twice.
    pub fn prefix_name(&self, name: &str, use_identifier: bool) -> String {
        let use_identifier = use_identifier || name.contains(self.quote_char);
        let segments = self.segments(name);
        let q = self.quote_char;

        if self.prefix.is_empty() {
            let joined = segments.join(".");
            return if use_identifier {
                format!("{q}{joined}{q}")
            } else {
                joined
            };
        }

        let mut segments: Vec<String> = segments.into_iter().map(str::to_string).collect();
        match segments.len() {
            1 => segments[0] = self.apply_prefix(&segments[0]),
            _ if segments[0] == self.database => segments[1] = self.apply_prefix(&segments[1]),
            _ => {}
        }

        if use_identifier {
            format!("{q}{}{q}", segments.join(&format!("{q}.{q}")))
        } else {
            segments.join(".")
        }
    }

    fn apply_prefix(&self, table: &str) -> String {
        if table.starts_with(&self.prefix) {
            table.to_string()
        } else {
            format!("{}{}", self.prefix, table)
        }
    }

    fn segments<'a>(&self, name: &'a str) -> Vec<&'a str> {
        let q = self.quote_char;
        name.split('.')
            .map(|part| part.trim_matches(|c: char| c.is_whitespace() || c == '\0' || c == q))
            .collect()
    }
}

fn reject_opaque(selector: &Selector, operation: &str) -> TabulaResult<()> {
    match selector.first_opaque() {
        Some(description) => Err(TabulaError::invalid_leaf_value(operation, description)),
        None => Ok(()),
    }
}
