//! The connection capability a [`Database`](crate::Database) delegates to.
//!
//! Backends implement [`Connection`] for the operations they support. Every operation has a
//! default body that fails with [`ErrorCode::UnsupportedOperation`](crate::ErrorCode), so a
//! backend only overrides what it can do.

use serde_json::{Map, Value};

use crate::bind::BindValue;
use crate::config::ConnectionDescriptor;
use crate::driver::Driver;
use crate::error::{TabulaError, TabulaResult};
use crate::schema::{ColumnInfo, ForeignKeyInfo, IndexInfo, SequenceInfo, TableInfo, ViewInfo};

/// A result row keyed by column name.
pub type Row = Map<String, Value>;

/// Quoting primitives used when text is inlined into SQL.
pub trait Quoter {
    /// Quote a value as a SQL literal.
    fn quote(&self, value: &BindValue) -> String;

    /// Quote an identifier, which may be dotted.
    fn quote_identifier(&self, identifier: &str) -> String;
}

/// Standard SQL quoting with a configurable identifier quote character.
#[derive(Debug, Clone, Copy)]
pub struct SqlQuoter {
    quote_char: char,
}

impl SqlQuoter {
    /// Create a quoter using `quote_char` for identifiers.
    pub fn new(quote_char: char) -> Self {
        Self { quote_char }
    }

    /// The identifier quote character.
    pub fn quote_char(&self) -> char {
        self.quote_char
    }
}

impl Default for SqlQuoter {
    fn default() -> Self {
        Self::new('"')
    }
}

impl Quoter for SqlQuoter {
    fn quote(&self, value: &BindValue) -> String {
        match value {
            BindValue::Null => "NULL".to_string(),
            other => format!("'{}'", other.to_text().replace('\'', "''")),
        }
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        let q = self.quote_char;
        let doubled = format!("{q}{q}");
        identifier
            .split('.')
            .map(|part| format!("{q}{}{q}", part.replace(q, &doubled)))
            .collect::<Vec<_>>()
            .join(".")
    }
}

macro_rules! unsupported {
    ($name:literal) => {
        Err(TabulaError::unsupported_operation($name))
    };
}

/// An open database connection.
pub trait Connection: Quoter {
    /// Identifier quote character of the backend.
    fn identifier_quote_char(&self) -> char {
        '"'
    }

    /// Name of the current database.
    fn database(&self) -> TabulaResult<String> {
        unsupported!("database")
    }

    /// Whether the connection is open.
    fn is_connected(&self) -> TabulaResult<bool> {
        unsupported!("is_connected")
    }

    /// Close the connection.
    fn close(&mut self) -> TabulaResult<()> {
        unsupported!("close")
    }

    /// Check the connection is alive.
    fn ping(&mut self) -> TabulaResult<()> {
        unsupported!("ping")
    }

    /// Start a transaction.
    fn begin_transaction(&mut self) -> TabulaResult<()> {
        unsupported!("begin_transaction")
    }

    /// Commit the current transaction.
    fn commit(&mut self) -> TabulaResult<()> {
        unsupported!("commit")
    }

    /// Roll back the current transaction.
    fn roll_back(&mut self) -> TabulaResult<()> {
        unsupported!("roll_back")
    }

    /// Whether a transaction is open.
    fn is_transaction_active(&self) -> TabulaResult<bool> {
        unsupported!("is_transaction_active")
    }

    /// Execute one or more statements without results.
    fn exec(&mut self, _sql: &str) -> TabulaResult<()> {
        unsupported!("exec")
    }

    /// Execute a statement with positional parameters, returning the affected row count.
    fn execute_update(&mut self, _sql: &str, _params: &[BindValue]) -> TabulaResult<u64> {
        unsupported!("execute_update")
    }

    /// Run a query and collect all rows.
    fn query(&mut self, _sql: &str) -> TabulaResult<Vec<Row>> {
        unsupported!("query")
    }

    /// Run a prepared query with positional parameters and collect all rows.
    fn fetch_all(&mut self, _sql: &str, _params: &[BindValue]) -> TabulaResult<Vec<Row>> {
        unsupported!("fetch_all")
    }

    /// Run a prepared query and return the first row.
    fn fetch_assoc(&mut self, _sql: &str, _params: &[BindValue]) -> TabulaResult<Option<Row>> {
        unsupported!("fetch_assoc")
    }

    /// Id of the last inserted row.
    fn last_insert_id(&self) -> TabulaResult<i64> {
        unsupported!("last_insert_id")
    }

    /// Databases visible to the connection.
    fn list_databases(&mut self) -> TabulaResult<Vec<String>> {
        unsupported!("list_databases")
    }

    /// Schema namespaces.
    fn list_namespace_names(&mut self) -> TabulaResult<Vec<String>> {
        unsupported!("list_namespace_names")
    }

    /// Sequences.
    fn list_sequences(&mut self) -> TabulaResult<Vec<SequenceInfo>> {
        unsupported!("list_sequences")
    }

    /// Names of all tables.
    fn list_table_names(&mut self) -> TabulaResult<Vec<String>> {
        unsupported!("list_table_names")
    }

    /// All tables with their structure.
    fn list_tables(&mut self) -> TabulaResult<Vec<TableInfo>> {
        unsupported!("list_tables")
    }

    /// Columns of a table.
    fn list_table_columns(&mut self, _table: &str) -> TabulaResult<Vec<ColumnInfo>> {
        unsupported!("list_table_columns")
    }

    /// Indexes of a table.
    fn list_table_indexes(&mut self, _table: &str) -> TabulaResult<Vec<IndexInfo>> {
        unsupported!("list_table_indexes")
    }

    /// Structure of one table.
    fn list_table_details(&mut self, _table: &str) -> TabulaResult<TableInfo> {
        unsupported!("list_table_details")
    }

    /// Views.
    fn list_views(&mut self) -> TabulaResult<Vec<ViewInfo>> {
        unsupported!("list_views")
    }

    /// Foreign keys of a table.
    fn list_table_foreign_keys(&mut self, _table: &str) -> TabulaResult<Vec<ForeignKeyInfo>> {
        unsupported!("list_table_foreign_keys")
    }

    /// Whether every named table exists.
    fn tables_exist(&mut self, _tables: &[String]) -> TabulaResult<bool> {
        unsupported!("tables_exist")
    }
}

/// Opens connections for a set of drivers.
pub trait ConnectionFactory {
    /// The connection type produced.
    type Connection: Connection;

    /// Drivers this factory can open.
    fn available_drivers(&self) -> Vec<Driver>;

    /// Open a connection.
    fn connect(&self, descriptor: &ConnectionDescriptor) -> TabulaResult<Self::Connection>;
}
