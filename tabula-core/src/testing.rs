//! In-memory connection that records what it is asked to run.

use crate::bind::BindValue;
use crate::config::ConnectionDescriptor;
use crate::connection::{Connection, ConnectionFactory, Quoter, Row, SqlQuoter};
use crate::driver::Driver;
use crate::error::TabulaResult;

pub(crate) struct RecordingConnection {
    descriptor: ConnectionDescriptor,
    quoter: SqlQuoter,
    statements: Vec<String>,
    params: Vec<Vec<BindValue>>,
    checked_tables: Vec<Vec<String>>,
}

impl RecordingConnection {
    pub(crate) fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub(crate) fn statements(&self) -> &[String] {
        &self.statements
    }

    pub(crate) fn params(&self) -> &[Vec<BindValue>] {
        &self.params
    }

    pub(crate) fn checked_tables(&self) -> &[Vec<String>] {
        &self.checked_tables
    }
}

impl Quoter for RecordingConnection {
    fn quote(&self, value: &BindValue) -> String {
        self.quoter.quote(value)
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        self.quoter.quote_identifier(identifier)
    }
}

impl Connection for RecordingConnection {
    fn identifier_quote_char(&self) -> char {
        self.quoter.quote_char()
    }

    fn query(&mut self, sql: &str) -> TabulaResult<Vec<Row>> {
        self.statements.push(sql.to_string());
        Ok(Vec::new())
    }

    fn fetch_all(&mut self, sql: &str, params: &[BindValue]) -> TabulaResult<Vec<Row>> {
        self.statements.push(sql.to_string());
        self.params.push(params.to_vec());
        Ok(Vec::new())
    }

    fn tables_exist(&mut self, tables: &[String]) -> TabulaResult<bool> {
        self.checked_tables.push(tables.to_vec());
        Ok(true)
    }
}

pub(crate) struct RecordingFactory {
    drivers: Vec<Driver>,
}

impl Default for RecordingFactory {
    fn default() -> Self {
        Self::with_drivers(Driver::ALL)
    }
}

impl RecordingFactory {
    pub(crate) fn with_drivers(drivers: impl IntoIterator<Item = Driver>) -> Self {
        Self {
            drivers: drivers.into_iter().collect(),
        }
    }
}

impl ConnectionFactory for RecordingFactory {
    type Connection = RecordingConnection;

    fn available_drivers(&self) -> Vec<Driver> {
        self.drivers.clone()
    }

    fn connect(&self, descriptor: &ConnectionDescriptor) -> TabulaResult<RecordingConnection> {
        Ok(RecordingConnection {
            descriptor: descriptor.clone(),
            quoter: SqlQuoter::new('`'),
            statements: Vec::new(),
            params: Vec::new(),
            checked_tables: Vec::new(),
        })
    }
}
