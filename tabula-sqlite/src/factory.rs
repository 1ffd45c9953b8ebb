//! Connection factory for the SQLite backend.

use tabula_core::{ConnectionDescriptor, ConnectionFactory, Driver, TabulaResult};
use tracing::info;

use crate::config::SqliteConfig;
use crate::connection::SqliteConnection;

/// Opens [`SqliteConnection`]s for the `pdo_sqlite` driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteFactory;

impl SqliteFactory {
    /// Create a factory.
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionFactory for SqliteFactory {
    type Connection = SqliteConnection;

    fn available_drivers(&self) -> Vec<Driver> {
        vec![Driver::PdoSqlite]
    }

    fn connect(&self, descriptor: &ConnectionDescriptor) -> TabulaResult<SqliteConnection> {
        let config = SqliteConfig::from_descriptor(descriptor)?;
        info!(
            path = ?config.path,
            foreign_keys = config.foreign_keys,
            busy_timeout_ms = config.busy_timeout_ms,
            "Opening SQLite database"
        );
        Ok(SqliteConnection::open(&config)?)
    }
}
