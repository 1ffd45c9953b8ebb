//! Caller-owned memory of the last successful configuration.

use tracing::debug;

use crate::config::{ConnectionDescriptor, RawConfig};
use crate::connection::ConnectionFactory;
use crate::database::Database;
use crate::error::{TabulaError, TabulaResult};

/// Remembers the descriptor of the last database opened through it, so later callers can
/// reopen without repeating the configuration.
///
/// There is no internal locking; share it behind a lock if several threads open databases.
#[derive(Debug, Clone, Default)]
pub struct DatabaseContext {
    last: Option<ConnectionDescriptor>,
}

impl DatabaseContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last recorded descriptor.
    pub fn last(&self) -> Option<&ConnectionDescriptor> {
        self.last.as_ref()
    }

    /// Forget the recorded descriptor.
    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Open a database and record its descriptor.
    ///
    /// A failed open leaves the previous record untouched.
    pub fn open<F>(
        &mut self,
        config: &RawConfig,
        factory: &F,
    ) -> TabulaResult<Database<F::Connection>>
    where
        F: ConnectionFactory,
    {
        let database = Database::open(config, factory)?;
        self.last = Some(database.descriptor().clone());
        Ok(database)
    }

    /// Open a database from the last recorded descriptor.
    pub fn reopen<F>(&mut self, factory: &F) -> TabulaResult<Database<F::Connection>>
    where
        F: ConnectionFactory,
    {
        let config = self
            .last
            .as_ref()
            .map(ConnectionDescriptor::to_config)
            .ok_or_else(TabulaError::missing_configuration)?;
        debug!("Reopening database from last configuration");
        self.open(&config, factory)
    }

    /// Open from `config` when given, otherwise from the last recorded descriptor.
    pub fn create<F>(
        &mut self,
        config: Option<&RawConfig>,
        factory: &F,
    ) -> TabulaResult<Database<F::Connection>>
    where
        F: ConnectionFactory,
    {
        match config {
            Some(config) => self.open(config, factory),
            None => self.reopen(factory),
        }
    }
}
