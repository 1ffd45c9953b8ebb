//! Opening options derived from a connection descriptor.

use std::path::PathBuf;

use serde_json::Value;
use tabula_core::{ConnectionDescriptor, Driver};

use crate::error::{SqliteError, SqliteResult};

/// Where the database lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabasePath {
    /// In-memory database.
    #[default]
    Memory,
    /// File-based database.
    File(PathBuf),
}

impl DatabasePath {
    /// Interpret a configured path; `:memory:` and `sqlite::memory:` mean in-memory.
    pub fn parse(path: &str) -> Self {
        match path.trim() {
            "" | ":memory:" | "sqlite::memory:" => Self::Memory,
            other => Self::File(PathBuf::from(other.strip_prefix("sqlite://").unwrap_or(other))),
        }
    }

    /// Check if this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// SQLite journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// DELETE
    Delete,
    /// TRUNCATE
    Truncate,
    /// PERSIST
    Persist,
    /// MEMORY
    Memory,
    /// WAL
    Wal,
    /// OFF
    Off,
}

impl JournalMode {
    /// Parse a mode name.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name.trim().to_lowercase().as_str() {
            "delete" => Self::Delete,
            "truncate" => Self::Truncate,
            "persist" => Self::Persist,
            "memory" => Self::Memory,
            "wal" => Self::Wal,
            "off" => Self::Off,
            _ => return None,
        })
    }

    /// Get the pragma value.
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }
}

/// Options a SQLite connection is opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Database location.
    pub path: DatabasePath,
    /// Enforce foreign keys.
    pub foreign_keys: bool,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Journal mode, left at the SQLite default when unset.
    pub journal_mode: Option<JournalMode>,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: DatabasePath::Memory,
            foreign_keys: true,
            busy_timeout_ms: 5000,
            journal_mode: None,
        }
    }
}

impl SqliteConfig {
    /// Build from a descriptor.
    ///
    /// The file comes from `path`, falling back to `dbname`. The busy timeout follows the
    /// connect timeout. `foreign_keys` and `journal_mode` are read from the pass-through keys.
    pub fn from_descriptor(descriptor: &ConnectionDescriptor) -> SqliteResult<Self> {
        if descriptor.driver != Driver::PdoSqlite {
            return Err(SqliteError::config(format!(
                "driver {} is not handled by the SQLite backend",
                descriptor.driver
            )));
        }

        let location = descriptor.path.as_deref().unwrap_or(&descriptor.dbname);
        let mut config = Self {
            path: DatabasePath::parse(location),
            busy_timeout_ms: u64::try_from(descriptor.timeout_secs())
                .unwrap_or(0)
                .saturating_mul(1000),
            ..Self::default()
        };

        match descriptor.extra.get("foreign_keys") {
            Some(Value::Bool(enabled)) => config.foreign_keys = *enabled,
            Some(Value::Number(n)) => config.foreign_keys = n.as_i64() != Some(0),
            Some(Value::String(s)) => config.foreign_keys = matches!(s.as_str(), "1" | "true" | "on"),
            _ => {}
        }
        if let Some(mode) = descriptor.extra.get("journal_mode").and_then(Value::as_str) {
            config.journal_mode = Some(
                JournalMode::parse(mode)
                    .ok_or_else(|| SqliteError::config(format!("unknown journal mode '{}'", mode)))?,
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::config::ConfigNormalizer;
    use tabula_core::{DriverResolver, RawConfig};

    fn descriptor(raw: RawConfig) -> ConnectionDescriptor {
        let resolver = DriverResolver::default();
        let params = ConfigNormalizer::new(resolver.clone()).normalize(&raw);
        ConnectionDescriptor::from_params(&params, &resolver).unwrap()
    }

    #[test]
    fn test_path_parse() {
        assert!(DatabasePath::parse(":memory:").is_memory());
        assert!(DatabasePath::parse("sqlite::memory:").is_memory());
        assert_eq!(
            DatabasePath::parse("sqlite:///tmp/a.db"),
            DatabasePath::File(PathBuf::from("/tmp/a.db"))
        );
    }

    #[test]
    fn test_from_descriptor() {
        let config = SqliteConfig::from_descriptor(&descriptor(
            RawConfig::new()
                .with("driver", "sqlite")
                .with("dbname", "/tmp/app.db")
                .with("timeout", 2)
                .with("journal_mode", "wal")
                .with("foreign_keys", false),
        ))
        .unwrap();
        assert_eq!(config.path, DatabasePath::File(PathBuf::from("/tmp/app.db")));
        assert_eq!(config.busy_timeout_ms, 2000);
        assert_eq!(config.journal_mode, Some(JournalMode::Wal));
        assert!(!config.foreign_keys);
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = SqliteConfig::from_descriptor(&descriptor(
            RawConfig::new()
                .with("driver", "sqlite")
                .with("path", ":memory:")
                .with("timeout", i64::MAX),
        ))
        .unwrap();
        assert_eq!(config.busy_timeout_ms, u64::MAX);
    }

    #[test]
    fn test_rejects_other_drivers() {
        let err = SqliteConfig::from_descriptor(&descriptor(RawConfig::new().with("dbname", "x")))
            .unwrap_err();
        assert!(matches!(err, SqliteError::Config(_)));
    }

    #[test]
    fn test_unknown_journal_mode() {
        let err = SqliteConfig::from_descriptor(&descriptor(
            RawConfig::new()
                .with("driver", "sqlite")
                .with("path", ":memory:")
                .with("journal_mode", "sideways"),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("sideways"));
    }
}
