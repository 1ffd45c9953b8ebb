//! Driver identifiers and free-form driver name resolution.
//!
//! ```rust
//! use tabula_core::{Driver, DriverResolver};
//!
//! let resolver = DriverResolver::default();
//! assert_eq!(resolver.resolve("MariaDB").unwrap(), Driver::PdoMysql);
//! assert_eq!(resolver.resolve("postgresql").unwrap(), Driver::PdoPgsql);
//! assert_eq!(resolver.resolve(" sqlite3 ").unwrap(), Driver::PdoSqlite);
//! assert!(resolver.resolve("not-a-real-driver").is_err());
//! ```

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::trace;

use crate::error::{TabulaError, TabulaResult};

/// Canonical driver identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Driver {
    /// MySQL / MariaDB through PDO.
    PdoMysql,
    /// Drizzle speaking the MySQL protocol.
    DrizzlePdoMysql,
    /// MySQL through mysqli.
    Mysqli,
    /// SQLite through PDO.
    PdoSqlite,
    /// PostgreSQL through PDO.
    PdoPgsql,
    /// Oracle through PDO.
    PdoOci,
    /// Oracle through OCI8.
    Oci8,
    /// IBM DB2.
    IbmDb2,
    /// SQL Server through PDO.
    PdoSqlsrv,
    /// SQL Server native driver.
    Sqlsrv,
    /// SAP SQL Anywhere.
    SqlAnywhere,
}

impl Driver {
    /// Every canonical driver.
    pub const ALL: [Driver; 11] = [
        Driver::PdoMysql,
        Driver::DrizzlePdoMysql,
        Driver::Mysqli,
        Driver::PdoSqlite,
        Driver::PdoPgsql,
        Driver::PdoOci,
        Driver::Oci8,
        Driver::IbmDb2,
        Driver::PdoSqlsrv,
        Driver::Sqlsrv,
        Driver::SqlAnywhere,
    ];

    /// Get the canonical identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Self::PdoMysql => "pdo_mysql",
            Self::DrizzlePdoMysql => "drizzle_pdo_mysql",
            Self::Mysqli => "mysqli",
            Self::PdoSqlite => "pdo_sqlite",
            Self::PdoPgsql => "pdo_pgsql",
            Self::PdoOci => "pdo_oci",
            Self::Oci8 => "oci8",
            Self::IbmDb2 => "ibm_db2",
            Self::PdoSqlsrv => "pdo_sqlsrv",
            Self::Sqlsrv => "sqlsrv",
            Self::SqlAnywhere => "sqlanywhere",
        }
    }

    /// Look up a driver by its exact canonical identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.id() == id)
    }

    /// Get the default port for this driver.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::PdoMysql | Self::DrizzlePdoMysql | Self::Mysqli => Some(3306),
            Self::PdoPgsql => Some(5432),
            Self::PdoSqlsrv | Self::Sqlsrv => Some(1433),
            Self::PdoOci | Self::Oci8 => Some(1521),
            Self::IbmDb2 => Some(50000),
            Self::SqlAnywhere => Some(2638),
            Self::PdoSqlite => None,
        }
    }

    /// Whether the driver addresses a local file rather than a server.
    pub fn is_file_based(&self) -> bool {
        matches!(self, Self::PdoSqlite)
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Synonym rules, evaluated in order; the first match wins.
static RULES: LazyLock<Vec<(Regex, Driver)>> = LazyLock::new(|| {
    [
        ("maria|mysq", Driver::PdoMysql),
        ("postg|pg?sql", Driver::PdoPgsql),
        ("sqlit", Driver::PdoSqlite),
        ("oci", Driver::Oci8),
        ("drizz", Driver::DrizzlePdoMysql),
        ("ibm|db2", Driver::IbmDb2),
        ("mssql|sqlsrv", Driver::PdoSqlsrv),
    ]
    .into_iter()
    .map(|(pattern, driver)| {
        (
            Regex::new(pattern).expect("driver rule patterns are valid"),
            driver,
        )
    })
    .collect()
});

/// Maps free-form driver names onto the drivers a connection factory supports.
#[derive(Debug, Clone)]
pub struct DriverResolver {
    available: Vec<Driver>,
}

impl Default for DriverResolver {
    fn default() -> Self {
        Self::new(Driver::ALL)
    }
}

impl DriverResolver {
    /// Create a resolver validating against the given set of drivers.
    pub fn new(available: impl IntoIterator<Item = Driver>) -> Self {
        Self {
            available: available.into_iter().collect(),
        }
    }

    /// The drivers this resolver accepts.
    pub fn available(&self) -> &[Driver] {
        &self.available
    }

    /// Resolve a driver name.
    ///
    /// The name is trimmed and lowercased, then matched against the synonym rules. A name no
    /// rule matches must already be a canonical id. The result must be one of the available
    /// drivers.
    pub fn resolve(&self, name: &str) -> TabulaResult<Driver> {
        let candidate = name.trim().to_lowercase();
        if candidate.is_empty() {
            return Err(TabulaError::unresolved_driver(name));
        }

        let driver = RULES
            .iter()
            .find(|(pattern, _)| pattern.is_match(&candidate))
            .map(|(_, driver)| *driver)
            .or_else(|| Driver::from_id(&candidate));

        match driver {
            Some(driver) if self.available.contains(&driver) => {
                trace!(input = %name, driver = %driver, "Driver resolved");
                Ok(driver)
            }
            _ => Err(TabulaError::unresolved_driver(name)),
        }
    }
}
