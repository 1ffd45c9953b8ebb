//! Configuration loading and normalization.
//!
//! A configuration is a loose key-value mapping ([`RawConfig`]) that may use any of several
//! historical key spellings. The [`ConfigNormalizer`] reconciles them into canonical keys and
//! the [`ConnectionDescriptor`] is the validated, typed result.
//!
//! # Accepted Key Aliases
//!
//! | Canonical | Aliases |
//! |-----------|---------|
//! | `host` | `dbhost`, `db_host`, `hostname`, `dbhostname` |
//! | `user` | `dbuser`, `db_user`, `dbusername`, `username` |
//! | `dbname` | `name`, `db_name` |
//! | `password` | `dbpass`, `db_pass`, `dbpassword`, `pass` |
//! | `driver` | `dbdriver`, `db_driver` |
//! | `path`, `port`, `prefix`, `protocol`, `charset`, `collate`, `timeout`, `options` | `db{key}`, `db_{key}` |
//!
//! # Example
//!
//! ```rust
//! use tabula_core::config::{ConfigNormalizer, ConnectionDescriptor, RawConfig};
//! use tabula_core::{Driver, DriverResolver};
//!
//! let raw = RawConfig::new()
//!     .with("db_name", "shop")
//!     .with("dbuser", "app")
//!     .with("driver", "MariaDB")
//!     .with("prefix", "wp_");
//!
//! let resolver = DriverResolver::default();
//! let params = ConfigNormalizer::new(resolver.clone()).normalize(&raw);
//! let descriptor = ConnectionDescriptor::from_params(&params, &resolver).unwrap();
//!
//! assert_eq!(descriptor.dbname, "shop");
//! assert_eq!(descriptor.driver, Driver::PdoMysql);
//! assert_eq!(descriptor.port, Some(3306));
//! assert_eq!(descriptor.host, "localhost");
//! assert_eq!(descriptor.table_prefix, "wp_");
//! ```

mod descriptor;
mod env;
mod normalize;
mod options;
mod raw;

pub use descriptor::ConnectionDescriptor;
pub use env::{EnvExpander, EnvSource, MapEnvSource, StdEnvSource};
pub use normalize::ConfigNormalizer;
pub use options::{
    ATTR_ERRMODE, ATTR_TIMEOUT, DriverOptions, ERRMODE_EXCEPTION, OptionValue,
};
pub use raw::RawConfig;

/// Default character set.
pub const DEFAULT_CHARSET: &str = "UTF8";

/// Default connection timeout in seconds.
pub const DEFAULT_TIMEOUT: i64 = 5;

/// Canonical configuration keys.
pub mod keys {
    /// Server host.
    pub const HOST: &str = "host";
    /// Login user.
    pub const USER: &str = "user";
    /// Database name.
    pub const DBNAME: &str = "dbname";
    /// Login password.
    pub const PASSWORD: &str = "password";
    /// Driver name.
    pub const DRIVER: &str = "driver";
    /// File path for file-based drivers.
    pub const PATH: &str = "path";
    /// Server port.
    pub const PORT: &str = "port";
    /// Table prefix.
    pub const PREFIX: &str = "prefix";
    /// Protocol.
    pub const PROTOCOL: &str = "protocol";
    /// Character set.
    pub const CHARSET: &str = "charset";
    /// Collation.
    pub const COLLATE: &str = "collate";
    /// Connect timeout in seconds.
    pub const TIMEOUT: &str = "timeout";
    /// Public driver options alias.
    pub const OPTIONS: &str = "options";
    /// Driver options as handed to the connection.
    pub const DRIVER_OPTIONS: &str = "driverOptions";
}
