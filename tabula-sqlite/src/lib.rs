//! SQLite backend for the Tabula database wrapper.
//!
//! This crate implements [`tabula_core::Connection`] on top of `rusqlite`:
//!
//! - In-memory and file-based databases
//! - Busy timeout derived from the connect timeout
//! - Schema listing through SQLite pragmas
//! - Transactions
//!
//! # Example
//!
//! ```rust
//! use tabula_core::{Connection, Database, RawConfig};
//! use tabula_sqlite::SqliteFactory;
//!
//! let config = RawConfig::new()
//!     .with("driver", "sqlite3")
//!     .with("path", ":memory:")
//!     .with("prefix", "app_");
//! let mut db = Database::open(&config, &SqliteFactory::new()).unwrap();
//!
//! db.exec("CREATE TABLE app_users (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
//! assert!(db.tables_exist(vec!["users"]).unwrap());
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod factory;
pub mod types;

pub use config::{DatabasePath, JournalMode, SqliteConfig};
pub use connection::SqliteConnection;
pub use error::{SqliteError, SqliteResult};
pub use factory::SqliteFactory;
