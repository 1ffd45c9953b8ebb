//! # Tabula
//!
//! A thin database wrapper that accepts loosely-keyed configuration, applies table
//! prefixes and inlines `?` bindings before handing statements to a connection backend.
//!
//! Tabula provides:
//! - Normalization of configuration key aliases into one canonical descriptor
//! - Free-form driver names resolved against the drivers a backend offers
//! - Prefixing and quoting of table names, singly or in nested selectors
//! - Placeholder compilation that leaves quoted literals alone
//! - A SQLite backend (feature `sqlite`, on by default)
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> Result<(), tabula::TabulaError> {
//! use tabula::prelude::*;
//!
//! let config = RawConfig::new()
//!     .with("db_driver", "sqlite")
//!     .with("db_path", ":memory:")
//!     .with("prefix", "shop_");
//! let mut db = Database::open(&config, &SqliteFactory::new())?;
//!
//! db.exec("CREATE TABLE shop_items (id INTEGER PRIMARY KEY, title TEXT)")?;
//! let table = db.prefix("items", true);
//! assert_eq!(table, r#""shop_items""#);
//!
//! db.query_bind(&format!("INSERT INTO {table} (title) VALUES (?)"), BindValue::from("lamp"))?;
//! let rows = db.query_bind(&format!("SELECT title FROM {table} WHERE id = ?"), BindValue::from(1))?;
//! assert_eq!(rows[0]["title"], "lamp");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Configuration reconciliation and descriptors.
pub mod config {
    pub use tabula_core::config::*;
}

/// Connection traits and quoting.
pub mod connection {
    pub use tabula_core::connection::*;
}

/// Schema listing types.
pub mod schema {
    pub use tabula_core::schema::*;
}

/// Logging setup.
pub mod logging {
    pub use tabula_core::logging::*;
}

/// SQLite backend.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use tabula_sqlite::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tabula_core::prelude::*;

    #[cfg(feature = "sqlite")]
    pub use tabula_sqlite::SqliteFactory;
}

// Re-export key types at the crate root
pub use tabula_core::{
    BindValue, Bindings, ConfigNormalizer, Connection, ConnectionDescriptor, ConnectionFactory,
    Database, DatabaseContext, Driver, DriverResolver, ErrorCode, IdentifierRewriter,
    PlaceholderCompiler, Quoter, RawConfig, Row, Selector, SqlQuoter, TabulaError, TabulaResult,
};
