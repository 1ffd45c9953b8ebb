//! # tabula-core
//!
//! Configuration normalization, identifier rewriting and bind compilation for the Tabula
//! database wrapper.
//!
//! This crate provides:
//! - Reconciliation of loosely-keyed configuration mappings into a validated descriptor
//! - Free-form driver name resolution
//! - Table prefixing and identifier quoting over nested selectors
//! - Inlining of `?` placeholder bindings
//! - A [`Database`] facade over any [`Connection`] backend
//!
//! ## Configuration
//!
//! Accept whichever key spellings a configuration file uses:
//!
//! ```rust
//! use tabula_core::config::{ConfigNormalizer, RawConfig};
//!
//! let raw = RawConfig::from_json_str(r#"{"db_name": "shop", "hostname": "db1", "port": 3306}"#)
//!     .unwrap();
//! let params = ConfigNormalizer::default().normalize(&raw);
//!
//! assert_eq!(params.get_str("dbname"), Some("shop"));
//! assert_eq!(params.get_str("host"), Some("db1"));
//! assert_eq!(params.get_str("driver"), Some("pdo_mysql"));
//! ```
//!
//! ## Bindings
//!
//! ```rust
//! use tabula_core::{BindValue, Bindings, PlaceholderCompiler, SqlQuoter};
//!
//! let binds = Bindings::from(vec![BindValue::from(10), BindValue::from("it's")]);
//! let sql = PlaceholderCompiler::compile(
//!     "SELECT * FROM posts WHERE id = ? AND title = ?",
//!     &binds,
//!     &SqlQuoter::default(),
//! )
//! .unwrap();
//! assert_eq!(sql, "SELECT * FROM posts WHERE id = 10 AND title = 'it''s'");
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use tabula_core::{ErrorCode, TabulaError};
//!
//! let err = TabulaError::empty_database_name();
//! assert_eq!(err.code, ErrorCode::InvalidConfiguration);
//! ```

pub mod bind;
pub mod compiler;
pub mod config;
pub mod connection;
pub mod context;
pub mod database;
pub mod driver;
pub mod error;
pub mod logging;
pub mod rewriter;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

pub use bind::{BindValue, Bindings};
pub use compiler::PlaceholderCompiler;
pub use config::{ConfigNormalizer, ConnectionDescriptor, DriverOptions, OptionValue, RawConfig};
pub use connection::{Connection, ConnectionFactory, Quoter, Row, SqlQuoter};
pub use context::DatabaseContext;
pub use database::Database;
pub use driver::{Driver, DriverResolver};
pub use error::{ErrorCode, ErrorContext, Suggestion, TabulaError, TabulaResult};
pub use rewriter::{IdentifierRewriter, Selector};
pub use schema::{
    ColumnInfo, ForeignKeyInfo, IndexInfo, ReferentialAction, SequenceInfo, TableInfo, ViewInfo,
};

// Re-export logging utilities
pub use logging::{init as init_logging, init_with_level, is_debug_enabled};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bind::{BindValue, Bindings};
    pub use crate::config::RawConfig;
    pub use crate::connection::{Connection, ConnectionFactory, Quoter};
    pub use crate::context::DatabaseContext;
    pub use crate::database::Database;
    pub use crate::driver::Driver;
    pub use crate::error::{TabulaError, TabulaResult};
    pub use crate::rewriter::Selector;
}
