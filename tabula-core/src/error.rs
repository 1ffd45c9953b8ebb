//! Error types with stable codes and actionable suggestions.
//!
//! Error codes follow the pattern `T{category}{number}`:
//! - 3xxx: Connection errors
//! - 5xxx: Execution errors (bind compilation, driver failures)
//! - 6xxx: Input errors (identifier values, table names)
//! - 7xxx: Configuration errors
//! - 9xxx: Delegation and internal errors
//!
//! ```rust
//! use tabula_core::{TabulaError, ErrorCode};
//!
//! let err = TabulaError::bind_count_mismatch(2, 1, "SELECT ?");
//! assert_eq!(err.code, ErrorCode::BindCountMismatch);
//! assert_eq!(err.code.code(), "T5001");
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for Tabula operations.
pub type TabulaResult<T> = Result<T, TabulaError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Connection errors (3xxx)
    /// Opening the connection failed (T3001).
    ConnectionFailed = 3001,

    // Execution errors (5xxx)
    /// Placeholder count and bind count disagree (T5001).
    BindCountMismatch = 5001,
    /// General database error reported by the backend (T5005).
    DatabaseError = 5005,

    // Input errors (6xxx)
    /// A leaf value with no textual form was given to a rewrite (T6001).
    InvalidLeafValue = 6001,
    /// An empty or malformed table name (T6002).
    InvalidTableName = 6002,

    // Configuration errors (7xxx)
    /// The configuration cannot produce a connection descriptor (T7001).
    InvalidConfiguration = 7001,
    /// No configuration was supplied and none was recorded before (T7002).
    MissingConfiguration = 7002,
    /// The driver name does not map to a supported driver (T7003).
    UnresolvedDriver = 7003,

    // Delegation / internal errors (9xxx)
    /// Internal error (T9001).
    Internal = 9001,
    /// The connection does not implement the requested operation (T9002).
    UnsupportedOperation = 9002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "T7001").
    pub fn code(&self) -> String {
        format!("T{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ConnectionFailed => "Database connection failed",
            Self::BindCountMismatch => "Bind count mismatch",
            Self::DatabaseError => "Database error",
            Self::InvalidLeafValue => "Invalid leaf value",
            Self::InvalidTableName => "Invalid table name",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::MissingConfiguration => "Missing configuration",
            Self::UnresolvedDriver => "Unresolved driver",
            Self::Internal => "Internal error",
            Self::UnsupportedOperation => "Unsupported operation",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The configuration key involved.
    pub key: Option<String>,
    /// The SQL text (if available).
    pub sql: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors raised by configuration, rewriting, compilation and delegation.
#[derive(Error, Debug)]
#[error("[{}] {}", .code.code(), .message)]
pub struct TabulaError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TabulaError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context
            .suggestions
            .push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the configuration key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.context.key = Some(key.into());
        self
    }

    /// Set the SQL text.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// The database name is missing or empty.
    pub fn empty_database_name() -> Self {
        Self::invalid_configuration("Database name could not be empty")
            .with_key("dbname")
            .with_code_suggestion("Set one of `dbname`, `name` or `db_name`", "dbname = \"shop\"")
            .with_help("For sqlite, setting `path` also fills the database name")
    }

    /// The prefix has a type other than string, boolean or null.
    pub fn invalid_prefix(type_name: &str) -> Self {
        Self::invalid_configuration(format!("Prefix must be a string, {} given", type_name))
            .with_key("prefix")
    }

    /// Create an unresolved driver error.
    pub fn unresolved_driver(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::UnresolvedDriver,
            format!("Driver '{}' does not resolve to an available driver", name),
        )
        .with_key("driver")
        .with_suggestion("Use a driver name such as mysql, pgsql, sqlite, oci8, db2 or sqlsrv")
    }

    /// The selected driver is not available; wraps an [`ErrorCode::UnresolvedDriver`] cause.
    pub fn driver_unavailable(cause: TabulaError) -> Self {
        Self::invalid_configuration("Selected driver unavailable")
            .with_key("driver")
            .with_source(cause)
    }

    /// No configuration was given and none was recorded.
    pub fn missing_configuration() -> Self {
        Self::new(
            ErrorCode::MissingConfiguration,
            "Database was not initialized before",
        )
        .with_suggestion("Open a database through the context with a configuration first")
    }

    /// Create a bind count mismatch error.
    pub fn bind_count_mismatch(binds: usize, markers: usize, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        Self::new(
            ErrorCode::BindCountMismatch,
            format!(
                "Invalid statement binding count: {} value(s) for {} marker(s)",
                binds, markers
            ),
        )
        .with_sql(&sql)
        .with_suggestion("Markers inside quoted literals are not counted")
    }

    /// Create an invalid leaf value error.
    pub fn invalid_leaf_value(operation: &str, description: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidLeafValue,
            format!(
                "Invalid value to {}: {} has no textual form",
                operation,
                description.into()
            ),
        )
        .with_context(operation)
    }

    /// Create an invalid table name error.
    pub fn invalid_table_name(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTableName, message)
    }

    /// The connection does not implement an operation.
    pub fn unsupported_operation(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self::new(
            ErrorCode::UnsupportedOperation,
            format!("Call to undefined operation {}", operation),
        )
        .with_context(&operation)
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::ConnectionFailed, format!("Connection error: {}", message))
            .with_suggestion("Check that the database is reachable")
            .with_suggestion("Verify host, port, path and credentials")
    }

    /// Create a general database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
    }

    // ============== Error Checks ==============

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::InvalidConfiguration
                | ErrorCode::MissingConfiguration
                | ErrorCode::UnresolvedDriver
        )
    }

    /// Check if this is an unsupported operation error.
    pub fn is_unsupported(&self) -> bool {
        self.code == ErrorCode::UnsupportedOperation
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref key) = self.context.key {
            output.push_str(&format!("  → Key: {}\n", key));
        }
        if let Some(ref sql) = self.context.sql {
            let sql_display = if sql.chars().count() > 200 {
                format!("{}...", sql.chars().take(200).collect::<String>())
            } else {
                sql.clone()
            };
            output.push_str(&format!("  → SQL: {}\n", sql_display));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!(
                        "     ```\n     {}\n     ```\n",
                        code.replace('\n', "\n     ")
                    ));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}
