//! Logging setup.
//!
//! Library code only emits `tracing` events. A subscriber is installed by [`init`] when the
//! `tracing-subscriber` feature is enabled and the environment asks for output:
//!
//! - `TABULA_DEBUG=true|1|yes` - enable debug-level logging
//! - `TABULA_LOG_LEVEL=trace|debug|info|warn|error` - set the level explicitly
//! - `TABULA_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! ```rust,no_run
//! use tabula_core::logging;
//!
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "TABULA_DEBUG";
const LEVEL_VAR: &str = "TABULA_LOG_LEVEL";
const FORMAT_VAR: &str = "TABULA_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to JSON.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }
}

/// Whether `TABULA_DEBUG` asks for debug output.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR).is_ok_and(|v| is_truthy(&v))
}

/// The level requested by the environment.
pub fn log_level() -> Level {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// The format requested by the environment.
pub fn log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::parse(&f))
        .unwrap_or_default()
}

/// Install the subscriber once, if the environment asks for logging.
pub fn init() {
    if is_debug_enabled() || env::var(LEVEL_VAR).is_ok() {
        install(log_level(), log_format());
    }
}

/// Install the subscriber once at `level`, regardless of the environment.
pub fn init_with_level(level: Level) {
    install(level, log_format());
}

fn install(level: Level, format: LogFormat) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = level.as_str().to_lowercase();
            let filter = EnvFilter::try_new(format!(
                "tabula={level},tabula_core={level},tabula_sqlite={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };
            if installed.is_ok() {
                tracing::info!(level = %level, format = ?format, "Tabula logging initialized");
            }
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = (level, format);
        }
    });
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn resolve_level(requested: Option<&str>, debug: bool) -> Level {
    let fallback = if debug { Level::DEBUG } else { Level::WARN };
    match requested.map(|l| l.trim().to_lowercase()) {
        Some(l) if l == "trace" => Level::TRACE,
        Some(l) if l == "debug" => Level::DEBUG,
        Some(l) if l == "info" => Level::INFO,
        Some(l) if l == "warn" => Level::WARN,
        Some(l) if l == "error" => Level::ERROR,
        _ => fallback,
    }
}

/// Debug event emitted only when `TABULA_DEBUG` is enabled.
#[macro_export]
macro_rules! tabula_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            ::tracing::debug!($($arg)*);
        }
    };
}
