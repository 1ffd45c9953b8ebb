//! Validated connection settings.

use serde_json::{Map, Value};
use tracing::debug;

use super::keys::*;
use super::options::DriverOptions;
use super::raw::{RawConfig, as_integer, is_empty_value, scalar_text, type_name};
use super::{DEFAULT_CHARSET, DEFAULT_TIMEOUT};
use crate::driver::{Driver, DriverResolver};
use crate::error::{TabulaError, TabulaResult};

/// Keys consumed into typed fields or dropped before connecting.
const CONSUMED_KEYS: [&str; 16] = [
    HOST,
    USER,
    DBNAME,
    PASSWORD,
    DRIVER,
    PATH,
    PORT,
    PREFIX,
    PROTOCOL,
    CHARSET,
    COLLATE,
    TIMEOUT,
    OPTIONS,
    DRIVER_OPTIONS,
    "pass",
    "name",
];

/// Long-form aliases that never reach the connection.
const ALIAS_KEYS: [&str; 2] = ["hostname", "username"];

/// The validated settings a connection is opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDescriptor {
    /// Server host.
    pub host: String,
    /// Login user.
    pub user: Option<String>,
    /// Database name, never empty.
    pub dbname: String,
    /// Login password.
    pub password: Option<String>,
    /// Resolved driver.
    pub driver: Driver,
    /// File path for file-based drivers.
    pub path: Option<String>,
    /// Server port.
    pub port: Option<i64>,
    /// Trimmed table prefix, possibly empty.
    pub table_prefix: String,
    /// Protocol.
    pub protocol: Option<String>,
    /// Character set.
    pub charset: String,
    /// Normalized collation.
    pub collate: Option<String>,
    /// Connect timeout in seconds, when configured.
    pub timeout: Option<i64>,
    /// Driver options.
    pub options: DriverOptions,
    /// Remaining keys passed through to the connection.
    pub extra: Map<String, Value>,
}

impl ConnectionDescriptor {
    /// Validate normalized parameters.
    ///
    /// Fails with [`ErrorCode::InvalidConfiguration`](crate::ErrorCode::InvalidConfiguration)
    /// when the prefix is not a string, the driver is unavailable, or the database name is
    /// empty, checked in that order.
    pub fn from_params(params: &RawConfig, resolver: &DriverResolver) -> TabulaResult<Self> {
        let table_prefix = match params.get(PREFIX) {
            None | Some(Value::Null) | Some(Value::Bool(_)) => String::new(),
            Some(Value::String(prefix)) => prefix.trim().to_string(),
            Some(other) => return Err(TabulaError::invalid_prefix(type_name(other))),
        };

        let driver = match params.get(DRIVER) {
            Some(Value::String(name)) => resolver
                .resolve(name)
                .map_err(TabulaError::driver_unavailable)?,
            other => {
                let shown = other.and_then(scalar_text).unwrap_or_default();
                return Err(TabulaError::driver_unavailable(
                    TabulaError::unresolved_driver(shown),
                ));
            }
        };

        let dbname = params
            .get(DBNAME)
            .filter(|v| !is_empty_value(v))
            .and_then(scalar_text)
            .ok_or_else(TabulaError::empty_database_name)?;

        let extra = params
            .iter()
            .filter(|(key, _)| passes_through(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let descriptor = Self {
            host: text(params, HOST).unwrap_or_else(|| "localhost".to_string()),
            user: text(params, USER),
            dbname,
            password: text(params, PASSWORD),
            driver,
            path: text(params, PATH),
            port: params.get(PORT).and_then(as_integer),
            table_prefix,
            protocol: text(params, PROTOCOL),
            charset: text(params, CHARSET).unwrap_or_else(|| DEFAULT_CHARSET.to_string()),
            collate: text(params, COLLATE),
            timeout: params.get(TIMEOUT).and_then(as_integer),
            options: params
                .get(DRIVER_OPTIONS)
                .map(DriverOptions::from_value)
                .unwrap_or_default(),
            extra,
        };
        debug!(
            driver = %descriptor.driver,
            host = %descriptor.host,
            dbname = %descriptor.dbname,
            "Connection descriptor built"
        );
        Ok(descriptor)
    }

    /// Connect timeout in seconds, falling back to the default.
    pub fn timeout_secs(&self) -> i64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Re-emit a configuration that normalizes back to this descriptor.
    pub fn to_config(&self) -> RawConfig {
        let mut config = RawConfig::from_map(self.extra.clone())
            .with(DBNAME, self.dbname.clone())
            .with(DRIVER, self.driver.id())
            .with(HOST, self.host.clone())
            .with(PREFIX, self.table_prefix.clone())
            .with(CHARSET, self.charset.clone())
            .with(DRIVER_OPTIONS, self.options.to_value())
            .with(OPTIONS, self.options.to_value());
        let optional = [
            (USER, self.user.clone().map(Value::from)),
            (PASSWORD, self.password.clone().map(Value::from)),
            (PATH, self.path.clone().map(Value::from)),
            (PORT, self.port.map(Value::from)),
            (PROTOCOL, self.protocol.clone().map(Value::from)),
            (COLLATE, self.collate.clone().map(Value::from)),
            (TIMEOUT, self.timeout.map(Value::from)),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                config.insert(key, value);
            }
        }
        config
    }

    /// The parameters handed to a connection factory.
    ///
    /// The prefix, aliases and any `db`-prefixed keys other than `dbname` are left out.
    pub fn connection_params(&self) -> RawConfig {
        let mut params = self.to_config();
        params.remove(PREFIX);
        params.remove(OPTIONS);
        params
    }
}

fn text(params: &RawConfig, key: &str) -> Option<String> {
    params.get(key).and_then(scalar_text)
}

fn passes_through(key: &str) -> bool {
    let db_prefixed = key
        .get(..2)
        .is_some_and(|head| head.eq_ignore_ascii_case("db"));
    !CONSUMED_KEYS.contains(&key)
        && !ALIAS_KEYS.contains(&key)
        && !db_prefixed
        && key.parse::<i64>().is_err()
}
