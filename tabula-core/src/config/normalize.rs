//! Alias reconciliation and defaulting of raw configurations.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use super::keys::*;
use super::options::{
    ATTR_ERRMODE, ATTR_TIMEOUT, DriverOptions, ERRMODE_EXCEPTION, OptionValue, is_collection,
};
use super::raw::{RawConfig, as_integer, is_numeric, scalar_text, to_int};
use super::{DEFAULT_CHARSET, DEFAULT_TIMEOUT};
use crate::driver::{Driver, DriverResolver};

/// `db{key}` aliases, applied first.
const PREFIXED_ALIASES: [(&str, &str); 13] = [
    (HOST, "dbhost"),
    (USER, "dbuser"),
    (DBNAME, "name"),
    (PASSWORD, "dbpass"),
    (DRIVER, "dbdriver"),
    (PATH, "dbpath"),
    (PORT, "dbport"),
    (PREFIX, "dbprefix"),
    (PROTOCOL, "dbprotocol"),
    (CHARSET, "dbcharset"),
    (COLLATE, "dbcollate"),
    (TIMEOUT, "dbtimeout"),
    (OPTIONS, "dboptions"),
];

/// `db_{key}` aliases, applied second.
const UNDERSCORE_ALIASES: [(&str, &str); 13] = [
    (HOST, "db_host"),
    (USER, "db_user"),
    (DBNAME, "db_name"),
    (PASSWORD, "db_pass"),
    (DRIVER, "db_driver"),
    (PATH, "db_path"),
    (PORT, "db_port"),
    (PREFIX, "db_prefix"),
    (PROTOCOL, "db_protocol"),
    (CHARSET, "db_charset"),
    (COLLATE, "db_collate"),
    (TIMEOUT, "db_timeout"),
    (OPTIONS, "db_options"),
];

/// Long-form aliases, applied last, in order.
const LONG_ALIASES: [(&str, &[&str]); 3] = [
    (HOST, &["hostname", "dbhostname"]),
    (PASSWORD, &["dbpassword", "pass"]),
    (USER, &["dbusername", "username"]),
];

const MYSQL_PORT: u64 = 3306;
const FALLBACK_COLLATION: &str = "utf8_unicode_ci";

static COLLATION_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[-_]+").expect("collation separator pattern is valid"));

/// Turns a raw configuration into normalized parameters.
///
/// Normalization never fails. A driver that cannot be resolved is recorded as `false` under
/// `driver` so construction can report it.
#[derive(Debug, Clone)]
pub struct ConfigNormalizer {
    resolver: DriverResolver,
    default_driver: Driver,
}

impl Default for ConfigNormalizer {
    fn default() -> Self {
        Self::new(DriverResolver::default())
    }
}

impl ConfigNormalizer {
    /// Create a normalizer validating drivers with `resolver`.
    pub fn new(resolver: DriverResolver) -> Self {
        Self {
            resolver,
            default_driver: Driver::PdoMysql,
        }
    }

    /// Use a different driver when the configuration names none.
    pub fn with_default_driver(mut self, driver: Driver) -> Self {
        self.default_driver = driver;
        self
    }

    /// The driver resolver.
    pub fn resolver(&self) -> &DriverResolver {
        &self.resolver
    }

    /// Normalize a configuration.
    ///
    /// An empty configuration is returned unchanged. Normalizing an already normalized
    /// configuration yields the same parameters.
    pub fn normalize(&self, raw: &RawConfig) -> RawConfig {
        if raw.is_empty() {
            return raw.clone();
        }

        let mut params = RawConfig::new().with(CHARSET, DEFAULT_CHARSET);
        for (key, value) in raw.iter() {
            params.insert(key.clone(), value.clone());
        }

        for (key, alias) in PREFIXED_ALIASES.iter().chain(UNDERSCORE_ALIASES.iter()) {
            fill_alias(&mut params, key, alias);
        }
        for (key, aliases) in LONG_ALIASES {
            for alias in aliases {
                fill_alias(&mut params, key, alias);
            }
        }

        self.normalize_driver(&mut params);

        if params.is_empty_at(PORT) && params.get_str(DRIVER) == Some(Driver::PdoMysql.id()) {
            params.insert(PORT, MYSQL_PORT);
        }

        if params.get_str(DRIVER) == Some(Driver::PdoSqlite.id()) {
            cross_fill_sqlite(&mut params);
        }

        normalize_charset(&mut params);
        normalize_options(&mut params);

        if params.is_empty_at(HOST) {
            params.insert(HOST, "localhost");
        }

        trace!(keys = params.len(), "Configuration normalized");
        params
    }

    fn normalize_driver(&self, params: &mut RawConfig) {
        if params.is_empty_at(DRIVER)
            && params
                .get(PORT)
                .and_then(as_integer)
                .is_some_and(|port| port.unsigned_abs() == MYSQL_PORT)
        {
            params.insert(DRIVER, Driver::PdoMysql.id());
        }

        if params.is_empty_at(DRIVER) {
            params.insert(DRIVER, self.default_driver.id());
        }

        let Some(name) = params.get(DRIVER).and_then(scalar_text) else {
            debug!("Driver value is not a name, marking it unresolved");
            params.insert(DRIVER, false);
            return;
        };
        match self.resolver.resolve(&name) {
            Ok(driver) => {
                params.insert(DRIVER, driver.id());
            }
            Err(_) => {
                debug!(driver = %name, "Driver could not be resolved");
                params.insert(DRIVER, false);
            }
        }
    }
}

fn fill_alias(params: &mut RawConfig, key: &str, alias: &str) {
    if params.is_set(key) {
        return;
    }
    if let Some(value) = params.get(alias).filter(|v| !v.is_null()).cloned() {
        trace!(key, alias, "Alias applied");
        params.insert(key, value);
    }
}

fn cross_fill_sqlite(params: &mut RawConfig) {
    if params.is_empty_at(PATH) {
        if let Some(Value::String(name)) = params.get(DBNAME).cloned() {
            params.insert(PATH, name);
        }
    } else if params.is_empty_at(DBNAME) {
        if let Some(Value::String(path)) = params.get(PATH).cloned() {
            params.insert(DBNAME, path);
        }
    }
}

fn normalize_charset(params: &mut RawConfig) {
    let hyphenated = match params.get(CHARSET) {
        Some(Value::String(charset)) if charset.contains('-') => Some(charset.clone()),
        _ => None,
    };
    if let Some(charset) = hyphenated {
        params.insert(CHARSET, charset.trim().to_uppercase().replace('-', ""));
    }

    let mut fallback = DEFAULT_CHARSET.to_string();
    if params.is_set(COLLATE) {
        let collate = params.get(COLLATE).cloned().unwrap_or_default();
        let text = match collate {
            Value::String(s) => Some(s),
            // Only the literal driver name "mysql" gets the fallback collation; resolved
            // drivers never carry it, so non-string collations usually pass through.
            _ if params.get_str(DRIVER) == Some("mysql") => Some(FALLBACK_COLLATION.to_string()),
            other => scalar_text(&other),
        };
        // The caller's collation is kept as given; the canonical form only feeds the fallback.
        if let Some(text) = text {
            let collate = COLLATION_SEPARATORS.replace_all(&text, "_").to_lowercase();
            if let Some(first) = collate.trim().split('_').next().filter(|s| !s.is_empty()) {
                fallback = first.to_string();
            }
        }
    }

    let usable = matches!(params.get(CHARSET), Some(Value::String(s)) if !s.trim().is_empty());
    if !usable {
        params.insert(CHARSET, fallback);
    }
}

fn normalize_options(params: &mut RawConfig) {
    let supplied = params.get(OPTIONS).filter(|v| is_collection(v)).cloned();
    let primary = supplied.unwrap_or_else(|| DriverOptions::defaults().to_value());

    let mut options = params
        .get(DRIVER_OPTIONS)
        .map(DriverOptions::from_value)
        .unwrap_or_default();
    options.fill_from(&primary);
    options.insert(ATTR_ERRMODE, OptionValue::Int(ERRMODE_EXCEPTION));

    let timeout = params.get(TIMEOUT).filter(|v| !v.is_null()).map(|value| {
        let seconds = if is_numeric(value) {
            to_int(value).unwrap_or(DEFAULT_TIMEOUT)
        } else {
            DEFAULT_TIMEOUT
        };
        if seconds < 1 { DEFAULT_TIMEOUT } else { seconds }
    });
    if let Some(seconds) = timeout {
        params.insert(TIMEOUT, seconds);
    }
    if timeout.is_some() || !options.contains(ATTR_TIMEOUT) {
        options.insert(
            ATTR_TIMEOUT,
            OptionValue::Int(timeout.unwrap_or(DEFAULT_TIMEOUT)),
        );
    }

    let value = options.to_value();
    params.insert(DRIVER_OPTIONS, value.clone());
    params.insert(OPTIONS, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn normalize(raw: RawConfig) -> RawConfig {
        ConfigNormalizer::default().normalize(&raw)
    }

    #[test]
    fn test_empty_config_is_unchanged() {
        assert!(normalize(RawConfig::new()).is_empty());
    }

    #[test]
    fn test_minimal_mysql() {
        let params = normalize(RawConfig::new().with("dbname", "x"));
        assert_eq!(params.get_str(DRIVER), Some("pdo_mysql"));
        assert_eq!(params.get(PORT), Some(&json!(3306)));
        assert_eq!(params.get_str(HOST), Some("localhost"));
        assert_eq!(params.get_str(CHARSET), Some("UTF8"));
        assert_eq!(params.get(OPTIONS), Some(&json!({"2": 5, "3": 2})));
        assert_eq!(params.get(DRIVER_OPTIONS), params.get(OPTIONS));
    }

    #[test]
    fn test_alias_precedence() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "a")
                .with("name", "b")
                .with("db_name", "c"),
        );
        assert_eq!(params.get_str(DBNAME), Some("a"));

        let params = normalize(RawConfig::new().with("name", "b").with("db_name", "c"));
        assert_eq!(params.get_str(DBNAME), Some("b"));

        let params = normalize(RawConfig::new().with("db_name", "c").with("db_host", "h"));
        assert_eq!(params.get_str(DBNAME), Some("c"));
        assert_eq!(params.get_str(HOST), Some("h"));
    }

    #[test]
    fn test_long_aliases() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("hostname", "db1")
                .with("dbhostname", "db2")
                .with("pass", "p2")
                .with("dbpassword", "p1")
                .with("username", "u2")
                .with("dbusername", "u1"),
        );
        assert_eq!(params.get_str(HOST), Some("db1"));
        assert_eq!(params.get_str(PASSWORD), Some("p1"));
        assert_eq!(params.get_str(USER), Some("u1"));
    }

    #[test]
    fn test_null_canonical_value_takes_alias() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("host", Value::Null)
                .with("dbhost", "db"),
        );
        assert_eq!(params.get_str(HOST), Some("db"));
    }

    #[test]
    fn test_port_implies_mysql() {
        let params = normalize(RawConfig::new().with("dbname", "x").with("port", "-3306"));
        assert_eq!(params.get_str(DRIVER), Some("pdo_mysql"));

        let normalizer = ConfigNormalizer::default().with_default_driver(Driver::PdoPgsql);
        let params = normalizer.normalize(&RawConfig::new().with("dbname", "x").with("port", 3306));
        assert_eq!(params.get_str(DRIVER), Some("pdo_mysql"));

        let params = normalizer.normalize(&RawConfig::new().with("dbname", "x").with("port", 5432));
        assert_eq!(params.get_str(DRIVER), Some("pdo_pgsql"));
        assert_eq!(params.get(PORT), Some(&json!(5432)));
    }

    #[test]
    fn test_unresolved_driver_is_marked() {
        let params = normalize(RawConfig::new().with("dbname", "x").with("driver", "nosuch"));
        assert_eq!(params.get(DRIVER), Some(&json!(false)));
        assert!(params.get(PORT).is_none());

        let params = normalize(RawConfig::new().with("dbname", "x").with("driver", json!(["a"])));
        assert_eq!(params.get(DRIVER), Some(&json!(false)));
    }

    #[test]
    fn test_sqlite_cross_fill() {
        let params = normalize(
            RawConfig::new()
                .with("driver", "sqlite")
                .with("dbname", "/tmp/x.db"),
        );
        assert_eq!(params.get_str(PATH), Some("/tmp/x.db"));
        assert!(params.get(PORT).is_none());

        let params = normalize(RawConfig::new().with("driver", "sqlite").with("path", "/a.db"));
        assert_eq!(params.get_str(DBNAME), Some("/a.db"));

        let params = normalize(
            RawConfig::new()
                .with("driver", "sqlite")
                .with("path", "/a.db")
                .with("dbname", "main"),
        );
        assert_eq!(params.get_str(DBNAME), Some("main"));
        assert_eq!(params.get_str(PATH), Some("/a.db"));
    }

    #[test]
    fn test_charset_hyphens() {
        let params = normalize(RawConfig::new().with("dbname", "x").with("charset", " utf-8 "));
        assert_eq!(params.get_str(CHARSET), Some("UTF8"));

        let params = normalize(RawConfig::new().with("dbname", "x").with("charset", "latin1"));
        assert_eq!(params.get_str(CHARSET), Some("latin1"));
    }

    #[test]
    fn test_collation_passes_through_unchanged() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("collate", "UTF8MB4--General_CI"),
        );
        assert_eq!(params.get_str(COLLATE), Some("UTF8MB4--General_CI"));
        assert_eq!(params.get_str(CHARSET), Some("UTF8"));

        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("charset", "")
                .with("collate", "UTF8MB4-General-CI"),
        );
        assert_eq!(params.get_str(COLLATE), Some("UTF8MB4-General-CI"));
        assert_eq!(params.get_str(CHARSET), Some("utf8mb4"));
    }

    #[test]
    fn test_mysql_literal_collation_branch_is_unreachable() {
        // The driver is canonicalized before the collation step, so it never reads "mysql"
        // and the utf8_unicode_ci fallback is never applied.
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("driver", "mysql")
                .with("charset", "")
                .with("collate", 42),
        );
        assert_eq!(params.get_str(DRIVER), Some("pdo_mysql"));
        assert_eq!(params.get(COLLATE), Some(&json!(42)));
        assert_ne!(params.get_str(CHARSET), Some("utf8"));
        assert_eq!(params.get_str(CHARSET), Some("42"));

        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("driver", "mysql")
                .with("collate", json!(["utf8mb4"])),
        );
        assert_eq!(params.get_str(DRIVER), Some("pdo_mysql"));
        assert_eq!(params.get_str(CHARSET), Some("UTF8"));
    }

    #[test]
    fn test_extreme_port_does_not_overflow() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("port", "-9223372036854775808"),
        );
        assert_eq!(params.get_str(DRIVER), Some("pdo_mysql"));
        assert_eq!(params.get(PORT), Some(&json!("-9223372036854775808")));

        let normalizer = ConfigNormalizer::default().with_default_driver(Driver::PdoPgsql);
        let params =
            normalizer.normalize(&RawConfig::new().with("dbname", "x").with("port", i64::MIN));
        assert_eq!(params.get_str(DRIVER), Some("pdo_pgsql"));
    }

    #[test]
    fn test_blank_charset_falls_back_to_collation() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("charset", "  ")
                .with("collate", "latin1_swedish_ci"),
        );
        assert_eq!(params.get_str(CHARSET), Some("latin1"));

        let params = normalize(RawConfig::new().with("dbname", "x").with("charset", 5));
        assert_eq!(params.get_str(CHARSET), Some("UTF8"));
    }

    #[test]
    fn test_timeout_rules() {
        for (input, expected) in [
            (json!("abc"), 5),
            (json!(0), 5),
            (json!(-3), 5),
            (json!("12"), 12),
            (json!(7.9), 7),
        ] {
            let params = normalize(RawConfig::new().with("dbname", "x").with("timeout", input));
            assert_eq!(params.get(TIMEOUT), Some(&json!(expected)));
            assert_eq!(params.get(OPTIONS).unwrap()["2"], json!(expected));
        }
    }

    #[test]
    fn test_options_merge() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("options", json!({"3": 0, "1000": 1, "7": "skip"})),
        );
        assert_eq!(
            params.get(OPTIONS),
            Some(&json!({"2": 5, "3": 2, "1000": 1}))
        );
    }

    #[test]
    fn test_driver_options_win_over_options() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("driverOptions", json!({"2": 1.5, "9": 1}))
                .with("options", json!({"2": 8, "9": 2, "10": 3})),
        );
        assert_eq!(
            params.get(OPTIONS),
            Some(&json!({"2": 1.5, "3": 2, "9": 1, "10": 3}))
        );
    }

    #[test]
    fn test_explicit_timeout_overrides_option() {
        let params = normalize(
            RawConfig::new()
                .with("dbname", "x")
                .with("timeout", 9)
                .with("options", json!({"2": 30})),
        );
        assert_eq!(params.get(OPTIONS).unwrap()["2"], json!(9));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            RawConfig::new().with("dbname", "x"),
            RawConfig::new()
                .with("db_name", "shop")
                .with("dbuser", "u")
                .with("driver", "postgres")
                .with("timeout", "3")
                .with("collate", "utf8mb4_unicode_ci")
                .with("options", json!([1, 2, 3, 4])),
            RawConfig::new().with("driver", "sqlite").with("path", "/tmp/a.db"),
        ];
        let normalizer = ConfigNormalizer::default();
        for raw in inputs {
            let once = normalizer.normalize(&raw);
            let twice = normalizer.normalize(&once);
            assert_eq!(once, twice);
        }
    }
}
