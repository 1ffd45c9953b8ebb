//! Environment variable references inside configuration values.
//!
//! String values may reference variables as `$VAR`, `${VAR}`, `${VAR:-default}` or
//! `${VAR:?message}`. Expansion walks nested lists and mappings; keys are never expanded.

use std::collections::HashMap;

use serde_json::Value;

use super::RawConfig;
use crate::error::{TabulaError, TabulaResult};

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get a variable.
    fn get(&self, name: &str) -> Option<String>;
}

/// Process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory variables, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Expands variable references in configuration values.
#[derive(Debug, Clone, Default)]
pub struct EnvExpander<S: EnvSource = StdEnvSource> {
    source: S,
}

impl EnvExpander<StdEnvSource> {
    /// Expander over the process environment.
    pub fn new() -> Self {
        Self {
            source: StdEnvSource,
        }
    }
}

impl<S: EnvSource> EnvExpander<S> {
    /// Expander over a custom source.
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Expand every string value of a configuration.
    pub fn expand_config(&self, config: &RawConfig) -> TabulaResult<RawConfig> {
        let mut expanded = RawConfig::new();
        for (key, value) in config.iter() {
            let value = self
                .expand_value(value)
                .map_err(|e| e.with_key(key.clone()))?;
            expanded.insert(key.clone(), value);
        }
        Ok(expanded)
    }

    /// Expand string leaves of a value.
    pub fn expand_value(&self, value: &Value) -> TabulaResult<Value> {
        Ok(match value {
            Value::String(s) => Value::String(self.expand(s)?),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.expand_value(item))
                    .collect::<TabulaResult<_>>()?,
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.expand_value(v)?)))
                    .collect::<TabulaResult<_>>()?,
            ),
            other => other.clone(),
        })
    }

    /// Expand references in a single string.
    pub fn expand(&self, input: &str) -> TabulaResult<String> {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(pos) = rest.find('$') {
            output.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(body) = after.strip_prefix('{') {
                let end = body.find('}').ok_or_else(|| {
                    TabulaError::invalid_configuration(format!(
                        "Unterminated variable reference in '{}'",
                        input
                    ))
                })?;
                output.push_str(&self.resolve_braced(&body[..end])?);
                rest = &body[end + 1..];
            } else {
                let len = after
                    .char_indices()
                    .find(|&(i, c)| !(c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())))
                    .map_or(after.len(), |(i, _)| i);
                if len == 0 {
                    output.push('$');
                } else {
                    output.push_str(&self.lookup(&after[..len])?);
                }
                rest = &after[len..];
            }
        }

        output.push_str(rest);
        Ok(output)
    }

    fn resolve_braced(&self, body: &str) -> TabulaResult<String> {
        let (name, modifier) = match body.find(":-").or_else(|| body.find(":?")) {
            Some(i) => (&body[..i], Some((&body[i + 1..i + 2], &body[i + 2..]))),
            None => (body, None),
        };
        if name.is_empty() {
            return Err(TabulaError::invalid_configuration(
                "Empty variable name in reference",
            ));
        }

        match (self.source.get(name).filter(|v| !v.is_empty()), modifier) {
            (Some(value), _) => Ok(value),
            (None, Some(("-", default))) => Ok(default.to_string()),
            (None, Some((_, message))) if !message.is_empty() => {
                Err(TabulaError::invalid_configuration(message.to_string()))
            }
            (None, _) => Err(not_set(name)),
        }
    }

    fn lookup(&self, name: &str) -> TabulaResult<String> {
        self.source.get(name).ok_or_else(|| not_set(name))
    }
}

fn not_set(name: &str) -> TabulaError {
    TabulaError::invalid_configuration(format!("Environment variable '{}' is not set", name))
        .with_suggestion(format!("Export {} or use ${{{}:-default}}", name, name))
}
