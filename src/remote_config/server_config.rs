use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use serde::Serialize;

use super::remote_config_error::{RemoteConfigError, Result};

lazy_static! {
    static ref BOOLEAN_TRUTHY_VALUES: HashSet<&'static str> =
        HashSet::from(["1", "true", "t", "yes", "y", "on"]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Not backed by the template or the caller defaults.
    Static,
    /// Came from the caller-supplied default config.
    Default,
    /// Came from the server template.
    Remote,
}

/// A resolved parameter value. Stored as the string the template carries
/// and coerced on access.
///
/// | accessor     | coercion                                                          |
/// |--------------|-------------------------------------------------------------------|
/// | `as_string`  | the raw string                                                    |
/// | `as_boolean` | trimmed, case-insensitive `1 true t yes y on` are true, all else false |
/// | `as_int`     | trimmed `i64`; else `f64` truncated toward zero if finite; else 0 |
/// |              | finite values beyond the `i64` range saturate to `i64::MIN`/`MAX` |
/// | `as_float`   | trimmed `f64`; else 0.0                                           |
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Value {
    source: ValueSource,
    value: String,
}

impl Value {
    pub fn new(source: ValueSource, value: impl Into<String>) -> Self {
        Value {
            source,
            value: value.into(),
        }
    }

    pub fn as_string(&self) -> &str {
        &self.value
    }

    pub fn as_boolean(&self) -> bool {
        BOOLEAN_TRUTHY_VALUES.contains(self.value.trim().to_lowercase().as_str())
    }

    pub fn as_int(&self) -> i64 {
        let trimmed = self.value.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return value;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => value.trunc() as i64,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f64 {
        self.value.trim().parse().unwrap_or(0.0)
    }

    pub fn get_source(&self) -> ValueSource {
        self.source
    }
}

/// The read-only result of one `ServerTemplate::evaluate` call.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ServerConfig {
    config_values: HashMap<String, Value>,
}

impl ServerConfig {
    pub(crate) fn new(config_values: HashMap<String, Value>) -> Self {
        ServerConfig { config_values }
    }

    pub fn get_value(&self, key: &str) -> Result<&Value> {
        self.config_values
            .get(key)
            .ok_or_else(|| RemoteConfigError::MissingKey(key.to_string()))
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        Ok(self.get_value(key)?.as_string().to_string())
    }

    pub fn get_boolean(&self, key: &str) -> Result<bool> {
        Ok(self.get_value(key)?.as_boolean())
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        Ok(self.get_value(key)?.as_int())
    }

    pub fn get_float(&self, key: &str) -> Result<f64> {
        Ok(self.get_value(key)?.as_float())
    }

    pub fn get_value_source(&self, key: &str) -> Result<ValueSource> {
        Ok(self.get_value(key)?.get_source())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.config_values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.config_values.keys()
    }

    pub fn get_all(&self) -> &HashMap<String, Value> {
        &self.config_values
    }
}
