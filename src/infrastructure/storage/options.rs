//! Adapter options passed to storage factories

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::CacheError;

/// Backend specific settings, a JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdapterOptions(Map<String, Value>);

impl AdapterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Reads a string option, failing when it has another type
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, CacheError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(Self::type_error(key, "a string", other)),
        }
    }

    /// Reads a non-negative integer option, failing when it has another type
    pub fn get_u64(&self, key: &str) -> Result<Option<u64>, CacheError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| Self::type_error(key, "a non-negative integer", value)),
        }
    }

    /// Reads a duration given in whole seconds
    pub fn get_secs(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        Ok(self.get_u64(key)?.map(Duration::from_secs))
    }

    fn type_error(key: &str, expected: &str, actual: &Value) -> CacheError {
        CacheError::configuration(format!(
            "Option '{}' must be {}, got {}",
            key, expected, actual
        ))
    }
}

impl From<Map<String, Value>> for AdapterOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
