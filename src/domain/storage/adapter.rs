//! Storage adapter trait definition

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::domain::CacheError;

use super::capabilities::Capabilities;

/// Minimum contract every storage backend has to satisfy
///
/// Values are opaque strings (JSON in practice). `get` returning `Ok(None)` is the
/// only way to say "absent": an entry holding a JSON `null` is still `Some`.
/// Use [`StorageAdapterExt`] for typed access.
#[cfg_attr(test, automock)]
pub trait StorageAdapter: Send + Sync + Debug {
    /// Describes what this backend supports
    fn capabilities(&self) -> Capabilities;

    /// Reads the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a raw value under `key`, returning whether it was written
    fn set(&self, key: &str, value: &str) -> Result<bool, CacheError>;

    /// Checks if a value exists under `key`
    fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes the value under `key`, returning whether something was removed
    fn remove(&self, key: &str) -> Result<bool, CacheError>;
}

/// Extension trait providing typed get/set operations
pub trait StorageAdapterExt: StorageAdapter {
    /// Gets a typed value from storage
    fn get_item<V>(&self, key: &str) -> Result<Option<V>, CacheError>
    where
        V: DeserializeOwned,
    {
        match self.get(key)? {
            Some(data) => {
                let value = serde_json::from_str(&data).map_err(|e| {
                    CacheError::serialization(format!(
                        "Failed to deserialize entry '{}': {}",
                        key, e
                    ))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Sets a typed value in storage
    fn set_item<V>(&self, key: &str, value: &V) -> Result<bool, CacheError>
    where
        V: Serialize + ?Sized,
    {
        let data = serde_json::to_string(value).map_err(|e| {
            CacheError::serialization(format!("Failed to serialize entry '{}': {}", key, e))
        })?;
        self.set(key, &data)
    }
}

impl<T: StorageAdapter + ?Sized> StorageAdapterExt for T {}
