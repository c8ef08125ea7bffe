//! In-memory storage adapter using moka

use std::time::Duration;

use moka::sync::Cache as MokaCache;

use crate::domain::storage::{Capabilities, StorageAdapter};
use crate::domain::CacheError;

use super::options::AdapterOptions;

/// Configuration for the in-memory adapter
#[derive(Debug, Clone)]
pub struct MemoryAdapterConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Time-to-live for every entry, `None` keeps entries until evicted
    pub ttl: Option<Duration>,
}

impl Default for MemoryAdapterConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: None,
        }
    }
}

impl MemoryAdapterConfig {
    /// Sets the maximum number of entries
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Reads `max_capacity` and `ttl_secs`
    pub fn from_options(options: &AdapterOptions) -> Result<Self, CacheError> {
        let mut config = Self::default();

        if let Some(capacity) = options.get_u64("max_capacity")? {
            config = config.with_max_capacity(capacity);
        }

        if let Some(ttl) = options.get_secs("ttl_secs")? {
            config = config.with_ttl(ttl);
        }

        Ok(config)
    }
}

/// Thread-safe in-memory adapter
///
/// Entries live as long as the adapter; clones of the handle share them.
#[derive(Debug)]
pub struct MemoryAdapter {
    cache: MokaCache<String, String>,
    config: MemoryAdapterConfig,
}

impl MemoryAdapter {
    /// Creates a new in-memory adapter with default configuration
    pub fn new() -> Self {
        Self::with_config(MemoryAdapterConfig::default())
    }

    /// Creates a new in-memory adapter with the given configuration
    pub fn with_config(config: MemoryAdapterConfig) -> Self {
        let mut builder = MokaCache::builder().max_capacity(config.max_capacity);

        if let Some(ttl) = config.ttl {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            config,
        }
    }

    pub fn config(&self) -> &MemoryAdapterConfig {
        &self.config
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageAdapter for MemoryAdapter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<bool, CacheError> {
        self.cache.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.cache.contains_key(key))
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.cache.remove(key).is_some())
    }
}
