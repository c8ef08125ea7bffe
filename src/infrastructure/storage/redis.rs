//! Redis storage adapter

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use redis::{Client, Commands, Connection};

use crate::domain::storage::{Capabilities, StorageAdapter};
use crate::domain::{BoxError, CacheError};

use super::options::AdapterOptions;

/// Environment variable consulted when no `server` option is given
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Configuration for the Redis adapter
#[derive(Debug, Clone)]
pub struct RedisAdapterConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Expiry applied to every entry, `None` keeps entries forever
    pub ttl: Option<Duration>,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Connection timeout
    pub connection_timeout: Duration,
}

impl RedisAdapterConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ttl: None,
            key_prefix: None,
            connection_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Reads `server`, `key_prefix`, `ttl_secs` and `timeout_secs`, falling
    /// back to `REDIS_URL` for the server
    pub fn from_options(options: &AdapterOptions) -> Result<Self, CacheError> {
        Self::from_options_with_fallback(options, std::env::var(REDIS_URL_ENV).ok())
    }

    fn from_options_with_fallback(
        options: &AdapterOptions,
        fallback_url: Option<String>,
    ) -> Result<Self, CacheError> {
        let url = match options.get_str("server")? {
            Some(server) => server.to_string(),
            None => fallback_url.filter(|url| !url.is_empty()).ok_or_else(|| {
                CacheError::configuration(format!(
                    "No Redis server configured: set the 'server' option or {}",
                    REDIS_URL_ENV
                ))
            })?,
        };

        let mut config = Self::new(url);

        if let Some(prefix) = options.get_str("key_prefix")? {
            config = config.with_key_prefix(prefix);
        }

        if let Some(ttl) = options.get_secs("ttl_secs")? {
            config = config.with_ttl(ttl);
        }

        if let Some(timeout) = options.get_secs("timeout_secs")? {
            config = config.with_connection_timeout(timeout);
        }

        Ok(config)
    }
}

/// Redis adapter over a single synchronous connection
pub struct RedisAdapter {
    connection: Mutex<Connection>,
    config: RedisAdapterConfig,
}

impl fmt::Debug for RedisAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisAdapter")
            .field("config", &self.config)
            .field("connection", &"<Connection>")
            .finish()
    }
}

impl RedisAdapter {
    /// Connects to the configured server
    pub fn new(config: RedisAdapterConfig) -> Result<Self, redis::RedisError> {
        let client = Client::open(config.url.as_str())?;
        let connection = client.get_connection_with_timeout(config.connection_timeout)?;

        Ok(Self {
            connection: Mutex::new(connection),
            config,
        })
    }

    pub fn from_options(options: &AdapterOptions) -> Result<Self, BoxError> {
        let config = RedisAdapterConfig::from_options(options)?;
        Ok(Self::new(config)?)
    }

    pub fn config(&self) -> &RedisAdapterConfig {
        &self.config
    }

    fn prefix_key(&self, key: &str) -> String {
        prefixed(self.config.key_prefix.as_deref(), key)
    }

    fn with_connection<T>(
        &self,
        key: &str,
        action: &str,
        f: impl FnOnce(&mut Connection, &str) -> redis::RedisResult<T>,
    ) -> Result<T, CacheError> {
        let mut conn = self
            .connection
            .lock()
            .map_err(|_| CacheError::storage("Redis connection lock poisoned"))?;

        f(&mut conn, &self.prefix_key(key)).map_err(|e| {
            CacheError::storage(format!("Failed to {} key '{}': {}", action, key, e))
        })
    }
}

fn prefixed(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

impl StorageAdapter for RedisAdapter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new().persistent()
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.with_connection(key, "get", |conn, key| conn.get(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<bool, CacheError> {
        let ttl = self.config.ttl;

        self.with_connection(key, "set", |conn, key| match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)),
            None => conn.set::<_, _, ()>(key, value),
        })?;

        Ok(true)
    }

    fn has(&self, key: &str) -> Result<bool, CacheError> {
        self.with_connection(key, "check", |conn, key| conn.exists(key))
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let deleted: i64 = self.with_connection(key, "delete", |conn, key| conn.del(key))?;
        Ok(deleted > 0)
    }
}
