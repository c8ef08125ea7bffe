//! Memoizing call cache
//!
//! Wraps a callable so that repeated invocations with equal arguments are served
//! from storage. Per call:
//!
//! 1. resolve the callable (validation errors abort before touching storage)
//! 2. generate the key
//! 3. look the key up; a read failure or an unreadable entry counts as a miss
//! 4. hit: replay the stored output (if capture is enabled) and return the value
//! 5. miss: invoke, store `(value, output)`, emit the output and return the value
//!
//! Errors from the callable are returned as [`CacheError::Callback`] and never
//! stored. Concurrent misses on one key are not coalesced; each invokes the
//! callable and the last write wins.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::callable::{CallableResolver, IntoCallable, ResolvedCallable};
use crate::domain::storage::{StorageAdapter, StorageAdapterExt};
use crate::domain::CacheError;

use super::entry::CacheEntry;
use super::key::{CacheKey, DigestKeyGenerator, KeyGenerator};
use super::options::{CallCacheOptions, ErrorHandler};

/// Memoizing wrapper around callables
pub struct CallCache {
    storage: Arc<dyn StorageAdapter>,
    resolver: Arc<dyn CallableResolver>,
    key_generator: Arc<dyn KeyGenerator>,
    cache_output: bool,
    error_handler: Option<ErrorHandler>,
}

impl fmt::Debug for CallCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallCache")
            .field("storage", &self.storage)
            .field("resolver", &self.resolver)
            .field("key_generator", &self.key_generator)
            .field("cache_output", &self.cache_output)
            .finish()
    }
}

impl CallCache {
    /// Creates a call cache; fails when the options carry no storage
    pub fn new(
        options: CallCacheOptions,
        resolver: Arc<dyn CallableResolver>,
    ) -> Result<Self, CacheError> {
        let storage = options.require_storage()?;

        Ok(Self {
            storage,
            resolver,
            key_generator: Arc::new(DigestKeyGenerator::new()),
            cache_output: options.cache_output(),
            error_handler: options.error_handler().cloned(),
        })
    }

    /// Replaces the default key generator
    pub fn with_key_generator(mut self, key_generator: Arc<dyn KeyGenerator>) -> Self {
        self.key_generator = key_generator;
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn cache_output(&self) -> bool {
        self.cache_output
    }

    /// Generates the key `call` would use, without invoking anything
    pub fn generate_key<C>(&self, callable: C, args: &[Value]) -> Result<CacheKey, CacheError>
    where
        C: IntoCallable,
    {
        let callable = callable.into_callable()?;
        let resolved = ResolvedCallable::resolve(self.resolver.as_ref(), &callable)?;
        Ok(self.key_generator.generate(resolved.identity(), args))
    }

    /// Calls through the cache, emitting side output on stdout
    pub fn call<C>(&self, callable: C, args: &[Value]) -> Result<Value, CacheError>
    where
        C: IntoCallable,
    {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let value = self.call_with_output(callable, args, &mut handle)?;
        handle.flush().map_err(CacheError::Output)?;
        Ok(value)
    }

    /// Calls through the cache, emitting side output on `output`
    pub fn call_with_output<C>(
        &self,
        callable: C,
        args: &[Value],
        output: &mut dyn Write,
    ) -> Result<Value, CacheError>
    where
        C: IntoCallable,
    {
        let callable = callable.into_callable()?;
        let resolved = ResolvedCallable::resolve(self.resolver.as_ref(), &callable)?;
        let key = self.key_generator.generate(resolved.identity(), args);

        if let Some(entry) = self.lookup(&key) {
            debug!(key = %key, callable = %resolved.identity(), "Cache hit");

            if self.cache_output {
                if let Some(captured) = &entry.output {
                    output.write_all(captured).map_err(CacheError::Output)?;
                }
            }

            return Ok(entry.value);
        }

        debug!(key = %key, callable = %resolved.identity(), "Cache miss");

        if !self.cache_output {
            let value = resolved.invoke(args, output).map_err(CacheError::Callback)?;
            self.store(&key, &CacheEntry::new(value.clone()));
            return Ok(value);
        }

        let mut captured = Vec::new();
        let value = match resolved.invoke(args, &mut captured) {
            Ok(value) => value,
            Err(e) => {
                if let Err(write_error) = output.write_all(&captured) {
                    warn!(error = %write_error, "Failed to flush output of failed call");
                }
                return Err(CacheError::Callback(e));
            }
        };

        self.store(&key, &CacheEntry::with_output(value.clone(), captured.clone()));
        output.write_all(&captured).map_err(CacheError::Output)?;

        Ok(value)
    }

    fn lookup(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.storage.get_item::<CacheEntry>(key.as_str()) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    fn store(&self, key: &CacheKey, entry: &CacheEntry) {
        let error = match self.storage.set_item(key.as_str(), entry) {
            Ok(true) => return,
            Ok(false) => CacheError::storage_write(key.as_str(), "backend did not store the entry"),
            Err(e) => CacheError::storage_write(key.as_str(), e.to_string()),
        };

        warn!(key = %key, error = %error, "Cache write failed, next call will miss again");

        if let Some(handler) = &self.error_handler {
            handler(&error);
        }
    }
}
