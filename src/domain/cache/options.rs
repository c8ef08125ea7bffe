//! Call cache options

use std::fmt;
use std::sync::Arc;

use crate::domain::storage::StorageAdapter;
use crate::domain::CacheError;

/// Callback receiving non-fatal errors (failed cache writes)
pub type ErrorHandler = Arc<dyn Fn(&CacheError) + Send + Sync>;

/// Configuration of a [`CallCache`](super::CallCache)
///
/// `storage` is mandatory; output capture is enabled by default.
#[derive(Clone)]
pub struct CallCacheOptions {
    storage: Option<Arc<dyn StorageAdapter>>,
    cache_output: bool,
    error_handler: Option<ErrorHandler>,
}

impl Default for CallCacheOptions {
    fn default() -> Self {
        Self {
            storage: None,
            cache_output: true,
            error_handler: None,
        }
    }
}

impl fmt::Debug for CallCacheOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallCacheOptions")
            .field("storage", &self.storage)
            .field("cache_output", &self.cache_output)
            .field("has_error_handler", &self.error_handler.is_some())
            .finish()
    }
}

impl CallCacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage adapter entries are read from and written to
    pub fn with_storage(mut self, storage: Arc<dyn StorageAdapter>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Enables or disables capture and replay of side output
    pub fn with_cache_output(mut self, cache_output: bool) -> Self {
        self.cache_output = cache_output;
        self
    }

    /// Routes non-fatal errors to `handler` in addition to the log
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn storage(&self) -> Option<&Arc<dyn StorageAdapter>> {
        self.storage.as_ref()
    }

    pub fn cache_output(&self) -> bool {
        self.cache_output
    }

    pub fn error_handler(&self) -> Option<&ErrorHandler> {
        self.error_handler.as_ref()
    }

    /// Returns the storage or the configuration error for its absence
    pub(crate) fn require_storage(&self) -> Result<Arc<dyn StorageAdapter>, CacheError> {
        self.storage.clone().ok_or_else(|| {
            CacheError::configuration("Call cache requires a storage adapter")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::mock::MockStorage;

    #[test]
    fn test_defaults() {
        let options = CallCacheOptions::new();
        assert!(options.cache_output());
        assert!(options.storage().is_none());
        assert!(options.error_handler().is_none());
    }

    #[test]
    fn test_require_storage() {
        let missing = CallCacheOptions::new().require_storage();
        assert!(matches!(missing, Err(CacheError::Configuration { .. })));

        let options = CallCacheOptions::new()
            .with_storage(Arc::new(MockStorage::new()))
            .with_cache_output(false);
        assert!(options.require_storage().is_ok());
        assert!(!options.cache_output());
    }
}
