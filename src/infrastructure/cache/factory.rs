//! Call cache factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::config::CacheSettings;
use crate::domain::cache::{CallCache, CallCacheOptions, ErrorHandler};
use crate::domain::callable::CallableResolver;
use crate::domain::CacheError;
use crate::infrastructure::adapter::AdapterRegistry;

/// Builds call caches from configuration
#[derive(Debug)]
pub struct CallCacheFactory;

impl CallCacheFactory {
    /// Resolves the configured backend and wraps it in a call cache
    pub fn from_settings(
        registry: &AdapterRegistry,
        settings: &CacheSettings,
        resolver: Arc<dyn CallableResolver>,
    ) -> Result<CallCache, CacheError> {
        Self::create(registry, settings, resolver, None)
    }

    /// Like [`from_settings`](Self::from_settings), routing write failures to `error_handler`
    pub fn create(
        registry: &AdapterRegistry,
        settings: &CacheSettings,
        resolver: Arc<dyn CallableResolver>,
        error_handler: Option<ErrorHandler>,
    ) -> Result<CallCache, CacheError> {
        let storage = registry.build(&settings.adapter, &settings.options)?;

        info!(
            backend = %settings.adapter,
            cache_output = settings.cache_output,
            "Creating call cache"
        );

        let mut options = CallCacheOptions::new()
            .with_storage(storage)
            .with_cache_output(settings.cache_output);

        if let Some(handler) = error_handler {
            options = options.with_error_handler(handler);
        }

        CallCache::new(options, resolver)
    }
}
