//! Built-in storage backends

use std::sync::Arc;

use tracing::info;

use crate::domain::storage::StorageAdapter;
use crate::domain::{BoxError, CacheError};
use crate::infrastructure::storage::{
    AdapterOptions, BlackHoleAdapter, FilesystemAdapter, MemoryAdapter, MemoryAdapterConfig,
    RedisAdapter,
};

use super::registry::AdapterRegistry;

/// Canonical names of the built-in backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinBackend {
    Memory,
    Filesystem,
    Redis,
    BlackHole,
}

impl BuiltinBackend {
    pub const ALL: [BuiltinBackend; 4] = [
        BuiltinBackend::Memory,
        BuiltinBackend::Filesystem,
        BuiltinBackend::Redis,
        BuiltinBackend::BlackHole,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinBackend::Memory => "memory",
            BuiltinBackend::Filesystem => "filesystem",
            BuiltinBackend::Redis => "redis",
            BuiltinBackend::BlackHole => "blackhole",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            BuiltinBackend::Memory => &["Memory", "mem"],
            BuiltinBackend::Filesystem => &["Filesystem", "fs", "file"],
            BuiltinBackend::Redis => &["Redis"],
            BuiltinBackend::BlackHole => &["BlackHole", "Blackhole", "black_hole"],
        }
    }

    fn create(&self, options: &AdapterOptions) -> Result<Arc<dyn StorageAdapter>, BoxError> {
        let adapter: Arc<dyn StorageAdapter> = match self {
            BuiltinBackend::Memory => Arc::new(MemoryAdapter::with_config(
                MemoryAdapterConfig::from_options(options)?,
            )),
            BuiltinBackend::Filesystem => Arc::new(FilesystemAdapter::from_options(options)?),
            BuiltinBackend::Redis => Arc::new(RedisAdapter::from_options(options)?),
            BuiltinBackend::BlackHole => Arc::new(BlackHoleAdapter::new()),
        };

        Ok(adapter)
    }
}

/// Register every built-in backend, none of them shared
pub fn register_builtin_adapters(registry: &mut AdapterRegistry) -> Result<(), CacheError> {
    for backend in BuiltinBackend::ALL {
        registry.register(
            backend.name(),
            backend.aliases().iter().copied(),
            move |options: &AdapterOptions| backend.create(options),
            false,
        )?;
    }

    info!(count = BuiltinBackend::ALL.len(), "Registered built-in storage backends");
    Ok(())
}

/// A registry holding the built-in backends
pub fn builtin_registry() -> Result<AdapterRegistry, CacheError> {
    let mut registry = AdapterRegistry::new();
    register_builtin_adapters(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_all_aliases_resolve() {
        let registry = builtin_registry().unwrap();

        for backend in BuiltinBackend::ALL {
            assert_eq!(registry.canonical_name(backend.name()), Some(backend.name()));
            for alias in backend.aliases() {
                assert_eq!(registry.canonical_name(alias), Some(backend.name()));
            }
        }
    }

    #[test]
    fn test_memory_and_black_hole_construct_without_options() {
        let registry = builtin_registry().unwrap();

        let memory = registry.resolve("mem").unwrap();
        assert!(memory.set("k", "v").unwrap());

        let black_hole = registry.resolve("BlackHole").unwrap();
        assert!(!black_hole.set("k", "v").unwrap());
    }

    #[test]
    fn test_builtins_are_not_shared() {
        let registry = builtin_registry().unwrap();
        assert!(registry.definitions().iter().all(|d| !d.is_shared()));

        let first = registry.resolve("memory").unwrap();
        first.set("k", "v").unwrap();
        assert!(registry.resolve("memory").unwrap().get("k").unwrap().is_none());
    }

    #[test]
    fn test_filesystem_requires_cache_dir() {
        let registry = builtin_registry().unwrap();
        assert!(matches!(
            registry.resolve("fs"),
            Err(CacheError::BackendUnavailable { ref name, .. }) if name == "filesystem"
        ));

        let dir = TempDir::new().unwrap();
        let options =
            AdapterOptions::new().with("cache_dir", dir.path().to_string_lossy().to_string());
        let adapter = registry.build("file", &options).unwrap();
        assert!(adapter.capabilities().persistent);
    }

    #[test]
    fn test_unreachable_redis_is_unavailable() {
        let registry = builtin_registry().unwrap();
        let options = AdapterOptions::new()
            .with("server", "redis://127.0.0.1:1")
            .with("timeout_secs", 1);

        assert!(matches!(
            registry.build("Redis", &options),
            Err(CacheError::BackendUnavailable { ref name, .. }) if name == "redis"
        ));
    }

    #[test]
    fn test_invalid_memory_options_are_unavailable() {
        let registry = builtin_registry().unwrap();
        let options = AdapterOptions::new().with("max_capacity", "lots");

        assert!(matches!(
            registry.build("memory", &options),
            Err(CacheError::BackendUnavailable { .. })
        ));
    }
}
