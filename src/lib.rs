//! Call Cache
//!
//! Memoizes function calls in pluggable storage:
//! - Deterministic keys from the callable's identity and its arguments
//! - Replay of return values (including `null`) and captured side output
//! - Storage backends resolved by name or alias through an adapter registry
//! - Built-in memory, filesystem, Redis and black-hole backends

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    CacheEntry, CacheError, CacheKey, CallCache, CallCacheOptions, Callable, CallableRef,
    CallableResolver, FunctionRegistry, MethodReceiver, StorageAdapter,
};
pub use infrastructure::adapter::{builtin_registry, AdapterRegistry};
pub use infrastructure::cache::CallCacheFactory;
pub use infrastructure::storage::AdapterOptions;
