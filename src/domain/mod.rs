//! Domain layer - Call cache core, callables and the storage contract

pub mod cache;
pub mod callable;
pub mod error;
pub mod storage;

pub use cache::{
    CacheEntry, CacheKey, CallCache, CallCacheOptions, DigestKeyGenerator, KeyGenerator,
};
pub use callable::{
    Callable, CallableIdentity, CallableRef, CallableResolver, FunctionRegistry, IntoCallable,
    MethodReceiver,
};
pub use error::{BoxError, CacheError};
pub use storage::{Capabilities, StorageAdapter, StorageAdapterExt, StorageObserver};
