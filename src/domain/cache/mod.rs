//! Cache domain - memoizing call cache, key generation and stored entries

mod call_cache;
mod entry;
mod key;
mod options;

pub use call_cache::CallCache;
pub use entry::CacheEntry;
pub use key::{canonical_form, CacheKey, DigestKeyGenerator, KeyGenerator, CACHE_KEY_LENGTH};
pub use options::{CallCacheOptions, ErrorHandler};
