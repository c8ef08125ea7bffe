//! Storage infrastructure - Storage adapter implementations

mod black_hole;
mod filesystem;
mod memory;
mod options;
mod redis;

pub use black_hole::BlackHoleAdapter;
pub use filesystem::FilesystemAdapter;
pub use memory::{MemoryAdapter, MemoryAdapterConfig};
pub use options::AdapterOptions;
pub use redis::{RedisAdapter, RedisAdapterConfig, REDIS_URL_ENV};
