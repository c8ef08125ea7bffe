//! Storage domain - Storage adapter contract, capabilities and observers

mod adapter;
mod capabilities;
mod observer;

pub use adapter::{StorageAdapter, StorageAdapterExt};
pub use capabilities::Capabilities;
pub use observer::{ObservedAdapter, StorageObserver};

#[cfg(test)]
pub use adapter::MockStorageAdapter;
#[cfg(test)]
pub use adapter::mock;
