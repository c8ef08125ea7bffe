//! Storage adapter that discards every write

use crate::domain::storage::{Capabilities, StorageAdapter};
use crate::domain::CacheError;

/// Never stores anything; every lookup is a miss
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackHoleAdapter;

impl BlackHoleAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl StorageAdapter for BlackHoleAdapter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new()
    }

    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn has(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    fn remove(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_is_kept() {
        let adapter = BlackHoleAdapter::new();

        assert!(!adapter.set("key1", "value1").unwrap());
        assert!(adapter.get("key1").unwrap().is_none());
        assert!(!adapter.has("key1").unwrap());
        assert!(!adapter.remove("key1").unwrap());
        assert!(adapter.capabilities().satisfies_contract());
    }
}
