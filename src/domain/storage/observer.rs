//! Storage observers
//!
//! Observers are attached when an adapter handle is built by wrapping it in an
//! [`ObservedAdapter`]. Every hook has an empty default so an observer only
//! implements the events it cares about.

use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::CacheError;

use super::adapter::StorageAdapter;
use super::capabilities::Capabilities;

/// Hooks fired around storage operations
pub trait StorageObserver: Send + Sync + Debug {
    fn on_before_get(&self, _key: &str) {}

    fn on_after_get(&self, _key: &str, _found: bool) {}

    fn on_before_set(&self, _key: &str, _value: &str) {}

    fn on_after_set(&self, _key: &str, _stored: bool) {}

    fn on_before_remove(&self, _key: &str) {}

    fn on_after_remove(&self, _key: &str, _removed: bool) {}
}

/// Adapter decorator that reports operations to a set of observers
#[derive(Debug)]
pub struct ObservedAdapter {
    inner: Arc<dyn StorageAdapter>,
    observers: Vec<Arc<dyn StorageObserver>>,
}

impl ObservedAdapter {
    pub fn new(inner: Arc<dyn StorageAdapter>) -> Self {
        Self {
            inner,
            observers: Vec::new(),
        }
    }

    /// Attaches an observer
    pub fn with_observer(mut self, observer: Arc<dyn StorageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Returns the wrapped adapter
    pub fn inner(&self) -> &Arc<dyn StorageAdapter> {
        &self.inner
    }

    fn notify(&self, event: impl Fn(&dyn StorageObserver)) {
        for observer in &self.observers {
            event(observer.as_ref());
        }
    }
}

impl StorageAdapter for ObservedAdapter {
    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.notify(|o| o.on_before_get(key));
        let result = self.inner.get(key)?;
        self.notify(|o| o.on_after_get(key, result.is_some()));
        Ok(result)
    }

    fn set(&self, key: &str, value: &str) -> Result<bool, CacheError> {
        self.notify(|o| o.on_before_set(key, value));
        let stored = self.inner.set(key, value)?;
        self.notify(|o| o.on_after_set(key, stored));
        Ok(stored)
    }

    fn has(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.has(key)
    }

    fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.notify(|o| o.on_before_remove(key));
        let removed = self.inner.remove(key)?;
        self.notify(|o| o.on_after_remove(key, removed));
        Ok(removed)
    }
}
