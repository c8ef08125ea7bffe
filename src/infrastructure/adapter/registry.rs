//! Adapter Registry
//!
//! Maps backend names and aliases to storage adapter factories and keeps
//! shared instances alive for the registry's lifetime.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::domain::storage::StorageAdapter;
use crate::domain::{BoxError, CacheError};
use crate::infrastructure::storage::AdapterOptions;

/// Builds a storage adapter from backend options
pub type AdapterFactory =
    Arc<dyn Fn(&AdapterOptions) -> Result<Arc<dyn StorageAdapter>, BoxError> + Send + Sync>;

/// A registered backend
#[derive(Clone)]
pub struct AdapterDefinition {
    name: String,
    aliases: Vec<String>,
    factory: AdapterFactory,
    shared: bool,
}

impl AdapterDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether one instance is reused for every resolution
    pub fn is_shared(&self) -> bool {
        self.shared
    }
}

impl fmt::Debug for AdapterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("shared", &self.shared)
            .finish()
    }
}

/// Registry of storage backends
///
/// Registration happens at configuration time through `&mut self`. Resolution
/// only needs `&self`; the shared-instance map is the one piece of interior
/// state and is written only when a shared backend is first constructed.
#[derive(Default)]
pub struct AdapterRegistry {
    definitions: HashMap<String, AdapterDefinition>,
    aliases: HashMap<String, String>,
    instances: RwLock<HashMap<String, Arc<dyn StorageAdapter>>>,
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("definitions", &self.definitions())
            .finish()
    }
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under a canonical name and its aliases
    ///
    /// Registering an existing canonical name replaces it, dropping its old
    /// aliases and any shared instance.
    pub fn register<I, S, F>(
        &mut self,
        name: impl Into<String>,
        aliases: I,
        factory: F,
        shared: bool,
    ) -> Result<(), CacheError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&AdapterOptions) -> Result<Arc<dyn StorageAdapter>, BoxError> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut alias_list: Vec<String> = Vec::new();
        for alias in aliases {
            let alias = alias.into();
            if !alias_list.contains(&alias) {
                alias_list.push(alias);
            }
        }

        self.check_registration(&name, &alias_list)?;

        if self.definitions.remove(&name).is_some() {
            debug!(backend = %name, "Replacing backend registration");
            self.aliases.retain(|_, canonical| canonical != &name);
            self.instances
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&name);
        }

        for alias in &alias_list {
            self.aliases.insert(alias.clone(), name.clone());
        }

        info!(
            backend = %name,
            aliases = ?alias_list,
            shared = shared,
            "Registering storage backend"
        );

        self.definitions.insert(
            name.clone(),
            AdapterDefinition {
                name,
                aliases: alias_list,
                factory: Arc::new(factory),
                shared,
            },
        );

        Ok(())
    }

    fn check_registration(&self, name: &str, aliases: &[String]) -> Result<(), CacheError> {
        if name.is_empty() {
            return Err(CacheError::configuration("Backend name cannot be empty"));
        }

        if let Some(owner) = self.aliases.get(name) {
            return Err(CacheError::configuration(format!(
                "Backend name '{}' is already an alias of '{}'",
                name, owner
            )));
        }

        for alias in aliases {
            if alias.is_empty() {
                return Err(CacheError::configuration(format!(
                    "Backend '{}' has an empty alias",
                    name
                )));
            }

            if alias == name {
                return Err(CacheError::configuration(format!(
                    "Alias '{}' refers to itself",
                    alias
                )));
            }

            if self.definitions.contains_key(alias) {
                return Err(CacheError::configuration(format!(
                    "Alias '{}' of '{}' collides with a registered backend",
                    alias, name
                )));
            }

            if let Some(owner) = self.aliases.get(alias) {
                if owner != name {
                    return Err(CacheError::configuration(format!(
                        "Alias '{}' is already bound to '{}'",
                        alias, owner
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolves a name or alias to its canonical backend name
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        if let Some(canonical) = self.aliases.get(name) {
            return Some(canonical.as_str());
        }

        self.definitions.get_key_value(name).map(|(k, _)| k.as_str())
    }

    /// Check if a name or alias is registered
    pub fn has(&self, name: &str) -> bool {
        self.canonical_name(name).is_some()
    }

    /// Registered backends ordered by canonical name
    pub fn definitions(&self) -> Vec<&AdapterDefinition> {
        let mut definitions: Vec<_> = self.definitions.values().collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Resolve a backend with default options
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn StorageAdapter>, CacheError> {
        self.build(name, &AdapterOptions::default())
    }

    /// Resolve a backend, constructing it with `options` when needed
    ///
    /// For shared backends the options only matter for the first construction.
    pub fn build(
        &self,
        name: &str,
        options: &AdapterOptions,
    ) -> Result<Arc<dyn StorageAdapter>, CacheError> {
        let canonical = self
            .canonical_name(name)
            .ok_or_else(|| CacheError::unknown_backend(name))?;

        let definition = self
            .definitions
            .get(canonical)
            .ok_or_else(|| CacheError::unknown_backend(name))?;

        if definition.shared {
            let instances = self.instances.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(adapter) = instances.get(canonical) {
                debug!(backend = %canonical, "Reusing shared storage adapter");
                return Ok(adapter.clone());
            }
        }

        let adapter = (definition.factory)(options)
            .map_err(|e| CacheError::backend_unavailable(canonical, e))?;

        let missing = adapter.capabilities().missing_requirements();
        if !missing.is_empty() {
            return Err(CacheError::invalid_adapter(canonical, missing.join(", ")));
        }

        if !definition.shared {
            debug!(backend = %canonical, "Constructed storage adapter");
            return Ok(adapter);
        }

        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let adapter = instances
            .entry(canonical.to_string())
            .or_insert_with(|| {
                info!(backend = %canonical, "Created shared storage adapter");
                adapter
            })
            .clone();

        Ok(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::storage::mock::MockStorage;
    use crate::domain::storage::Capabilities;
    use crate::infrastructure::storage::MemoryAdapter;
    use std::error::Error as _;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn memory_factory(_: &AdapterOptions) -> Result<Arc<dyn StorageAdapter>, BoxError> {
        Ok(Arc::new(MemoryAdapter::new()))
    }

    fn no_aliases() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn test_alias_resolves_to_shared_instance() {
        let mut registry = AdapterRegistry::new();
        registry
            .register("memory", ["mem"], memory_factory, true)
            .unwrap();

        let by_alias = registry.resolve("mem").unwrap();
        let by_name = registry.resolve("memory").unwrap();

        by_alias.set("foo", "bar").unwrap();
        assert_eq!(by_name.get("foo").unwrap(), Some("bar".to_string()));
        assert!(Arc::ptr_eq(&by_alias, &by_name));
    }

    #[test]
    fn test_non_shared_returns_fresh_instances() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let counter = constructed.clone();

        let mut registry = AdapterRegistry::new();
        registry
            .register(
                "memory",
                ["mem"],
                move |options: &AdapterOptions| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    memory_factory(options)
                },
                false,
            )
            .unwrap();

        let first = registry.resolve("mem").unwrap();
        let second = registry.resolve("memory").unwrap();

        first.set("foo", "bar").unwrap();
        assert!(second.get("foo").unwrap().is_none());
        assert_eq!(constructed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_factory_failure_is_backend_unavailable() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(
                "redis",
                ["Redis"],
                |_: &AdapterOptions| -> Result<Arc<dyn StorageAdapter>, BoxError> {
                    Err(Box::new(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "redis extension missing",
                    )))
                },
                true,
            )
            .unwrap();

        let error = registry.resolve("Redis").unwrap_err();
        match &error {
            CacheError::BackendUnavailable { name, .. } => assert_eq!(name, "redis"),
            other => panic!("unexpected error: {other:?}"),
        }

        let source = error.source().unwrap();
        let io = source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_failed_construction_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();

        let mut registry = AdapterRegistry::new();
        registry
            .register(
                "flaky",
                no_aliases(),
                move |options: &AdapterOptions| -> Result<Arc<dyn StorageAdapter>, BoxError> {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err("not yet".into())
                    } else {
                        memory_factory(options)
                    }
                },
                true,
            )
            .unwrap();

        assert!(registry.resolve("flaky").is_err());
        assert!(registry.resolve("flaky").is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_incapable_adapter_is_rejected_and_not_cached() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(
                "readonly",
                no_aliases(),
                |_: &AdapterOptions| -> Result<Arc<dyn StorageAdapter>, BoxError> {
                    Ok(Arc::new(
                        MockStorage::new().with_capabilities(Capabilities::new().read_only()),
                    ))
                },
                true,
            )
            .unwrap();

        let error = registry.resolve("readonly").unwrap_err();
        assert!(matches!(error, CacheError::InvalidAdapter { ref name, .. } if name == "readonly"));
        assert!(registry
            .instances
            .read()
            .unwrap()
            .get("readonly")
            .is_none());
    }

    #[test]
    fn test_unknown_backend() {
        let registry = AdapterRegistry::new();
        assert!(matches!(
            registry.resolve("missing"),
            Err(CacheError::UnknownBackend { ref name }) if name == "missing"
        ));
        assert!(!registry.has("missing"));
    }

    #[test]
    fn test_alias_self_cycle_rejected() {
        let mut registry = AdapterRegistry::new();
        let result = registry.register("memory", ["memory"], memory_factory, false);
        assert!(matches!(result, Err(CacheError::Configuration { .. })));
        assert!(!registry.has("memory"));
    }

    #[test]
    fn test_alias_collisions_rejected() {
        let mut registry = AdapterRegistry::new();
        registry.register("memory", ["mem"], memory_factory, false).unwrap();

        // alias naming another canonical backend
        assert!(registry.register("other", ["memory"], memory_factory, false).is_err());
        // canonical name already used as an alias
        assert!(registry.register("mem", no_aliases(), memory_factory, false).is_err());
        // alias bound elsewhere
        assert!(registry.register("other", ["mem"], memory_factory, false).is_err());

        assert_eq!(registry.canonical_name("mem"), Some("memory"));
        assert!(!registry.has("other"));
    }

    #[test]
    fn test_duplicate_registration_overwrites() {
        let mut registry = AdapterRegistry::new();
        registry.register("memory", ["mem"], memory_factory, true).unwrap();
        let before = registry.resolve("memory").unwrap();
        before.set("foo", "bar").unwrap();

        registry.register("memory", ["Memory"], memory_factory, true).unwrap();

        assert!(!registry.has("mem"));
        assert_eq!(registry.canonical_name("Memory"), Some("memory"));

        let after = registry.resolve("Memory").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.get("foo").unwrap().is_none());
    }

    #[test]
    fn test_aliases_are_case_sensitive() {
        let mut registry = AdapterRegistry::new();
        registry.register("memory", ["Mem"], memory_factory, false).unwrap();

        assert!(registry.has("Mem"));
        assert!(!registry.has("mem"));
        assert!(!registry.has("MEMORY"));
    }

    #[test]
    fn test_definitions_sorted() {
        let mut registry = AdapterRegistry::new();
        registry.register("zeta", no_aliases(), memory_factory, false).unwrap();
        registry.register("alpha", ["a"], memory_factory, true).unwrap();

        let names: Vec<_> = registry.definitions().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(registry.definitions()[0].is_shared());
        assert_eq!(registry.definitions()[0].aliases(), &["a".to_string()]);
    }

    #[test]
    fn test_build_passes_options_to_factory() {
        let mut registry = AdapterRegistry::new();
        registry
            .register(
                "configured",
                no_aliases(),
                |options: &AdapterOptions| -> Result<Arc<dyn StorageAdapter>, BoxError> {
                    let capacity = options.get_u64("max_capacity")?.ok_or("max_capacity missing")?;
                    assert_eq!(capacity, 3);
                    memory_factory(options)
                },
                false,
            )
            .unwrap();

        assert!(registry.resolve("configured").is_err());

        let options = AdapterOptions::new().with("max_capacity", 3);
        assert!(registry.build("configured", &options).is_ok());
    }
}
