//! Adapter infrastructure
//!
//! - Adapter registry resolving backend names and aliases to storage adapters
//! - Built-in backend registrations

pub mod builtin;
pub mod registry;

pub use builtin::{builtin_registry, register_builtin_adapters, BuiltinBackend};
pub use registry::{AdapterDefinition, AdapterFactory, AdapterRegistry};
