//! Callable resolution
//!
//! Named callables are looked up through a [`CallableResolver`] that is handed to
//! the call cache explicitly. [`FunctionRegistry`] is the in-process
//! implementation.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::domain::{BoxError, CacheError};

use super::reference::{
    validate_name, Callable, CallableIdentity, CallableRef, MethodReceiver, METHOD_SEPARATOR,
};

/// Maps callable names to invokable units
pub trait CallableResolver: Send + Sync + fmt::Debug {
    /// Looks up a validated name, `None` when it is unknown
    fn lookup(&self, name: &str) -> Option<Arc<dyn Callable>>;
}

/// In-process table of named functions and static methods
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Callable>>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry")
            .field("functions", &names)
            .finish()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a free function under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> Result<(), CacheError>
    where
        F: Fn(&[Value], &mut dyn Write) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register_callable(name, Arc::new(f))
    }

    /// Registers a static method, reachable as `owner::method`
    pub fn register_method<F>(
        &mut self,
        owner: &str,
        method: &str,
        f: F,
    ) -> Result<(), CacheError>
    where
        F: Fn(&[Value], &mut dyn Write) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register(format!("{}{}{}", owner, METHOD_SEPARATOR, method), f)
    }

    /// Registers an already boxed callable
    pub fn register_callable(
        &mut self,
        name: impl Into<String>,
        callable: Arc<dyn Callable>,
    ) -> Result<(), CacheError> {
        let name = name.into();
        validate_name(&name)?;

        debug!(callable = %name, "Registering callable");
        self.functions.insert(name, callable);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }
}

impl CallableResolver for FunctionRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Callable>> {
        self.functions.get(name).cloned()
    }
}

enum Target {
    Function(Arc<dyn Callable>),
    Method {
        receiver: Arc<dyn MethodReceiver>,
        method: String,
    },
}

/// A callable that passed validation and resolution
pub struct ResolvedCallable {
    identity: CallableIdentity,
    target: Target,
}

impl fmt::Debug for ResolvedCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCallable")
            .field("identity", &self.identity)
            .finish()
    }
}

impl ResolvedCallable {
    /// Validates `callable` and resolves it to something invokable
    ///
    /// Never invokes anything: malformed references fail with
    /// [`CacheError::InvalidCallable`], unknown names with
    /// [`CacheError::UnknownCallable`].
    pub fn resolve(
        resolver: &dyn CallableResolver,
        callable: &CallableRef,
    ) -> Result<Self, CacheError> {
        match callable {
            CallableRef::Named(name) => {
                validate_name(name)?;
                let function = resolver
                    .lookup(name)
                    .ok_or_else(|| CacheError::unknown_callable(name.clone()))?;

                Ok(Self {
                    identity: CallableIdentity::Named(name.clone()),
                    target: Target::Function(function),
                })
            }
            CallableRef::Bound { receiver, method } => {
                if method.is_empty() || !receiver.responds_to(method) {
                    return Err(CacheError::invalid_callable(format!(
                        "{} has no method '{}'",
                        receiver.type_name(),
                        method
                    )));
                }

                Ok(Self {
                    identity: CallableIdentity::Bound {
                        owner: receiver.type_name().to_string(),
                        method: method.clone(),
                        state: receiver.fingerprint(),
                    },
                    target: Target::Method {
                        receiver: receiver.clone(),
                        method: method.clone(),
                    },
                })
            }
            CallableRef::Closure { id, callable } => {
                if id.is_empty() {
                    return Err(CacheError::invalid_callable(
                        "closure identifier is empty",
                    ));
                }

                Ok(Self {
                    identity: CallableIdentity::Closure(id.clone()),
                    target: Target::Function(callable.clone()),
                })
            }
        }
    }

    pub fn identity(&self) -> &CallableIdentity {
        &self.identity
    }

    /// Runs the underlying callable
    pub fn invoke(&self, args: &[Value], output: &mut dyn Write) -> Result<Value, BoxError> {
        match &self.target {
            Target::Function(function) => function.invoke(args, output),
            Target::Method { receiver, method } => receiver.call_method(method, args, output),
        }
    }
}
