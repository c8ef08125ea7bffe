//! Callable references and their canonical identity

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::{BoxError, CacheError};

/// Separator between an owning type and a method in a callable name
pub const METHOD_SEPARATOR: &str = "::";

/// A unit of work the call cache can invoke
///
/// Implemented for every `Fn(&[Value], &mut dyn Write) -> Result<Value, BoxError>`.
/// Anything written to `output` is the call's side output.
pub trait Callable: Send + Sync {
    fn invoke(&self, args: &[Value], output: &mut dyn Write) -> Result<Value, BoxError>;
}

impl<F> Callable for F
where
    F: Fn(&[Value], &mut dyn Write) -> Result<Value, BoxError> + Send + Sync,
{
    fn invoke(&self, args: &[Value], output: &mut dyn Write) -> Result<Value, BoxError> {
        self(args, output)
    }
}

/// An object whose methods can be cached
pub trait MethodReceiver: Send + Sync {
    /// Name of the receiver's type
    fn type_name(&self) -> &str;

    /// Instance state that decides the method results. Two receivers with the
    /// same type and fingerprint share cache entries.
    fn fingerprint(&self) -> Value;

    /// Whether `method` can be called on this receiver
    fn responds_to(&self, method: &str) -> bool;

    fn call_method(
        &self,
        method: &str,
        args: &[Value],
        output: &mut dyn Write,
    ) -> Result<Value, BoxError>;
}

/// The different shapes a callable can take
#[derive(Clone)]
pub enum CallableRef {
    /// Free function `name` or static method `Type::method`, looked up by a resolver
    Named(String),
    /// Method bound to a receiver instance
    Bound {
        receiver: Arc<dyn MethodReceiver>,
        method: String,
    },
    /// Anonymous callable with a caller-provided stable identifier
    Closure {
        id: String,
        callable: Arc<dyn Callable>,
    },
}

impl fmt::Debug for CallableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Bound { receiver, method } => f
                .debug_struct("Bound")
                .field("type", &receiver.type_name())
                .field("method", method)
                .finish(),
            Self::Closure { id, .. } => f.debug_struct("Closure").field("id", id).finish(),
        }
    }
}

impl CallableRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn bound(receiver: Arc<dyn MethodReceiver>, method: impl Into<String>) -> Self {
        Self::Bound {
            receiver,
            method: method.into(),
        }
    }

    pub fn closure<F>(id: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value], &mut dyn Write) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self::Closure {
            id: id.into(),
            callable: Arc::new(f),
        }
    }

    /// Normalizes a dynamic value into a callable reference
    ///
    /// A string names a function or `Type::method`; a two element array of
    /// strings names `[type, method]`. Anything else is not invokable.
    pub fn from_value(value: &Value) -> Result<Self, CacheError> {
        match value {
            Value::String(name) => Ok(Self::Named(name.clone())),
            Value::Array(parts) => match parts.as_slice() {
                [Value::String(owner), Value::String(method)] => Ok(Self::Named(format!(
                    "{}{}{}",
                    owner, METHOD_SEPARATOR, method
                ))),
                _ => Err(CacheError::invalid_callable(format!(
                    "expected [type, method], got {}",
                    value
                ))),
            },
            other => Err(CacheError::invalid_callable(format!(
                "{} is not invokable",
                other
            ))),
        }
    }
}

/// Conversion into a [`CallableRef`], failing for values that are not invokable
pub trait IntoCallable {
    fn into_callable(self) -> Result<CallableRef, CacheError>;
}

impl IntoCallable for CallableRef {
    fn into_callable(self) -> Result<CallableRef, CacheError> {
        Ok(self)
    }
}

impl IntoCallable for &CallableRef {
    fn into_callable(self) -> Result<CallableRef, CacheError> {
        Ok(self.clone())
    }
}

impl IntoCallable for &str {
    fn into_callable(self) -> Result<CallableRef, CacheError> {
        Ok(CallableRef::named(self))
    }
}

impl IntoCallable for String {
    fn into_callable(self) -> Result<CallableRef, CacheError> {
        Ok(CallableRef::Named(self))
    }
}

impl IntoCallable for &Value {
    fn into_callable(self) -> Result<CallableRef, CacheError> {
        CallableRef::from_value(self)
    }
}

impl IntoCallable for Value {
    fn into_callable(self) -> Result<CallableRef, CacheError> {
        CallableRef::from_value(&self)
    }
}

/// Canonical identity of a resolved callable, the first half of a cache key
#[derive(Debug, Clone, PartialEq)]
pub enum CallableIdentity {
    Named(String),
    Bound {
        owner: String,
        method: String,
        state: Value,
    },
    Closure(String),
}

impl fmt::Display for CallableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{}", name),
            Self::Bound { owner, method, .. } => {
                write!(f, "{}{}{} (bound)", owner, METHOD_SEPARATOR, method)
            }
            Self::Closure(id) => write!(f, "{{closure}} {}", id),
        }
    }
}

/// Checks that `name` is a syntactically valid function or `Type::method` name
pub fn validate_name(name: &str) -> Result<(), CacheError> {
    if name.is_empty() {
        return Err(CacheError::invalid_callable("callable name is empty"));
    }

    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CacheError::invalid_callable(format!(
            "callable name '{}' contains whitespace",
            name
        )));
    }

    if name.split(METHOD_SEPARATOR).any(str::is_empty) {
        return Err(CacheError::invalid_callable(format!(
            "callable name '{}' has an empty path segment",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_string() {
        let callable = CallableRef::from_value(&json!("strtoupper")).unwrap();
        assert!(matches!(callable, CallableRef::Named(name) if name == "strtoupper"));
    }

    #[test]
    fn test_from_value_type_method_pair() {
        let callable = CallableRef::from_value(&json!(["Report", "render"])).unwrap();
        assert!(matches!(callable, CallableRef::Named(name) if name == "Report::render"));
    }

    #[test]
    fn test_from_value_not_invokable() {
        for value in [json!(1), json!(null), json!(true), json!({"a": 1}), json!(["a"])] {
            let result = CallableRef::from_value(&value);
            assert!(
                matches!(result, Err(CacheError::InvalidCallable { .. })),
                "{} should not be invokable",
                value
            );
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("bar").is_ok());
        assert!(validate_name("pattern::TestCallbackCache::bar").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("foo bar").is_err());
        assert!(validate_name("::bar").is_err());
        assert!(validate_name("Foo::").is_err());
        assert!(validate_name("Foo::::bar").is_err());
    }

    #[test]
    fn test_closure_ref_invokes() {
        let callable = CallableRef::closure("double", |args: &[Value], _out: &mut dyn Write| {
            Ok(json!(args[0].as_i64().unwrap_or(0) * 2))
        });

        match callable {
            CallableRef::Closure { callable, .. } => {
                let mut sink = Vec::new();
                assert_eq!(callable.invoke(&[json!(21)], &mut sink).unwrap(), json!(42));
            }
            _ => panic!("expected closure"),
        }
    }

    #[test]
    fn test_identity_display() {
        let identity = CallableIdentity::Bound {
            owner: "Counter".to_string(),
            method: "next".to_string(),
            state: json!({"step": 1}),
        };
        assert_eq!(identity.to_string(), "Counter::next (bound)");
        assert_eq!(CallableIdentity::Closure("x".into()).to_string(), "{closure} x");
    }
}
