//! Callable domain - what the call cache can wrap
//!
//! A [`CallableRef`] is one of:
//! - `Named` - a free function or `Type::method` looked up through a [`CallableResolver`]
//! - `Bound` - a method on a [`MethodReceiver`] instance
//! - `Closure` - an anonymous callable with a stable identifier
//!
//! Resolution produces a [`ResolvedCallable`] whose [`CallableIdentity`] feeds the
//! key generator.

mod reference;
mod resolver;

pub use reference::{
    validate_name, Callable, CallableIdentity, CallableRef, IntoCallable, MethodReceiver,
    METHOD_SEPARATOR,
};
pub use resolver::{CallableResolver, FunctionRegistry, ResolvedCallable};
