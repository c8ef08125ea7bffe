//! Demo functions available to the `key` and `call` commands

use std::io::Write;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::{BoxError, CacheError, CallableResolver, FunctionRegistry};

fn sum(args: &[Value], _output: &mut dyn Write) -> Result<Value, BoxError> {
    let mut total = 0i64;
    for arg in args {
        let n = arg
            .as_i64()
            .ok_or_else(|| format!("sum expects integers, got {}", arg))?;
        total = total.checked_add(n).ok_or("integer overflow")?;
    }
    Ok(json!(total))
}

fn greet(args: &[Value], output: &mut dyn Write) -> Result<Value, BoxError> {
    let name = args.first().and_then(Value::as_str).unwrap_or("world");
    let greeting = format!("Hello, {}!", name);
    writeln!(output, "{}", greeting)?;
    Ok(json!(greeting.len()))
}

fn upper(args: &[Value], _output: &mut dyn Write) -> Result<Value, BoxError> {
    match args.first() {
        Some(Value::String(s)) => Ok(json!(s.to_uppercase())),
        Some(Value::Null) | None => Ok(Value::Null),
        Some(other) => Err(format!("upper expects a string, got {}", other).into()),
    }
}

/// A resolver knowing `sum`, `greet` and `Text::upper`
pub fn demo_resolver() -> Result<Arc<dyn CallableResolver>, CacheError> {
    let mut functions = FunctionRegistry::new();
    functions.register("sum", sum)?;
    functions.register("greet", greet)?;
    functions.register_method("Text", "upper", upper)?;
    Ok(Arc::new(functions))
}
