//! CLI module for call-cache
//!
//! Provides subcommands for inspecting and exercising the cache:
//! - `backends`: list registered storage backends
//! - `key`: print the cache key for a callable and arguments
//! - `call`: run a demo function through the configured cache
//! - `probe`: round-trip an entry through a storage backend

pub mod backends;
pub mod call;
pub mod demo;
pub mod key;
pub mod probe;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::AppConfig;
use crate::domain::{CacheError, CallableRef};
use crate::infrastructure::logging;

/// call-cache - Memoize function calls in pluggable storage
#[derive(Parser)]
#[command(name = "call-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered storage backends and their aliases
    Backends,

    /// Print the cache key for a callable and JSON arguments
    Key(key::KeyArgs),

    /// Invoke a demo function through the configured cache
    Call(call::CallArgs),

    /// Resolve a backend and round-trip an entry through it
    Probe(probe::ProbeArgs),
}

/// Loads `.env` and configuration, then installs logging
pub fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);
    config
}

/// Parses a callable given on the command line
///
/// A JSON array such as `["Text","upper"]` is a `[type, method]` pair;
/// anything else is taken as a name.
pub fn parse_callable(raw: &str) -> Result<CallableRef, CacheError> {
    if raw.trim_start().starts_with('[') {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| CacheError::invalid_callable(format!("{}: {}", raw, e)))?;
        return CallableRef::from_value(&value);
    }

    Ok(CallableRef::named(raw))
}

/// Parses each argument as JSON, keeping it as a string when it is not JSON
pub fn parse_arguments(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let args = parse_arguments(&[
            "1".to_string(),
            "\"1\"".to_string(),
            "plain".to_string(),
            "[1,null]".to_string(),
        ]);

        assert_eq!(args, vec![json!(1), json!("1"), json!("plain"), json!([1, null])]);
    }

    #[test]
    fn test_parse_callable() {
        let pair = parse_callable(r#"["Text", "upper"]"#).unwrap();
        assert!(matches!(pair, CallableRef::Named(ref name) if name == "Text::upper"));

        assert!(parse_callable("[1, 2]").is_err());
        assert!(parse_callable("[broken").is_err());
        assert!(matches!(
            parse_callable("sum").unwrap(),
            CallableRef::Named(ref name) if name == "sum"
        ));
    }
}
