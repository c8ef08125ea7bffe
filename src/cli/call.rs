//! Call command - runs a demo function through the configured cache

use clap::Args;
use tracing::info;

use crate::config::CacheSettings;
use crate::infrastructure::adapter::builtin_registry;
use crate::infrastructure::cache::CallCacheFactory;

use super::demo::demo_resolver;
use super::{parse_arguments, parse_callable};

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Demo function: `sum`, `greet` or `Text::upper`
    pub callable: String,

    /// Arguments, each parsed as JSON (non-JSON text is taken as a string)
    pub args: Vec<String>,

    /// Backend to use instead of the configured one
    #[arg(long)]
    pub backend: Option<String>,

    /// Do not capture and replay side output
    #[arg(long)]
    pub no_output_cache: bool,
}

pub fn run(args: CallArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let settings = settings_for(&args, config.cache);

    let registry = builtin_registry()?;
    let cache = CallCacheFactory::from_settings(&registry, &settings, demo_resolver()?)?;

    let callable = parse_callable(&args.callable)?;
    let arguments = parse_arguments(&args.args);
    let key = cache.generate_key(&callable, &arguments)?;
    info!(key = %key, backend = %settings.adapter, "Calling through cache");

    let value = cache.call(&callable, &arguments)?;
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn settings_for(args: &CallArgs, mut settings: CacheSettings) -> CacheSettings {
    if let Some(backend) = &args.backend {
        if backend != &settings.adapter {
            settings.options = Default::default();
        }
        settings.adapter = backend.clone();
    }

    if args.no_output_cache {
        settings.cache_output = false;
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::AdapterOptions;

    fn call_args(backend: Option<&str>, no_output_cache: bool) -> CallArgs {
        CallArgs {
            callable: "sum".to_string(),
            args: vec![],
            backend: backend.map(str::to_string),
            no_output_cache,
        }
    }

    #[test]
    fn test_backend_override_drops_foreign_options() {
        let configured = CacheSettings {
            adapter: "fs".to_string(),
            options: AdapterOptions::new().with("cache_dir", "/tmp/calls"),
            cache_output: true,
        };

        let same = settings_for(&call_args(Some("fs"), false), configured.clone());
        assert!(!same.options.is_empty());

        let other = settings_for(&call_args(Some("memory"), true), configured);
        assert_eq!(other.adapter, "memory");
        assert!(other.options.is_empty());
        assert!(!other.cache_output);
    }
}
