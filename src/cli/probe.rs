//! Probe command - resolves a backend and round-trips an entry through it

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use serde_json::{json, Value};
use tracing::info;

use crate::config::CacheSettings;
use crate::domain::cache::CacheEntry;
use crate::domain::storage::{Capabilities, StorageAdapter, StorageAdapterExt};
use crate::infrastructure::adapter::{builtin_registry, AdapterRegistry};
use crate::infrastructure::storage::AdapterOptions;

const PROBE_KEY: &str = "call-cache:probe";

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Backend name or alias
    pub backend: String,

    /// Backend option as `key=value`; the value is parsed as JSON when possible
    #[arg(long = "option", short = 'o', value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

/// Outcome of a probe
#[derive(Debug)]
pub struct ProbeReport {
    pub backend: String,
    pub capabilities: Capabilities,
    pub stored: bool,
    pub read_back: bool,
    pub removed: bool,
}

pub fn run(args: ProbeArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let registry = builtin_registry()?;

    let options = probe_options(&registry, &args, &config.cache)?;
    let report = probe(&registry, &args.backend, &options)?;

    println!("backend:      {}", report.backend);
    println!("capabilities: {}", serde_json::to_string(&report.capabilities)?);
    println!("stored:       {}", report.stored);
    println!("read back:    {}", report.read_back);
    println!("removed:      {}", report.removed);
    Ok(())
}

/// Options for the probed backend: the configured ones when it is the
/// configured backend, overridden by `--option` flags
fn probe_options(
    registry: &AdapterRegistry,
    args: &ProbeArgs,
    settings: &CacheSettings,
) -> anyhow::Result<AdapterOptions> {
    let mut options = match (
        registry.canonical_name(&args.backend),
        registry.canonical_name(&settings.adapter),
    ) {
        (Some(probed), Some(configured)) if probed == configured => settings.options.clone(),
        _ => AdapterOptions::new(),
    };

    for raw in &args.options {
        let (key, value) = raw
            .split_once('=')
            .with_context(|| format!("Invalid option '{}', expected KEY=VALUE", raw))?;
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        options = options.with(key, value);
    }

    Ok(options)
}

fn probe(
    registry: &AdapterRegistry,
    backend: &str,
    options: &AdapterOptions,
) -> anyhow::Result<ProbeReport> {
    let adapter: Arc<dyn StorageAdapter> = registry
        .build(backend, options)
        .with_context(|| format!("Cannot use backend '{}'", backend))?;

    let entry = CacheEntry::with_output(json!({"probe": true}), b"probe\n".to_vec());
    let stored = adapter.set_item(PROBE_KEY, &entry)?;
    let read_back = adapter.get_item::<CacheEntry>(PROBE_KEY)? == Some(entry);
    let removed = adapter.remove(PROBE_KEY)?;

    let canonical = registry.canonical_name(backend).unwrap_or(backend).to_string();
    info!(backend = %canonical, stored, read_back, removed, "Probed storage backend");

    Ok(ProbeReport {
        backend: canonical,
        capabilities: adapter.capabilities(),
        stored,
        read_back,
        removed,
    })
}
