//! Backends command - lists registered storage backends

use crate::infrastructure::adapter::{builtin_registry, AdapterRegistry};

/// Print every registered backend
pub fn run() -> anyhow::Result<()> {
    super::bootstrap();

    let registry = builtin_registry()?;
    print!("{}", render(&registry));
    Ok(())
}

fn render(registry: &AdapterRegistry) -> String {
    let mut out = format!("{:<12} {:<8} {}\n", "BACKEND", "SHARED", "ALIASES");

    for definition in registry.definitions() {
        out.push_str(&format!(
            "{:<12} {:<8} {}\n",
            definition.name(),
            if definition.is_shared() { "yes" } else { "no" },
            definition.aliases().join(", ")
        ));
    }

    out
}
