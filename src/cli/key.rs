//! Key command - prints the cache key for a callable and arguments

use clap::Args;

use crate::domain::cache::{CacheKey, DigestKeyGenerator, KeyGenerator};
use crate::domain::callable::ResolvedCallable;

use super::demo::demo_resolver;
use super::{parse_arguments, parse_callable};

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Function name, `Type::method`, or a JSON `[type, method]` pair
    pub callable: String,

    /// Arguments, each parsed as JSON (non-JSON text is taken as a string)
    pub args: Vec<String>,

    /// Namespace mixed into the callable half of the key
    #[arg(long)]
    pub namespace: Option<String>,
}

pub fn run(args: KeyArgs) -> anyhow::Result<()> {
    super::bootstrap();

    let key = generate(&args)?;
    println!("{}", key);
    Ok(())
}

fn generate(args: &KeyArgs) -> anyhow::Result<CacheKey> {
    let resolver = demo_resolver()?;
    let callable = parse_callable(&args.callable)?;
    let resolved = ResolvedCallable::resolve(resolver.as_ref(), &callable)?;

    let mut generator = DigestKeyGenerator::new();
    if let Some(namespace) = &args.namespace {
        generator = generator.with_namespace(namespace.clone());
    }

    Ok(generator.generate(resolved.identity(), &parse_arguments(&args.args)))
}
