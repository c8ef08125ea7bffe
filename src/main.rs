use clap::Parser;
use call_cache::cli::{self, Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Backends => cli::backends::run(),
        Command::Key(args) => cli::key::run(args),
        Command::Call(args) => cli::call::run(args),
        Command::Probe(args) => cli::probe::run(args),
    }
}
