//! orgreg CLI: the `orgreg` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing();

    match cli.command {
        Commands::Check {
            registry,
            subnet,
            probe_concurrency,
            json,
        } => commands::check::run(commands::check::Args {
            registry,
            subnet,
            probe_concurrency,
            json,
        }),

        Commands::Generate {
            registry,
            output,
            json,
        } => commands::generate::run(registry, output, json),
    }
}
