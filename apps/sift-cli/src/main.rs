//! # sift-cli
//!
//! Command-line interface for sift authorization filters.
//!
//! - `sift compile`: compile a filter and print the store pipeline
//! - `sift query`: compile a filter and run it against JSON fixtures
//!
//! Logs go to stderr so stdout carries only JSON output.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// sift: compile authorization filters into document-store queries.
#[derive(Parser)]
#[command(name = "sift", version, about)]
struct Cli {
    /// Log compiled pipelines and store activity at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a filter and print the resulting pipeline.
    Compile(commands::compile::CompileArgs),
    /// Compile a filter and execute it against fixture collections.
    Query(commands::query::QueryArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("sift_filter={}", level).parse()?)
                .add_directive(format!("sift_store={}", level).parse()?)
                .add_directive(format!("sift_cli={}", level).parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match &cli.command {
        Commands::Compile(args) => commands::compile::execute(args),
        Commands::Query(args) => commands::query::execute(args),
    }
}
