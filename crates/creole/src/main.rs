//! Creole CLI - wiki page exporter.
//!
//! Provides commands for:
//! - `export`: Render every page of a dump or directory into `Creole/` and `Html/`
//! - `render`: Render a single markup file to stdout

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExportArgs, RenderArgs};
use output::Output;

/// Creole - wiki markup to HTML exporter.
#[derive(Parser)]
#[command(name = "creole", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export all pages from a source to HTML files.
    Export(ExportArgs),
    /// Render one markup file to stdout.
    Render(RenderArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Export(args) => args.verbose,
        Commands::Render(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Export(args) => args.execute(),
        Commands::Render(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
