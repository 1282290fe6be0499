//! Shortcodes CLI - shortcode compiler.
//!
//! Provides commands for:
//! - `compile`: Compile shortcodes in a file or stdin against a template directory
//! - `list`: List the tags a template directory provides

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CompileArgs, ListArgs};
use output::Output;

/// Shortcodes - WordPress-style shortcode compiler.
#[derive(Parser)]
#[command(name = "shortcodes", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile shortcodes and write the result to stdout.
    Compile(CompileArgs),
    /// List the tags provided by the template directory.
    List(ListArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Compile(args) => args.verbose,
        Commands::List(args) => args.verbose,
    };

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Compile(args) => args.execute(),
        Commands::List(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
