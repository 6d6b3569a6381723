//! mdguard CLI - Markdown renderer with safeguarded custom commands.
//!
//! Provides commands for:
//! - `render`: Render a markdown file to HTML
//! - `check`: Validate a markdown file without writing HTML

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, RenderArgs};
use output::Output;

/// mdguard - Markdown renderer with safeguarded custom commands.
#[derive(Parser)]
#[command(name = "mdguard", version, about)]
struct Cli {
    /// Enable verbose output (processing logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file to HTML.
    Render(RenderArgs),
    /// Report validation errors of a markdown file.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
