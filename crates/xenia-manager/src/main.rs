//! Xenia Manager CLI - install and manage Xenia emulator builds
//!
//! This is the main entry point for the xenia-manager command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use xenia_manager_versions::Variant;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    Variant::validate_table()?;

    let root = cli.root.as_deref();
    match cli.command {
        Commands::Install(args) => commands::install::run(args, root).await,
        Commands::Uninstall(args) => commands::uninstall::run(args, root),
        Commands::Remove(args) => commands::remove::run(args, root),
        Commands::Releases(args) => commands::releases::run(args, root).await,
        Commands::Changelog(args) => commands::changelog::run(args, root).await,
        Commands::Detect(args) => commands::detect::run(args, root),
        Commands::List(args) => commands::list::run(args, root),
        Commands::Variants => commands::variants::run(),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
