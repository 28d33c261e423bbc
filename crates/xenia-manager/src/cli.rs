//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use xenia_manager_versions::Variant;

/// Xenia Manager - install and manage Xenia emulator builds
#[derive(Parser, Debug)]
#[command(name = "xenia-manager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Managed-content root (defaults to the configured root, then the current directory)
    #[arg(long, global = true, env = "XENIA_MANAGER_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and install a build
    Install(InstallArgs),

    /// Remove installed builds of a variant
    Uninstall(UninstallArgs),

    /// Remove one installed executable
    Remove(RemoveArgs),

    /// List releases published on a variant's feed
    Releases(ReleasesArgs),

    /// Show the changelog of a release
    Changelog(ChangelogArgs),

    /// Rescan the disk and rebuild the install registry
    Detect(DetectArgs),

    /// List installed executables grouped by version
    List(ListArgs),

    /// Show the known variants and their feeds
    Variants,
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    s.parse::<Variant>().map_err(|e| e.to_string())
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Variant to install (canary, stable, older-canary, canary-dbexperiment, canary-netplay)
    #[arg(value_parser = parse_variant)]
    pub variant: Variant,

    /// Release tag to install (default: latest)
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    #[arg(value_parser = parse_variant)]
    pub variant: Variant,

    /// Only remove this release tag (default: every installed version)
    #[arg(long)]
    pub version: Option<String>,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Path of the installed executable
    pub path: PathBuf,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ReleasesArgs {
    #[arg(value_parser = parse_variant)]
    pub variant: Variant,

    /// Maximum number of releases to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ChangelogArgs {
    #[arg(value_parser = parse_variant)]
    pub variant: Variant,

    /// Release tag
    pub tag: String,
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Directories to scan for hand-placed executables (default: the root)
    #[arg(long = "scan", value_name = "DIR")]
    pub scan: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
