//! CLI command implementations

pub mod changelog;
pub mod detect;
pub mod install;
pub mod list;
pub mod releases;
pub mod remove;
pub mod uninstall;
pub mod variants;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;
use xenia_manager_core::{HierarchicalConfigLoader, RuntimeConfig};
use xenia_manager_versions::{InstallRegistry, VersionManager};

/// Load runtime configuration with the usual precedence
pub fn load_config() -> Result<RuntimeConfig> {
    let loader = HierarchicalConfigLoader::new().context("Failed to create config loader")?;
    loader
        .load_runtime_config()
        .context("Failed to load runtime config")
}

/// Build the version manager and load its registry
pub fn open(root: Option<&Path>) -> Result<(VersionManager, InstallRegistry)> {
    let config = load_config()?;
    let manager = VersionManager::from_config(&config, root)?;
    debug!("Managed-content root: {:?}", manager.layout().root());
    let registry = manager
        .load_registry()
        .with_context(|| format!("Failed to load {:?}", manager.layout().registry_path()))?;
    Ok((manager, registry))
}
