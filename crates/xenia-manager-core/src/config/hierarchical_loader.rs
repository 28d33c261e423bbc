//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config (~/.xenia-manager/config.yaml)
//! 3. Environment variables (XENIA_MANAGER_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Name of the user configuration file inside the config directory
const USER_CONFIG_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader rooted at ~/.xenia-manager
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Get the standard config directory (~/.xenia-manager)
    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = crate::utils::get_home_dir()
            .map_err(|e| Error::invalid_config(e.to_string()))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {:?}", p)))?;

        Ok(home.join(".xenia-manager"))
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        let user_config_path = self.config_dir.join(USER_CONFIG_FILE);
        if user_config_path.exists() {
            debug!("Loading user config from {}", user_config_path);
            let file_config = self.load_yaml_file::<RuntimeConfig>(&user_config_path)?;
            config = Self::merge_runtime_config(config, file_config);
        }

        config = self.apply_env_overrides(config)?;
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Merge two runtime configs (base is overridden by overlay)
    fn merge_runtime_config(base: RuntimeConfig, overlay: RuntimeConfig) -> RuntimeConfig {
        let mut paths = overlay.paths;
        if paths.root.is_none() {
            paths.root = base.paths.root;
        }

        RuntimeConfig {
            network: overlay.network,
            github: overlay.github,
            product: overlay.product,
            paths,
            links: overlay.links,
        }
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("XENIA_MANAGER_ROOT") {
            config.paths.root = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("XENIA_MANAGER_GITHUB_API_URL") {
            config.github.api_url = val;
        }

        if let Ok(val) = env::var("XENIA_MANAGER_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("XENIA_MANAGER_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("XENIA_MANAGER_CONNECT_TIMEOUT_SECS") {
            config.network.connect_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("XENIA_MANAGER_CONNECT_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("XENIA_MANAGER_READ_TIMEOUT_SECS") {
            config.network.read_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("XENIA_MANAGER_READ_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("XENIA_MANAGER_DOWNLOAD_CHUNK_SIZE") {
            config.network.download_chunk_size = val.parse().map_err(|_| {
                Error::invalid_config("XENIA_MANAGER_DOWNLOAD_CHUNK_SIZE must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("XENIA_MANAGER_EXECUTABLE_SUBSTRING") {
            config.product.executable_substring = val;
        }

        Ok(config)
    }

    fn validate(config: &RuntimeConfig) -> Result<()> {
        if config.network.download_chunk_size == 0 {
            return Err(Error::invalid_config("download-chunk-size must be greater than 0"));
        }
        if config.product.executable_substring.trim().is_empty() {
            return Err(Error::invalid_config("executable-substring must not be empty"));
        }
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
