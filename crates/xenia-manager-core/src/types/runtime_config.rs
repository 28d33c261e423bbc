//! Runtime configuration types for operational parameters
//!
//! These types control network behaviour, the release feed endpoint, the
//! product executable naming rule, and the managed-content layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Release feed settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Product executable naming rule
    #[serde(default)]
    pub product: ProductConfig,

    /// Managed-content layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Convenience link settings
    #[serde(default)]
    pub links: LinksConfig,
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Whole-request timeout for release feed queries, in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// TCP connect timeout, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle read timeout while streaming a download, in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Download chunk size in bytes
    #[serde(default = "default_chunk_size")]
    pub download_chunk_size: usize,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            download_chunk_size: default_chunk_size(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    60
}
fn default_connect_timeout() -> u64 {
    15
}
fn default_read_timeout() -> u64 {
    60
}
fn default_chunk_size() -> usize {
    64 * 1024
}
fn default_user_agent() -> String {
    format!(
        "xenia-manager/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Release feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Base URL of the releases API
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

/// Naming rule for installed product executables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProductConfig {
    /// Substring every product executable name contains (case-insensitive)
    #[serde(default = "default_executable_substring")]
    pub executable_substring: String,

    /// File extension of product executables, without the dot
    #[serde(default = "default_executable_extension")]
    pub executable_extension: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            executable_substring: default_executable_substring(),
            executable_extension: default_executable_extension(),
        }
    }
}

fn default_executable_substring() -> String {
    "xenia".to_string()
}
fn default_executable_extension() -> String {
    "exe".to_string()
}

/// Managed-content layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathsConfig {
    /// Managed-content root; the current directory when unset
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Directory under the root holding in-flight downloads
    #[serde(default = "default_temp_dir_name")]
    pub temp_dir_name: String,

    /// Name of the persisted state document under the root
    #[serde(default = "default_registry_file")]
    pub registry_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: None,
            temp_dir_name: default_temp_dir_name(),
            registry_file: default_registry_file(),
        }
    }
}

fn default_temp_dir_name() -> String {
    "temp".to_string()
}
fn default_registry_file() -> String {
    "dashboard_labels.json".to_string()
}

/// Convenience link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinksConfig {
    /// Suffix appended to a real file displaced by a new link
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            backup_suffix: default_backup_suffix(),
        }
    }
}

fn default_backup_suffix() -> String {
    ".backup".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.network.download_chunk_size, 65536);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.product.executable_substring, "xenia");
        assert_eq!(config.links.backup_suffix, ".backup");
        assert!(config.paths.root.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
network:
  download-chunk-size: 1024
product:
  executable-substring: "product"
"#;
        let config: RuntimeConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.network.download_chunk_size, 1024);
        assert_eq!(config.network.connect_timeout_secs, 15);
        assert_eq!(config.product.executable_substring, "product");
        assert_eq!(config.product.executable_extension, "exe");
        assert_eq!(config.paths.registry_file, "dashboard_labels.json");
    }
}
