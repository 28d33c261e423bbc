//! Persisted install registry
//!
//! One JSON document holds three maps the subsystem owns plus whatever GUI
//! settings share the file:
//!
//! - `installed_emulators`: absolute executable path -> version tag
//! - `emulators`: absolute executable path -> display name
//! - `versions`: variant id -> latest tag seen on its feed
//!
//! The document is loaded once, mutated in memory and rewritten wholesale by
//! [`InstallRegistry::save`]. There is no file locking; a single writer
//! process is assumed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, FsContext, Result};
use crate::variant::Variant;

/// Serialized shape of the registry document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    #[serde(default)]
    pub installed_emulators: BTreeMap<String, String>,

    #[serde(default)]
    pub emulators: BTreeMap<String, String>,

    #[serde(default)]
    pub versions: BTreeMap<String, String>,

    /// Keys owned by other parts of the application, kept verbatim
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl RegistryState {
    /// Parse a document, accepting the legacy flat label map
    fn from_value(value: Value, path: &Path) -> Result<Self> {
        if let Value::Object(map) = &value {
            if !map.is_empty() && map.values().all(Value::is_string) {
                debug!("Upgrading flat label map in {:?}", path);
                let mut settings = Map::new();
                settings.insert("labels".to_string(), value);
                return Ok(Self {
                    settings,
                    ..Self::default()
                });
            }
        }

        serde_json::from_value(value).map_err(|source| Error::Registry {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Handle over the registry document and its on-disk location
#[derive(Debug, Clone)]
pub struct InstallRegistry {
    path: PathBuf,
    state: RegistryState,
}

/// Registry keys are absolute paths rendered as strings
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl InstallRegistry {
    /// Empty registry that will persist to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: RegistryState::default(),
        }
    }

    /// Load the registry; a missing file yields an empty registry
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            debug!("No registry at {:?}, starting empty", path);
            return Ok(Self::new(path));
        }

        let content = fs::read_to_string(&path).fs_context("read registry", &path)?;
        if content.trim().is_empty() {
            return Ok(Self::new(path));
        }

        let value: Value = serde_json::from_str(&content).map_err(|source| Error::Registry {
            path: path.clone(),
            source,
        })?;
        let state = RegistryState::from_value(value, &path)?;

        Ok(Self { path, state })
    }

    /// Rewrite the whole document, replacing the file atomically
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).fs_context("create registry directory", parent)?;
        }

        let json = serde_json::to_string_pretty(&self.state).map_err(|source| Error::Registry {
            path: self.path.clone(),
            source,
        })?;

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, json).fs_context("write registry", &temp_path)?;
        fs::rename(&temp_path, &self.path).fs_context("replace registry", &self.path)?;

        debug!("Registry saved to {:?}", self.path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    /// Record (or update) the version installed at `path`
    pub fn record_install(&mut self, path: &Path, tag: &str) {
        self.state
            .installed_emulators
            .insert(path_key(path), tag.to_string());
    }

    pub fn version_of(&self, path: &Path) -> Option<&str> {
        self.state
            .installed_emulators
            .get(&path_key(path))
            .map(String::as_str)
    }

    pub fn display_name(&self, path: &Path) -> Option<&str> {
        self.state.emulators.get(&path_key(path)).map(String::as_str)
    }

    pub fn set_display_name(&mut self, path: &Path, name: &str) {
        self.state.emulators.insert(path_key(path), name.to_string());
    }

    /// Set a display name only when the path has none; returns whether it was set
    pub fn ensure_display_name(&mut self, path: &Path, name: impl FnOnce() -> String) -> bool {
        let key = path_key(path);
        if self.state.emulators.contains_key(&key) {
            return false;
        }
        self.state.emulators.insert(key, name());
        true
    }

    /// Drop both entries for `key`; returns whether anything was removed
    pub fn remove(&mut self, key: &str) -> bool {
        let installed = self.state.installed_emulators.remove(key).is_some();
        let named = self.state.emulators.remove(key).is_some();
        installed || named
    }

    pub fn latest_known(&self, variant: Variant) -> Option<&str> {
        self.state.versions.get(variant.id()).map(String::as_str)
    }

    pub fn set_latest_known(&mut self, variant: Variant, tag: &str) {
        self.state
            .versions
            .insert(variant.id().to_string(), tag.to_string());
    }

    pub fn installed(&self) -> &BTreeMap<String, String> {
        &self.state.installed_emulators
    }

    pub fn emulators(&self) -> &BTreeMap<String, String> {
        &self.state.emulators
    }

    /// Replace the install map wholesale (used by detection)
    pub fn replace_installed(&mut self, installed: BTreeMap<String, String>) {
        self.state.installed_emulators = installed;
    }

    /// Keys of either map whose path lies under `dir`
    pub fn keys_under(&self, dir: &Path) -> Vec<String> {
        let mut keys: Vec<String> = self
            .state
            .installed_emulators
            .keys()
            .chain(self.state.emulators.keys())
            .filter(|key| Path::new(key.as_str()).starts_with(dir))
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Executable to launch by default: the first registered canary build,
    /// otherwise the first registered emulator
    pub fn preferred_emulator(&self) -> Option<PathBuf> {
        let is_canary = |key: &&String| {
            Path::new(key.as_str())
                .file_name()
                .map(|name| name.to_string_lossy().to_lowercase())
                .is_some_and(|name| name.contains("xenia") && name.contains("canary"))
        };

        self.state
            .emulators
            .keys()
            .find(is_canary)
            .or_else(|| self.state.emulators.keys().next())
            .map(PathBuf::from)
    }
}
