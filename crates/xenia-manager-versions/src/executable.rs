//! Product executable naming rule
//!
//! An installed file counts as a product executable when its name contains the
//! product substring and carries the executable extension, both compared
//! case-insensitively.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;
use xenia_manager_core::types::ProductConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableRule {
    substring: String,
    extension: String,
}

impl ExecutableRule {
    pub fn new(substring: &str, extension: &str) -> Self {
        Self {
            substring: substring.to_lowercase(),
            extension: extension.trim_start_matches('.').to_lowercase(),
        }
    }

    pub fn from_config(config: &ProductConfig) -> Self {
        Self::new(&config.executable_substring, &config.executable_extension)
    }

    /// Check a path's file name against the rule
    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name = name.to_lowercase();
        name.contains(&self.substring) && name.ends_with(&format!(".{}", self.extension))
    }

    /// Recursively collect matching regular files under `dir`, sorted
    ///
    /// Unreadable entries are logged and skipped.
    pub fn find_in(&self, dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry under {:?}: {}", dir, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.matches(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();
        found
    }

    /// Glob-like description for messages
    pub fn describe(&self) -> String {
        format!("*{}*.{}", self.substring, self.extension)
    }
}

impl Default for ExecutableRule {
    fn default() -> Self {
        Self::from_config(&ProductConfig::default())
    }
}
