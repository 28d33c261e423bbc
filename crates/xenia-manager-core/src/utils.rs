//! Shared utility functions

use anyhow::anyhow;
use std::path::PathBuf;

/// Get the user's home directory
///
/// The HOME environment variable wins over `dirs::home_dir()` so that
/// sandboxed or containerised runs can redirect the config directory.
pub fn get_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))
}
