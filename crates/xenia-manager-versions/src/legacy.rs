//! Heuristic classification of executables installed outside `versions/`
//!
//! Files placed by hand (or by older releases of the manager) carry no
//! version information. These guesses go by file name only and can be wrong;
//! the registry is always consulted first.

use std::path::Path;

use crate::registry::InstallRegistry;
use crate::variant::Variant;

/// Tag assigned when nothing better is known
pub const LEGACY_TAG: &str = "Legacy Install";

/// Tag assigned to registered executables whose version was never recorded
pub const UNKNOWN_TAG: &str = "Unknown";

fn file_name_lower(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Variant an executable probably belongs to
pub fn guess_variant(path: &Path) -> Variant {
    let name = file_name_lower(path);
    if name.contains("dbexperiment") || name.contains("db-experiment") {
        Variant::CanaryDbExperiment
    } else if name.contains("netplay") {
        Variant::CanaryNetplay
    } else if name.contains("canary") {
        Variant::Canary
    } else {
        Variant::Stable
    }
}

/// Best guess at a legacy executable's version: the latest known canary or
/// stable tag, or [`LEGACY_TAG`]
pub fn guess_tag(path: &Path, registry: &InstallRegistry) -> String {
    let variant = if file_name_lower(path).contains("canary") {
        Variant::Canary
    } else {
        Variant::Stable
    };
    registry
        .latest_known(variant)
        .unwrap_or(LEGACY_TAG)
        .to_string()
}

/// Display name derived from the file name, with the tag appended when known
pub fn display_name(path: &Path, tag: Option<&str>) -> String {
    let label = guess_variant(path).label();
    match tag {
        Some(tag) if !tag.is_empty() => format!("{} {}", label, tag),
        _ => label.to_string(),
    }
}
