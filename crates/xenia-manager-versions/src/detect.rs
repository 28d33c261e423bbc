//! Rebuilding the install map from what is on disk

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;
use crate::executable::ExecutableRule;
use crate::layout::Layout;
use crate::legacy::{self, UNKNOWN_TAG};
use crate::registry::{path_key, InstallRegistry};
use crate::variant::Variant;

/// Group label for executables outside `versions/`
pub const LEGACY_GROUP: &str = "Legacy Installations";

/// Result of a detection pass
#[derive(Debug, Clone, Default)]
pub struct DetectReport {
    /// Executables found in this pass, path -> tag
    pub detected: BTreeMap<String, String>,
    /// Legacy executables that received a display name
    pub named: Vec<PathBuf>,
}

/// Scan the versions tree and `scan_dirs` (the root when empty) for product
/// executables, merge the result over the registry's install map and save
///
/// Versioned executables take their tag from the directory name. A legacy
/// symlink into the versions tree inherits the target's tag; other legacy
/// executables keep their recorded tag or get a heuristic one. Registered
/// emulators that still exist but were not found keep their recorded tag or
/// become "Unknown".
pub fn detect_installed(
    layout: &Layout,
    rule: &ExecutableRule,
    registry: &mut InstallRegistry,
    scan_dirs: &[PathBuf],
) -> Result<DetectReport> {
    let mut report = DetectReport::default();
    let found = &mut report.detected;

    for family in Variant::families() {
        let family_dir = layout.versions_dir().join(family);
        let Ok(entries) = fs::read_dir(&family_dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let tag_dir = entry.path();
            if !tag_dir.is_dir() {
                continue;
            }
            let tag = entry.file_name().to_string_lossy().into_owned();
            for exe in rule.find_in(&tag_dir) {
                found.insert(path_key(&exe), tag.clone());
            }
        }
    }

    let default_dirs = [layout.root().to_path_buf()];
    let scan_dirs = if scan_dirs.is_empty() {
        &default_dirs[..]
    } else {
        scan_dirs
    };

    for dir in scan_dirs {
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.clone());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to scan {:?}: {}", dir, e);
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| {
                entry
                    .file_type()
                    .map(|t| t.is_file() || t.is_symlink())
                    .unwrap_or(false)
            })
            .map(|entry| entry.path())
            .filter(|path| rule.matches(path))
            .collect();
        paths.sort();

        for path in paths {
            let key = path_key(&path);
            if found.contains_key(&key) {
                continue;
            }

            let inherited = link_target(&path).and_then(|t| found.get(&path_key(&t)).cloned());
            if let Some(tag) = inherited {
                debug!("{:?} links to a versioned install ({})", path, tag);
                found.insert(key, tag);
                continue;
            }

            let tag = registry
                .version_of(&path)
                .map(str::to_string)
                .unwrap_or_else(|| legacy::guess_tag(&path, registry));
            if registry.ensure_display_name(&path, || legacy::display_name(&path, Some(&tag))) {
                report.named.push(path.clone());
            }
            found.insert(key, tag);
        }
    }

    let registered: Vec<String> = registry.emulators().keys().cloned().collect();
    for key in registered {
        if found.contains_key(&key) || !Path::new(&key).exists() {
            continue;
        }
        let tag = registry
            .installed()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_TAG.to_string());
        found.insert(key, tag);
    }

    let mut merged = registry.installed().clone();
    merged.extend(found.iter().map(|(k, v)| (k.clone(), v.clone())));
    registry.replace_installed(merged);
    registry.save()?;

    debug!("Detected {} executables", report.detected.len());
    Ok(report)
}

/// Absolute target of a symlink, `None` for anything else
fn link_target(path: &Path) -> Option<PathBuf> {
    let target = fs::read_link(path).ok()?;
    if target.is_absolute() {
        Some(target)
    } else {
        path.parent().map(|parent| parent.join(target))
    }
}

/// Group installed executables for display
///
/// Symlinks are skipped since their targets are listed. Versioned executables
/// group as "<variant label> <tag>", everything else under
/// [`LEGACY_GROUP`]. Paths within a group are sorted.
pub fn group_installed(
    layout: &Layout,
    installed: &BTreeMap<String, String>,
) -> BTreeMap<String, Vec<PathBuf>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for (key, tag) in installed {
        let path = PathBuf::from(key);
        if fs::symlink_metadata(&path)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false)
        {
            continue;
        }

        let group = match layout.version_of(&path) {
            Some((family, _)) => {
                let label = Variant::from_family(&family)
                    .map(Variant::label)
                    .unwrap_or(family.as_str());
                format!("{} {}", label, tag)
            }
            None => LEGACY_GROUP.to_string(),
        };
        groups.entry(group).or_default().push(path);
    }

    for paths in groups.values_mut() {
        paths.sort();
    }
    groups
}
