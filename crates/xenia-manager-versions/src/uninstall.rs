//! Removing installed versions
//!
//! Confirmation is the caller's job; these calls delete immediately. Only
//! directories inside `versions/` are ever removed. If a removal fails, the
//! registry is saved with the removals completed so far and the error is
//! returned.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, FsContext, Result};
use crate::layout::Layout;
use crate::links::LinkManager;
use crate::lock::DirLock;
use crate::registry::InstallRegistry;
use crate::variant::Variant;

/// What an uninstall did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallReport {
    /// Version directories deleted
    pub removed_dirs: Vec<PathBuf>,
    /// Registry keys dropped
    pub pruned: Vec<String>,
    /// Matching directories left alone because they lie outside `versions/`
    pub skipped: Vec<PathBuf>,
    /// Top-level links removed
    pub unlinked: Vec<PathBuf>,
}

impl UninstallReport {
    pub fn count_removed(&self) -> usize {
        self.removed_dirs.len()
    }
}

#[derive(Debug, Clone)]
pub struct Uninstaller {
    layout: Layout,
    links: LinkManager,
}

impl Uninstaller {
    pub fn new(layout: Layout, links: LinkManager) -> Self {
        Self { layout, links }
    }

    /// Remove one version, or every recorded version of `variant` when `tag`
    /// is `None`
    pub fn uninstall(
        &self,
        registry: &mut InstallRegistry,
        variant: Variant,
        tag: Option<&str>,
    ) -> Result<UninstallReport> {
        let mut report = UninstallReport::default();

        let targets = match tag {
            Some(tag) => vec![self.layout.version_dir(variant, tag)?],
            None => self.targets_for(registry, variant, &mut report),
        };
        debug!("Uninstall targets for {}: {:?}", variant, targets);

        for dir in targets {
            if let Err(e) = self.remove_version_dir(registry, &dir, &mut report) {
                registry.save()?;
                return Err(e);
            }
        }

        registry.save()?;
        info!(
            "Uninstalled {} director{} for {}",
            report.count_removed(),
            if report.count_removed() == 1 { "y" } else { "ies" },
            variant
        );
        Ok(report)
    }

    /// Remove a single registered executable
    ///
    /// A versioned executable takes its whole version directory with it; a
    /// legacy executable is deleted on its own.
    pub fn remove_executable(
        &self,
        registry: &mut InstallRegistry,
        path: &Path,
    ) -> Result<UninstallReport> {
        let mut report = UninstallReport::default();

        let result = match self.layout.version_of(path) {
            Some((family, tag)) => {
                let dir = self.layout.versions_dir().join(family).join(tag);
                self.remove_version_dir(registry, &dir, &mut report)
            }
            None => self.remove_legacy(registry, path, &mut report),
        };

        registry.save()?;
        result.map(|_| report)
    }

    /// Unique version directories owned by `variant` according to the registry
    fn targets_for(
        &self,
        registry: &InstallRegistry,
        variant: Variant,
        report: &mut UninstallReport,
    ) -> Vec<PathBuf> {
        let family_dir = self.layout.family_dir(variant);
        let mut targets = BTreeSet::new();
        let mut skipped = BTreeSet::new();

        for (key, recorded_tag) in registry.installed() {
            let path = Path::new(key);
            if !(path.starts_with(&family_dir) || tag_names_variant(recorded_tag, variant)) {
                continue;
            }

            match self.layout.version_of(path) {
                Some((family, tag)) => {
                    targets.insert(self.layout.versions_dir().join(family).join(tag));
                }
                None => {
                    if let Some(parent) = path.parent() {
                        skipped.insert(parent.to_path_buf());
                    }
                }
            }
        }

        for dir in skipped {
            warn!("Not removing {:?}: outside the versions directory", dir);
            report.skipped.push(dir);
        }
        targets.into_iter().collect()
    }

    fn remove_version_dir(
        &self,
        registry: &mut InstallRegistry,
        dir: &Path,
        report: &mut UninstallReport,
    ) -> Result<()> {
        if !self.layout.is_inside_versions(dir) {
            report.skipped.push(dir.to_path_buf());
            return Ok(());
        }

        let keys = registry.keys_under(dir);
        if let Err(e) = fs::symlink_metadata(dir) {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(Error::filesystem("inspect", dir, e));
            }
            debug!("{:?} does not exist", dir);
            self.unlink(&keys, report);
            self.prune(registry, keys, report);
            return Ok(());
        }

        // the lock file outlives the directory; deleting it would let a
        // waiting installer lock a different inode
        let _lock = match lock_path_for(dir) {
            Some(path) => Some(DirLock::acquire(&path)?),
            None => None,
        };

        self.unlink(&keys, report);

        match fs::remove_dir_all(dir) {
            Ok(()) => {
                info!("Removed {:?}", dir);
                report.removed_dirs.push(dir.to_path_buf());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{:?} already gone", dir);
            }
            Err(e) => return Err(Error::filesystem("remove directory", dir, e)),
        }

        self.prune(registry, keys, report);
        Ok(())
    }

    /// Remove top-level links still pointing at the given executables
    fn unlink(&self, keys: &[String], report: &mut UninstallReport) {
        for key in keys {
            let exe = Path::new(key);
            match self.links.unlink_if_targets(exe) {
                Ok(true) => report.unlinked.push(self.links.link_path_for(exe).unwrap_or_default()),
                Ok(false) => {}
                Err(e) => warn!("Could not remove link for {:?}: {}", exe, e),
            }
        }
    }

    fn prune(&self, registry: &mut InstallRegistry, keys: Vec<String>, report: &mut UninstallReport) {
        for key in keys {
            if registry.remove(&key) {
                report.pruned.push(key);
            }
        }
    }

    fn remove_legacy(
        &self,
        registry: &mut InstallRegistry,
        path: &Path,
        report: &mut UninstallReport,
    ) -> Result<()> {
        match fs::symlink_metadata(path) {
            Ok(_) => fs::remove_file(path).fs_context("remove executable", path)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::filesystem("inspect", path, e)),
        }

        let key = crate::registry::path_key(path);
        if registry.remove(&key) {
            report.pruned.push(key);
        }
        Ok(())
    }
}

/// `versions/<family>/<tag>` -> `versions/<family>/.<tag>.lock`
fn lock_path_for(dir: &Path) -> Option<PathBuf> {
    let tag = dir.file_name()?.to_string_lossy();
    Some(dir.with_file_name(format!(".{}.lock", tag)))
}

/// True when the variant id appears in `tag` as a whole token
fn tag_names_variant(tag: &str, variant: Variant) -> bool {
    tag.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .any(|token| token == variant.id())
}
