//! Populating a version directory from a downloaded artifact
//!
//! The version directory is cleared before it is filled, so reinstalling the
//! same (variant, tag) yields the same contents as a fresh install. Failures
//! leave the partially populated directory in place.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::archive;
use crate::error::{Error, FsContext, Result};
use crate::executable::ExecutableRule;
use crate::layout::Layout;
use crate::links::{LinkManager, LinkOutcome};
use crate::lock::DirLock;
use crate::progress::{InstallObserver, Phase};
use crate::registry::InstallRegistry;
use crate::variant::Variant;

/// What an install produced
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub variant: Variant,
    pub tag: String,
    pub install_dir: PathBuf,
    pub executables: Vec<PathBuf>,
    /// Links that were created; failed links are only logged
    pub links: Vec<LinkOutcome>,
}

#[derive(Debug, Clone)]
pub struct Installer {
    layout: Layout,
    rule: ExecutableRule,
    links: LinkManager,
}

impl Installer {
    pub fn new(layout: Layout, rule: ExecutableRule, links: LinkManager) -> Self {
        Self {
            layout,
            rule,
            links,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Install `artifact` as `variant` at `tag`
    ///
    /// A single executable is copied under its own file name; anything else
    /// is extracted as an archive.
    pub fn install(
        &self,
        registry: &mut InstallRegistry,
        variant: Variant,
        tag: &str,
        artifact: &Path,
        single_executable: bool,
        observer: &dyn InstallObserver,
    ) -> Result<InstallOutcome> {
        let lock = DirLock::acquire(&self.layout.lock_path(variant, tag)?)?;
        self.install_locked(&lock, registry, variant, tag, artifact, single_executable, observer)
    }

    /// Same as [`Installer::install`] for a caller already holding the
    /// version directory's lock
    #[allow(clippy::too_many_arguments)]
    pub fn install_locked(
        &self,
        _lock: &DirLock,
        registry: &mut InstallRegistry,
        variant: Variant,
        tag: &str,
        artifact: &Path,
        single_executable: bool,
        observer: &dyn InstallObserver,
    ) -> Result<InstallOutcome> {
        let install_dir = self.layout.version_dir(variant, tag)?;

        observer.phase(Phase::Installing);
        clear_dir(&install_dir)?;

        if single_executable {
            let file_name = artifact.file_name().ok_or_else(|| {
                Error::filesystem(
                    "read file name of",
                    artifact,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
                )
            })?;
            let dest = install_dir.join(file_name);
            fs::copy(artifact, &dest).fs_context("copy executable", &dest)?;
        } else {
            archive::extract(artifact, &install_dir)?;
        }

        let executables = self.rule.find_in(&install_dir);
        if executables.is_empty() {
            return Err(Error::NoExecutables {
                dir: install_dir,
                pattern: self.rule.describe(),
            });
        }

        for exe in &executables {
            registry.record_install(exe, tag);
            registry.ensure_display_name(exe, || format!("{} {}", variant.label(), tag));
            observer.executable_installed(exe);
        }
        registry.save()?;

        observer.phase(Phase::Linking);
        let mut links = Vec::new();
        for exe in &executables {
            match self.links.link(exe) {
                Ok(outcome) => links.push(outcome),
                Err(e) => warn!("Could not link {:?}: {}", exe, e),
            }
        }

        info!(
            "Installed {} {} into {:?} ({} executables)",
            variant,
            tag,
            install_dir,
            executables.len()
        );

        Ok(InstallOutcome {
            variant,
            tag: tag.to_string(),
            install_dir,
            executables,
            links,
        })
    }
}

/// Remove every entry of `dir`, creating it when missing
fn clear_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir).fs_context("create install directory", dir);
    }

    for entry in fs::read_dir(dir).fs_context("read install directory", dir)? {
        let entry = entry.fs_context("read install directory", dir)?;
        let path = entry.path();
        let file_type = entry.file_type().fs_context("inspect", &path)?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path).fs_context("remove directory", &path)?;
        } else {
            fs::remove_file(&path).fs_context("remove file", &path)?;
        }
    }
    Ok(())
}
