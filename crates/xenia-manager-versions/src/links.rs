//! Top-level convenience links to installed executables
//!
//! Each installed executable gets a symlink of the same name at the root of
//! the managed-content directory. A real file in the way is renamed aside
//! with the backup suffix, never overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, FsContext, Result};
use crate::layout::Layout;

/// What a link call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub link: PathBuf,
    pub target: PathBuf,
    /// Where a displaced real file was moved
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct LinkManager {
    layout: Layout,
    backup_suffix: String,
}

impl LinkManager {
    pub fn new(layout: Layout, backup_suffix: impl Into<String>) -> Self {
        Self {
            layout,
            backup_suffix: backup_suffix.into(),
        }
    }

    /// Top-level link path for an executable
    pub fn link_path_for(&self, executable: &Path) -> Option<PathBuf> {
        executable
            .file_name()
            .map(|name| self.layout.link_path(name))
    }

    /// Point the top-level link for `executable` at it
    pub fn link(&self, executable: &Path) -> Result<LinkOutcome> {
        let link = self.link_path_for(executable).ok_or_else(|| {
            Error::filesystem(
                "derive link name for",
                executable,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

        let mut backup = None;
        match fs::symlink_metadata(&link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                debug!("Replacing existing link {:?}", link);
                remove_link(&link)?;
            }
            Ok(_) => {
                let backup_path = self.free_backup_path(&link);
                info!("Moving existing file {:?} to {:?}", link, backup_path);
                fs::rename(&link, &backup_path).fs_context("back up", &link)?;
                backup = Some(backup_path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::filesystem("inspect", &link, e)),
        }

        create_symlink(executable, &link).fs_context("create link", &link)?;
        info!("Linked {:?} -> {:?}", link, executable);

        Ok(LinkOutcome {
            link,
            target: executable.to_path_buf(),
            backup,
        })
    }

    /// Remove the top-level link for `executable` if it still points there;
    /// returns whether a link was removed
    pub fn unlink_if_targets(&self, executable: &Path) -> Result<bool> {
        let Some(link) = self.link_path_for(executable) else {
            return Ok(false);
        };

        let meta = match fs::symlink_metadata(&link) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::filesystem("inspect", &link, e)),
        };
        if !meta.file_type().is_symlink() {
            return Ok(false);
        }

        let target = fs::read_link(&link).fs_context("read link", &link)?;
        let target = if target.is_relative() {
            link.parent().map(|p| p.join(&target)).unwrap_or(target)
        } else {
            target
        };
        if target != executable {
            return Ok(false);
        }

        remove_link(&link)?;
        debug!("Removed link {:?}", link);
        Ok(true)
    }

    /// `<name><suffix>`, then `<name><suffix>.1`, `.2`, ... whichever is free
    fn free_backup_path(&self, link: &Path) -> PathBuf {
        let mut base = link.as_os_str().to_owned();
        base.push(&self.backup_suffix);
        let candidate = PathBuf::from(&base);
        if fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }

        (1u32..)
            .map(|n| {
                let mut name = base.clone();
                name.push(format!(".{}", n));
                PathBuf::from(name)
            })
            .find(|path| fs::symlink_metadata(path).is_err())
            .unwrap_or(candidate)
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

fn remove_link(link: &Path) -> Result<()> {
    fs::remove_file(link).fs_context("remove link", link)
}
