//! Advisory lock serializing operations on one version directory

use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{FsContext, Result};

/// Exclusive lock held for the lifetime of the value
///
/// The lock file sits beside the version directory, so clearing the directory
/// never drops the lock. The lock is released on drop.
#[derive(Debug)]
pub struct DirLock {
    file: File,
    path: PathBuf,
}

impl DirLock {
    /// Block until the exclusive lock on `path` is acquired
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).fs_context("create lock directory", parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .fs_context("open lock file", path)?;

        debug!("Waiting for lock {:?}", path);
        file.lock_exclusive().fs_context("lock", path)?;
        debug!("Acquired lock {:?}", path);

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        // closing the handle releases the lock as well
        let _ = FileExt::unlock(&self.file);
    }
}
