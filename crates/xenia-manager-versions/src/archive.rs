//! Archive extraction into an install directory

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tar::Archive;
use tracing::debug;

use crate::error::{Error, FsContext, Result};

/// Supported archive formats, detected from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Extract `archive` into `dest`, preserving relative paths
///
/// Entries that would land outside `dest` are rejected.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let kind = ArchiveKind::detect(archive)
        .ok_or_else(|| Error::extraction(archive, "unsupported archive format"))?;

    fs::create_dir_all(dest).fs_context("create install directory", dest)?;
    debug!("Extracting {:?} ({:?}) into {:?}", archive, kind, dest);

    match kind {
        ArchiveKind::Zip => extract_zip(archive, dest),
        ArchiveKind::TarGz => extract_tar_gz(archive, dest),
    }
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).fs_context("open archive", archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| Error::extraction(archive_path, e))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::extraction(archive_path, e))?;

        let relative = entry.enclosed_name().ok_or_else(|| {
            Error::extraction(
                archive_path,
                format!("entry escapes the install directory: {}", entry.name()),
            )
        })?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).fs_context("create directory", &out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).fs_context("create directory", parent)?;
        }
        let mut out = File::create(&out_path).fs_context("create file", &out_path)?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            // a failed read is a corrupt archive; a failed write is our disk
            if e.kind() == io::ErrorKind::InvalidData || e.kind() == io::ErrorKind::UnexpectedEof {
                Error::extraction(archive_path, e)
            } else {
                Error::filesystem("write file", &out_path, e)
            }
        })?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))
                .fs_context("set permissions", &out_path)?;
        }
    }

    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).fs_context("open archive", archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let entries = archive
        .entries()
        .map_err(|e| Error::extraction(archive_path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| Error::extraction(archive_path, e))?;
        // unpack_in refuses paths outside dest and returns false for them
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| Error::extraction(archive_path, e))?;
        if !unpacked {
            let name = entry
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            return Err(Error::extraction(
                archive_path,
                format!("entry escapes the install directory: {}", name),
            ));
        }
    }

    Ok(())
}
