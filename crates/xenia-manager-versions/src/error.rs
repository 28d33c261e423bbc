//! Error types for the version/install subsystem

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using this crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the resolver, downloader, installer and uninstaller
#[derive(Error, Debug)]
pub enum Error {
    /// Requested release or tag is absent from the feed
    #[error("Release not found for {variant}: {detail}")]
    NotFound { variant: String, detail: String },

    /// Release has no asset matching the variant's packaging rule
    #[error("No asset in release {tag} matches the {variant} packaging rule")]
    NoMatchingAsset { variant: String, tag: String },

    /// Non-success HTTP status or transport failure
    #[error("Download failed for {url}: {message}")]
    Download { url: String, message: String },

    /// User-requested abort during the download phase
    #[error("Download cancelled after {bytes} bytes")]
    Cancelled { bytes: u64 },

    /// Downloaded artifact does not match the digest published by the feed
    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    /// Corrupt or unsupported archive
    #[error("Failed to extract {}: {message}", archive.display())]
    Extraction { archive: PathBuf, message: String },

    /// Install finished populating a directory without any product executable
    #[error("No '{pattern}' executables found in {}", dir.display())]
    NoExecutables { dir: PathBuf, pattern: String },

    /// Permission, space or path failure while touching the filesystem
    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Version tag that cannot name a directory
    #[error("Invalid version tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },

    /// Unknown variant identifier
    #[error("Unknown variant: {name}. Valid variants: {valid}")]
    InvalidVariant { name: String, valid: String },

    /// Variant table failed its startup validation
    #[error("Invalid variant table entry for {variant}: {reason}")]
    InvalidVariantTable { variant: String, reason: String },

    /// Persisted registry could not be parsed or serialized
    #[error("Registry error at {}: {source}", path.display())]
    Registry {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error from the core crate
    #[error(transparent)]
    Config(#[from] xenia_manager_core::Error),
}

impl Error {
    /// Create a not found error
    pub fn not_found(variant: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotFound {
            variant: variant.into(),
            detail: detail.into(),
        }
    }

    /// Create a download error
    pub fn download(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error
    pub fn extraction(archive: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Extraction {
            archive: archive.into(),
            message: message.to_string(),
        }
    }

    /// Create a filesystem error
    pub fn filesystem(action: impl Into<String>, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            action: action.into(),
            path: path.into(),
            source,
        }
    }

    /// True when the failure was a user-requested cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Attach the failing action and path to an `io::Result`
pub trait FsContext<T> {
    fn fs_context(self, action: &str, path: &Path) -> Result<T>;
}

impl<T> FsContext<T> for io::Result<T> {
    fn fs_context(self, action: &str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::filesystem(action, path, source))
    }
}
