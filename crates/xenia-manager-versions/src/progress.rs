//! Progress reporting and cancellation
//!
//! Components never render anything; they report through an
//! [`InstallObserver`] supplied by the caller and poll a [`CancelToken`]
//! between download chunks.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Snapshot of a running download
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadProgress {
    /// Bytes written to disk so far
    pub downloaded: u64,

    /// Total size when the server announced one
    pub total: Option<u64>,
}

impl DownloadProgress {
    pub fn new(downloaded: u64, total: Option<u64>) -> Self {
        Self { downloaded, total }
    }

    /// Percentage complete (0-100), `None` when the length is unknown
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(100.0),
            Some(total) => Some((self.downloaded as f64 / total as f64 * 100.0).min(100.0)),
            None => None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        self.total.is_none()
    }
}

/// Coarse stage of an install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolving,
    Downloading,
    Verifying,
    Installing,
    Linking,
    CleaningUp,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Resolving => "resolving release",
            Phase::Downloading => "downloading",
            Phase::Verifying => "verifying",
            Phase::Installing => "installing",
            Phase::Linking => "linking",
            Phase::CleaningUp => "cleaning up",
        };
        write!(f, "{}", name)
    }
}

/// Receives progress from a running install; may be called from a worker task
pub trait InstallObserver: Send + Sync {
    /// A new stage has started
    fn phase(&self, _phase: Phase) {}

    /// Called after every downloaded chunk
    fn download_progress(&self, _progress: &DownloadProgress) {}

    /// Download started for an asset
    fn download_started(&self, _asset: &str, _total: Option<u64>) {}

    /// Installation placed an executable on disk
    fn executable_installed(&self, _path: &Path) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl InstallObserver for NoopObserver {}

/// Observer that forwards events to tracing
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl InstallObserver for TracingObserver {
    fn phase(&self, phase: Phase) {
        info!("{}: {}", self.operation, phase);
    }

    fn download_progress(&self, progress: &DownloadProgress) {
        match progress.percent() {
            Some(percent) => debug!(
                "{}: {:.1}% ({} bytes)",
                self.operation, percent, progress.downloaded
            ),
            None => debug!("{}: {} bytes", self.operation, progress.downloaded),
        }
    }

    fn download_started(&self, asset: &str, total: Option<u64>) {
        info!("{}: fetching {} ({:?} bytes)", self.operation, asset, total);
    }

    fn executable_installed(&self, path: &Path) {
        info!("{}: installed {:?}", self.operation, path);
    }
}

/// Shared cancellation flag; clones observe the same flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
