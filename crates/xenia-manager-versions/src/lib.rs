//! Version and install management for Xenia emulator builds
//!
//! Provides:
//! - Release resolution against each variant's release feed
//! - Asset selection per variant packaging rule
//! - Streaming download with progress, cancellation and SHA256
//! - Installation into version-scoped directories with top-level links
//! - Persisted install registry, detection and uninstallation

pub mod archive;
pub mod assets;
pub mod detect;
pub mod download;
pub mod error;
pub mod executable;
pub mod installer;
pub mod layout;
pub mod legacy;
pub mod links;
pub mod lock;
pub mod manager;
pub mod progress;
pub mod registry;
pub mod releases;
pub mod uninstall;
pub mod variant;

pub use assets::{select, select_asset, SelectedAsset};
pub use detect::{detect_installed, group_installed, DetectReport, LEGACY_GROUP};
pub use download::{DownloadResult, Downloader};
pub use error::{Error, Result};
pub use executable::ExecutableRule;
pub use installer::{InstallOutcome, Installer};
pub use layout::Layout;
pub use links::{LinkManager, LinkOutcome};
pub use manager::VersionManager;
pub use progress::{CancelToken, DownloadProgress, InstallObserver, NoopObserver, Phase, TracingObserver};
pub use registry::InstallRegistry;
pub use releases::{Release, ReleaseAsset, ReleaseResolver};
pub use uninstall::{UninstallReport, Uninstaller};
pub use variant::{Packaging, Variant};
