//! End-to-end install flow
//!
//! Resolve a release, select its asset, download it into the scratch area,
//! verify it, install it and clean the scratch area up again. Cleanup runs on
//! success and failure and never fails the operation.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use xenia_manager_core::RuntimeConfig;

use crate::assets::{self, SelectedAsset};
use crate::detect::{self, DetectReport};
use crate::download::{digest_matches, Downloader};
use crate::error::{Error, Result};
use crate::executable::ExecutableRule;
use crate::installer::{InstallOutcome, Installer};
use crate::layout::Layout;
use crate::links::LinkManager;
use crate::lock::DirLock;
use crate::progress::{CancelToken, InstallObserver, Phase};
use crate::registry::InstallRegistry;
use crate::releases::{Release, ReleaseResolver};
use crate::uninstall::{UninstallReport, Uninstaller};
use crate::variant::Variant;

/// Facade over the resolver, downloader, installer and uninstaller
pub struct VersionManager {
    layout: Layout,
    rule: ExecutableRule,
    resolver: ReleaseResolver,
    downloader: Downloader,
    installer: Installer,
    uninstaller: Uninstaller,
}

impl VersionManager {
    /// Build every component from runtime configuration
    pub fn from_config(config: &RuntimeConfig, root_override: Option<&Path>) -> Result<Self> {
        let layout = Layout::from_config(config, root_override)?;
        let rule = ExecutableRule::from_config(&config.product);
        let links = LinkManager::new(layout.clone(), config.links.backup_suffix.clone());

        Ok(Self {
            resolver: ReleaseResolver::from_config(&config.network, &config.github)?,
            downloader: Downloader::from_config(&config.network)?,
            installer: Installer::new(layout.clone(), rule.clone(), links.clone()),
            uninstaller: Uninstaller::new(layout.clone(), links),
            layout,
            rule,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn rule(&self) -> &ExecutableRule {
        &self.rule
    }

    pub fn resolver(&self) -> &ReleaseResolver {
        &self.resolver
    }

    /// Load the registry stored under the managed-content root
    pub fn load_registry(&self) -> Result<InstallRegistry> {
        InstallRegistry::load(self.layout.registry_path())
    }

    pub async fn releases(&self, variant: Variant, limit: usize) -> Result<Vec<Release>> {
        self.resolver.list(variant, limit).await
    }

    pub async fn release(&self, variant: Variant, tag: &str) -> Result<Release> {
        self.resolver.by_tag(variant, tag).await
    }

    pub fn is_installed(&self, variant: Variant, tag: &str) -> bool {
        self.layout.is_installed(variant, tag, &self.rule)
    }

    /// Install `variant` at `tag`, or at the feed's latest release
    ///
    /// `cancel` is honored during the download only.
    pub async fn install(
        &self,
        registry: &mut InstallRegistry,
        variant: Variant,
        tag: Option<&str>,
        observer: &dyn InstallObserver,
        cancel: &CancelToken,
    ) -> Result<InstallOutcome> {
        observer.phase(Phase::Resolving);
        let release = self.resolver.resolve(variant, tag, registry).await?;
        let asset = assets::select(variant, &release)?;
        let download_dir = self.layout.download_dir(variant, &release.tag_name)?;

        // held from download through cleanup: the scratch directory is shared
        // by every install of this (variant, tag)
        let lock = acquire_lock(self.layout.lock_path(variant, &release.tag_name)?).await?;

        let result = self
            .download_and_install(
                &lock,
                registry,
                variant,
                &release,
                &asset,
                &download_dir,
                observer,
                cancel,
            )
            .await;

        observer.phase(Phase::CleaningUp);
        if let Err(e) = fs::remove_dir_all(&download_dir) {
            debug!("Leaving {:?} behind: {}", download_dir, e);
        }

        drop(lock);
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn download_and_install(
        &self,
        lock: &DirLock,
        registry: &mut InstallRegistry,
        variant: Variant,
        release: &Release,
        asset: &SelectedAsset,
        download_dir: &Path,
        observer: &dyn InstallObserver,
        cancel: &CancelToken,
    ) -> Result<InstallOutcome> {
        let dest = download_dir.join(asset_file_name(asset)?);

        observer.phase(Phase::Downloading);
        observer.download_started(&asset.name, (asset.size > 0).then_some(asset.size));
        let download = self
            .downloader
            .download(
                &asset.download_url,
                &dest,
                |progress| observer.download_progress(progress),
                || cancel.is_cancelled(),
            )
            .await?;

        if let Some(digest) = &asset.digest {
            observer.phase(Phase::Verifying);
            if !digest_matches(digest, &download.checksum) {
                return Err(Error::ChecksumMismatch {
                    file: asset.name.clone(),
                    expected: digest.clone(),
                    actual: format!("sha256:{}", download.checksum),
                });
            }
            debug!("Checksum verified for {}", asset.name);
        }

        let outcome = self.installer.install_locked(
            lock,
            registry,
            variant,
            &release.tag_name,
            &download.file_path,
            asset.single_executable,
            observer,
        )?;

        info!("{} {} ready", variant, release.tag_name);
        Ok(outcome)
    }

    pub fn uninstall(
        &self,
        registry: &mut InstallRegistry,
        variant: Variant,
        tag: Option<&str>,
    ) -> Result<UninstallReport> {
        self.uninstaller.uninstall(registry, variant, tag)
    }

    pub fn remove_executable(
        &self,
        registry: &mut InstallRegistry,
        path: &Path,
    ) -> Result<UninstallReport> {
        self.uninstaller.remove_executable(registry, path)
    }

    pub fn detect(
        &self,
        registry: &mut InstallRegistry,
        scan_dirs: &[PathBuf],
    ) -> Result<DetectReport> {
        detect::detect_installed(&self.layout, &self.rule, registry, scan_dirs)
    }
}

/// Take a version directory lock without stalling the async runtime
async fn acquire_lock(path: PathBuf) -> Result<DirLock> {
    let join_path = path.clone();
    tokio::task::spawn_blocking(move || DirLock::acquire(&path))
        .await
        .map_err(|e| Error::filesystem("lock", join_path, std::io::Error::other(e)))?
}

/// Asset names come from the feed; only the final component is used
fn asset_file_name(asset: &SelectedAsset) -> Result<&std::ffi::OsStr> {
    Path::new(&asset.name)
        .file_name()
        .ok_or_else(|| Error::download(&asset.download_url, format!("unusable asset name '{}'", asset.name)))
}
