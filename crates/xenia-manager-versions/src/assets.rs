//! Asset selection

use tracing::debug;

use crate::error::{Error, Result};
use crate::releases::{Release, ReleaseAsset};
use crate::variant::{Packaging, Variant};

/// The asset chosen for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedAsset {
    pub name: String,
    pub download_url: String,
    /// Install by copying instead of extracting
    pub single_executable: bool,
    pub size: u64,
    pub digest: Option<String>,
}

impl SelectedAsset {
    fn from_asset(variant: Variant, asset: &ReleaseAsset) -> Self {
        Self {
            name: asset.name.clone(),
            download_url: asset.browser_download_url.clone(),
            single_executable: variant.packaging() == Packaging::SingleExecutable,
            size: asset.size,
            digest: asset.digest.clone(),
        }
    }
}

/// Pick the first asset, in feed order, matching the variant's predicate
pub fn select_asset(variant: Variant, tag: &str, assets: &[ReleaseAsset]) -> Result<SelectedAsset> {
    let predicate = variant.asset_predicate();
    let asset = assets
        .iter()
        .find(|asset| predicate.matches(&asset.name))
        .ok_or_else(|| Error::NoMatchingAsset {
            variant: variant.id().to_string(),
            tag: tag.to_string(),
        })?;

    debug!("Selected {} for {} (rule {})", asset.name, variant, predicate);
    Ok(SelectedAsset::from_asset(variant, asset))
}

/// [`select_asset`] over a release's asset list
pub fn select(variant: Variant, release: &Release) -> Result<SelectedAsset> {
    select_asset(variant, &release.tag_name, &release.assets)
}
