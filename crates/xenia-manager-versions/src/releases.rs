//! Release feed queries
//!
//! Every variant is backed by one GitHub-style releases feed. Lookups are
//! never cached; the only state kept between runs is the "latest known tag"
//! recorded in the [`InstallRegistry`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use xenia_manager_core::types::{GitHubConfig, NetworkConfig};

use crate::error::{Error, Result};
use crate::registry::InstallRegistry;
use crate::variant::Variant;

/// Release information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag, treated as an opaque identifier
    pub tag_name: String,

    /// Release name
    #[serde(default)]
    pub name: Option<String>,

    /// Release body (changelog)
    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub prerelease: bool,

    #[serde(default)]
    pub draft: bool,

    /// Release assets in feed order
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,

    /// Published date
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl Release {
    /// Changelog text, empty when the feed has none
    pub fn changelog(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// Release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset file name
    pub name: String,

    /// Download URL
    pub browser_download_url: String,

    /// Asset size in bytes
    #[serde(default)]
    pub size: u64,

    /// Published digest, e.g. `sha256:<hex>`
    #[serde(default)]
    pub digest: Option<String>,
}

/// Resolves variants and tags to releases
pub struct ReleaseResolver {
    client: reqwest::Client,
    api_url: String,
}

impl ReleaseResolver {
    /// Create a resolver from network and feed configuration
    pub fn from_config(network: &NetworkConfig, github: &GitHubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .connect_timeout(Duration::from_secs(network.connect_timeout_secs))
            .timeout(Duration::from_secs(network.http_timeout_secs))
            .build()
            .map_err(|e| Error::download(&github.api_url, e))?;

        Ok(Self {
            client,
            api_url: github.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Point the resolver at a different API base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn repo_url(&self, variant: Variant) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_url,
            variant.owner(),
            variant.repo()
        )
    }

    /// Tags may contain characters such as `#` or `%`; they are sent as one
    /// encoded path segment
    fn tag_url(&self, variant: Variant, tag: &str) -> Result<String> {
        let base = self.repo_url(variant);
        let mut url = reqwest::Url::parse(&base).map_err(|e| Error::download(&base, e))?;
        url.path_segments_mut()
            .map_err(|_| Error::download(&base, "feed URL cannot carry a path"))?
            .pop_if_empty()
            .push("tags")
            .push(tag);
        Ok(url.into())
    }

    /// Fetch the feed's latest release
    pub async fn latest(&self, variant: Variant) -> Result<Release> {
        let url = format!("{}/latest", self.repo_url(variant));
        self.fetch(variant, &url, "latest release").await
    }

    /// Fetch the release whose tag matches exactly
    pub async fn by_tag(&self, variant: Variant, tag: &str) -> Result<Release> {
        let url = self.tag_url(variant, tag)?;
        let release: Release = self.fetch(variant, &url, &format!("tag {}", tag)).await?;

        if release.tag_name != tag {
            return Err(Error::not_found(
                variant.id(),
                format!("feed answered tag {} for {}", release.tag_name, tag),
            ));
        }
        Ok(release)
    }

    /// Resolve a release; without an explicit tag the latest release is used
    /// and its tag is recorded (and persisted) as the variant's latest known tag
    pub async fn resolve(
        &self,
        variant: Variant,
        tag: Option<&str>,
        registry: &mut InstallRegistry,
    ) -> Result<Release> {
        match tag {
            Some(tag) => self.by_tag(variant, tag).await,
            None => {
                let release = self.latest(variant).await?;
                info!("Latest {} release is {}", variant, release.tag_name);
                registry.set_latest_known(variant, &release.tag_name);
                registry.save()?;
                Ok(release)
            }
        }
    }

    /// List releases latest-first, drafts filtered out
    pub async fn list(&self, variant: Variant, limit: usize) -> Result<Vec<Release>> {
        let url = format!("{}?per_page={}", self.repo_url(variant), limit.clamp(1, 100));
        let mut releases: Vec<Release> = self.fetch(variant, &url, "release list").await?;
        releases.retain(|r| !r.draft);
        releases.truncate(limit);
        Ok(releases)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        variant: Variant,
        url: &str,
        what: &str,
    ) -> Result<T> {
        debug!("Fetching {} for {} from: {}", what, variant, url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| Error::download(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::not_found(
                variant.id(),
                format!("{} returned {}", what, status),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::download(url, format!("invalid feed response: {}", e)))
    }
}
