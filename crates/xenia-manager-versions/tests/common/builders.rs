//! Builders for release feed payloads
//!
//! The resolver only deserializes feed JSON, so fixtures are built as
//! `serde_json::Value` in the shape the releases API returns.

use serde_json::{json, Value};

use super::constants::*;

/// Builder for one release object
#[derive(Debug, Clone)]
pub struct ReleaseBuilder {
    tag_name: String,
    body: Option<String>,
    draft: bool,
    prerelease: bool,
    published_at: String,
    assets: Vec<Value>,
}

impl ReleaseBuilder {
    pub fn new() -> Self {
        Self {
            tag_name: TAG_V1_2_3.to_string(),
            body: None,
            draft: false,
            prerelease: false,
            published_at: "2024-05-01T12:00:00Z".to_string(),
            assets: Vec::new(),
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag_name = tag.to_string();
        self
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn draft(mut self) -> Self {
        self.draft = true;
        self
    }

    pub fn prerelease(mut self) -> Self {
        self.prerelease = true;
        self
    }

    pub fn published_at(mut self, date: &str) -> Self {
        self.published_at = date.to_string();
        self
    }

    /// Add an asset served from `base_url`
    pub fn asset(mut self, base_url: &str, name: &str, size: usize) -> Self {
        self.assets.push(AssetBuilder::new(name).served_from(base_url).size(size).build());
        self
    }

    pub fn asset_value(mut self, asset: Value) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn build(self) -> Value {
        json!({
            "tag_name": self.tag_name,
            "name": self.tag_name,
            "body": self.body,
            "draft": self.draft,
            "prerelease": self.prerelease,
            "published_at": self.published_at,
            "assets": self.assets,
        })
    }
}

impl Default for ReleaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one asset object
#[derive(Debug, Clone)]
pub struct AssetBuilder {
    name: String,
    url: String,
    size: usize,
    digest: Option<String>,
}

impl AssetBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("https://example.com{}", download_path(name)),
            size: 0,
            digest: None,
        }
    }

    pub fn served_from(mut self, base_url: &str) -> Self {
        self.url = format!("{}{}", base_url, download_path(&self.name));
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn digest(mut self, digest: &str) -> Self {
        self.digest = Some(digest.to_string());
        self
    }

    pub fn build(self) -> Value {
        json!({
            "name": self.name,
            "browser_download_url": self.url,
            "size": self.size,
            "digest": self.digest,
        })
    }
}
