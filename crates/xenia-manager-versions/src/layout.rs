//! Filesystem layout of the managed-content root
//!
//! ```text
//! <root>/
//!   dashboard_labels.json          persisted registry
//!   xenia_canary.exe -> versions/canary/v1.2.3/xenia_canary.exe
//!   temp/<variant-id>-<tag>/       in-flight downloads
//!   versions/<family>/<tag>/       one installed build
//!   versions/<family>/.<tag>.lock  advisory lock for that build
//! ```

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use xenia_manager_core::RuntimeConfig;

use crate::error::{Error, FsContext, Result};
use crate::executable::ExecutableRule;
use crate::variant::Variant;

const VERSIONS_DIR: &str = "versions";

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    temp_dir_name: String,
    registry_file: String,
}

impl Layout {
    /// Layout with default file names under `root`
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let defaults = RuntimeConfig::default();
        Self::with_names(
            root.as_ref(),
            &defaults.paths.temp_dir_name,
            &defaults.paths.registry_file,
        )
    }

    /// Layout from configuration; `root_override` (a CLI flag) wins over the
    /// configured root, which wins over the current directory
    pub fn from_config(config: &RuntimeConfig, root_override: Option<&Path>) -> Result<Self> {
        let root = match root_override.or(config.paths.root.as_deref()) {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().fs_context("read current directory", Path::new("."))?,
        };
        Self::with_names(&root, &config.paths.temp_dir_name, &config.paths.registry_file)
    }

    fn with_names(root: &Path, temp_dir_name: &str, registry_file: &str) -> Result<Self> {
        let root = std::path::absolute(root).fs_context("resolve root directory", root)?;
        Ok(Self {
            root,
            temp_dir_name: temp_dir_name.to_string(),
            registry_file: registry_file.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join(VERSIONS_DIR)
    }

    pub fn family_dir(&self, variant: Variant) -> PathBuf {
        self.versions_dir().join(variant.family())
    }

    /// Install directory for one (variant, tag) pair
    pub fn version_dir(&self, variant: Variant, tag: &str) -> Result<PathBuf> {
        validate_tag(tag)?;
        Ok(self.family_dir(variant).join(tag))
    }

    /// Lock file guarding a version directory; lives beside it so clearing
    /// the directory never removes the lock
    pub fn lock_path(&self, variant: Variant, tag: &str) -> Result<PathBuf> {
        validate_tag(tag)?;
        Ok(self.family_dir(variant).join(format!(".{}.lock", tag)))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(&self.temp_dir_name)
    }

    /// Per-download scratch directory
    pub fn download_dir(&self, variant: Variant, tag: &str) -> Result<PathBuf> {
        validate_tag(tag)?;
        Ok(self.temp_dir().join(format!("{}-{}", variant.id(), tag)))
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.registry_file)
    }

    /// Top-level convenience link for an executable file name
    pub fn link_path(&self, file_name: &OsStr) -> PathBuf {
        self.root.join(file_name)
    }

    /// Split a path under `versions/<family>/<tag>/` into (family, tag)
    pub fn version_of(&self, path: &Path) -> Option<(String, String)> {
        let rest = path.strip_prefix(self.versions_dir()).ok()?;
        let mut components = rest.components();
        let family = normal(components.next()?)?;
        let tag = normal(components.next()?)?;
        // the path must name something inside the tag directory
        components.next()?;
        Some((family, tag))
    }

    /// True when `dir` lies strictly inside the versions tree
    pub fn is_inside_versions(&self, dir: &Path) -> bool {
        dir.starts_with(self.versions_dir()) && dir != self.versions_dir()
    }

    /// A version counts as installed when its directory holds a product executable
    pub fn is_installed(&self, variant: Variant, tag: &str, rule: &ExecutableRule) -> bool {
        match self.version_dir(variant, tag) {
            Ok(dir) => dir.is_dir() && !rule.find_in(&dir).is_empty(),
            Err(_) => false,
        }
    }
}

fn normal(component: Component<'_>) -> Option<String> {
    match component {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// Tags are opaque but must be usable as a single directory name
pub fn validate_tag(tag: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidTag {
        tag: tag.to_string(),
        reason: reason.to_string(),
    };

    if tag.trim().is_empty() {
        return Err(invalid("tag is empty"));
    }
    if tag == "." || tag == ".." {
        return Err(invalid("tag is a relative path component"));
    }
    if tag.contains(['/', '\\', '\0']) {
        return Err(invalid("tag contains a path separator"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_version_dir_is_deterministic() {
        let layout = Layout::new("/srv/xenia").unwrap();
        assert_eq!(
            layout.version_dir(Variant::Canary, "v1.2.3").unwrap(),
            PathBuf::from("/srv/xenia/versions/canary/v1.2.3")
        );
        assert_eq!(
            layout.version_dir(Variant::OlderCanary, "v1.2.3").unwrap(),
            layout.version_dir(Variant::Canary, "v1.2.3").unwrap()
        );
        assert_eq!(
            layout.lock_path(Variant::Stable, "v1").unwrap(),
            PathBuf::from("/srv/xenia/versions/stable/.v1.lock")
        );
    }

    #[test]
    fn test_rejects_path_like_tags() {
        let layout = Layout::new("/srv/xenia").unwrap();
        assert!(layout.version_dir(Variant::Canary, "../escape").is_err());
        assert!(layout.version_dir(Variant::Canary, "..").is_err());
        assert!(layout.version_dir(Variant::Canary, "").is_err());
        assert!(layout.download_dir(Variant::Canary, "a\\b").is_err());
    }

    #[test]
    fn test_version_of() {
        let layout = Layout::new("/srv/xenia").unwrap();
        assert_eq!(
            layout.version_of(Path::new("/srv/xenia/versions/canary/v1/xenia_canary.exe")),
            Some(("canary".to_string(), "v1".to_string()))
        );
        assert_eq!(
            layout.version_of(Path::new("/srv/xenia/versions/canary/v1")),
            None
        );
        assert_eq!(layout.version_of(Path::new("/srv/xenia/xenia.exe")), None);
    }

    #[test]
    fn test_is_inside_versions() {
        let layout = Layout::new("/srv/xenia").unwrap();
        assert!(layout.is_inside_versions(Path::new("/srv/xenia/versions/canary/v1")));
        assert!(!layout.is_inside_versions(Path::new("/srv/xenia/versions")));
        assert!(!layout.is_inside_versions(Path::new("/srv/xenia")));
    }

    #[test]
    fn test_is_installed() {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path()).unwrap();
        let rule = ExecutableRule::default();
        let dir = layout.version_dir(Variant::Stable, "v1").unwrap();

        assert!(!layout.is_installed(Variant::Stable, "v1", &rule));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("README.md"), b"docs").unwrap();
        assert!(!layout.is_installed(Variant::Stable, "v1", &rule));
        fs::write(dir.join("xenia.exe"), b"MZ").unwrap();
        assert!(layout.is_installed(Variant::Stable, "v1", &rule));
    }

    #[test]
    fn test_from_config_prefers_override() {
        let mut config = RuntimeConfig::default();
        config.paths.root = Some(PathBuf::from("/configured"));

        let layout = Layout::from_config(&config, Some(Path::new("/flag"))).unwrap();
        assert_eq!(layout.root(), Path::new("/flag"));

        let layout = Layout::from_config(&config, None).unwrap();
        assert_eq!(layout.root(), Path::new("/configured"));
    }
}
