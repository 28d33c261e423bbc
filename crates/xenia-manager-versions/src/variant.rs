//! Emulator build variants and their fixed feed coordinates
//!
//! Every variant maps to one release feed (owner, repository), a packaging
//! convention, an asset filename predicate and the `versions/<family>/`
//! directory its builds install into. The table is closed and checked once
//! at startup with [`Variant::validate_table`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A named emulator build flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    Canary,
    Stable,
    OlderCanary,
    CanaryDbExperiment,
    CanaryNetplay,
}

/// How a variant's builds are published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packaging {
    /// A zip (or tarball) to extract into the install directory
    Archive,
    /// A bare executable copied into the install directory as-is
    SingleExecutable,
}

impl fmt::Display for Packaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packaging::Archive => write!(f, "archive"),
            Packaging::SingleExecutable => write!(f, "single executable"),
        }
    }
}

/// Filename rule applied after the suffix check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    Prefix(&'static str),
    Contains(&'static str),
}

/// Asset filename predicate; all comparisons are case-insensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPredicate {
    pub suffix: &'static str,
    pub rule: NameRule,
}

impl AssetPredicate {
    /// Check an asset filename against this predicate
    pub fn matches(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        if !name.ends_with(self.suffix) {
            return false;
        }
        match self.rule {
            NameRule::Prefix(prefix) => name.starts_with(prefix),
            NameRule::Contains(needle) => name.contains(needle),
        }
    }
}

impl fmt::Display for AssetPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            NameRule::Prefix(prefix) => write!(f, "{}*{}", prefix, self.suffix),
            NameRule::Contains(needle) => write!(f, "*{}*{}", needle, self.suffix),
        }
    }
}

/// One row of the variant table
#[derive(Debug)]
pub struct VariantSpec {
    pub variant: Variant,
    /// Stable identifier, also the key of the "latest known tag" map
    pub id: &'static str,
    /// Accepted short names on the command line
    pub aliases: &'static [&'static str],
    pub owner: &'static str,
    pub repo: &'static str,
    /// Directory name under `versions/`
    pub family: &'static str,
    /// Human-facing name used for display names and grouping
    pub label: &'static str,
    pub packaging: Packaging,
    pub asset: AssetPredicate,
}

static VARIANTS: [VariantSpec; 5] = [
    VariantSpec {
        variant: Variant::Canary,
        id: "xenia-canary",
        aliases: &["canary"],
        owner: "xenia-canary",
        repo: "xenia-canary-releases",
        family: "canary",
        label: "Xenia Canary",
        packaging: Packaging::Archive,
        asset: AssetPredicate {
            suffix: ".zip",
            rule: NameRule::Prefix("xenia_canary_windows"),
        },
    },
    VariantSpec {
        variant: Variant::Stable,
        id: "xenia-stable",
        aliases: &["stable"],
        owner: "xenia-project",
        repo: "release-builds-windows",
        family: "stable",
        label: "Xenia",
        packaging: Packaging::Archive,
        asset: AssetPredicate {
            suffix: ".zip",
            rule: NameRule::Contains("xenia_master"),
        },
    },
    VariantSpec {
        variant: Variant::OlderCanary,
        id: "xenia-oldercanary",
        aliases: &["older-canary", "oldercanary"],
        owner: "xenia-canary",
        repo: "xenia-canary",
        family: "canary",
        label: "Xenia Canary",
        packaging: Packaging::Archive,
        asset: AssetPredicate {
            suffix: ".zip",
            rule: NameRule::Contains("xenia_canary"),
        },
    },
    VariantSpec {
        variant: Variant::CanaryDbExperiment,
        id: "xenia-canary-dbexperiment",
        aliases: &["canary-dbexperiment", "canary-experimental"],
        owner: "seven7000real",
        repo: "xenia-canary",
        family: "canary-dbexperiment",
        label: "Xenia Canary (db-experiment)",
        packaging: Packaging::SingleExecutable,
        asset: AssetPredicate {
            suffix: ".exe",
            rule: NameRule::Contains("xenia_canary"),
        },
    },
    VariantSpec {
        variant: Variant::CanaryNetplay,
        id: "xenia-canary-netplay",
        aliases: &["canary-netplay", "netplay"],
        owner: "AdrianCassar",
        repo: "xenia-canary",
        family: "canary-netplay",
        label: "Xenia Canary (netplay)",
        packaging: Packaging::Archive,
        asset: AssetPredicate {
            suffix: ".zip",
            rule: NameRule::Contains("xenia_canary_netplay_windows"),
        },
    },
];

impl Variant {
    /// All variants in table order
    pub const ALL: [Variant; 5] = [
        Variant::Canary,
        Variant::Stable,
        Variant::OlderCanary,
        Variant::CanaryDbExperiment,
        Variant::CanaryNetplay,
    ];

    /// Table row for this variant
    pub fn spec(self) -> &'static VariantSpec {
        &VARIANTS[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.spec().id
    }

    pub fn owner(self) -> &'static str {
        self.spec().owner
    }

    pub fn repo(self) -> &'static str {
        self.spec().repo
    }

    pub fn family(self) -> &'static str {
        self.spec().family
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn packaging(self) -> Packaging {
        self.spec().packaging
    }

    pub fn asset_predicate(self) -> AssetPredicate {
        self.spec().asset
    }

    /// Short command-line name
    pub fn short_name(self) -> &'static str {
        self.spec().aliases.first().copied().unwrap_or(self.spec().id)
    }

    /// First variant installing into the given family directory
    pub fn from_family(family: &str) -> Option<Variant> {
        Self::ALL.into_iter().find(|v| v.family() == family)
    }

    /// Families that have a directory under `versions/`, deduplicated
    pub fn families() -> Vec<&'static str> {
        let mut seen = HashSet::new();
        Self::ALL
            .into_iter()
            .map(Variant::family)
            .filter(|family| seen.insert(*family))
            .collect()
    }

    /// Check the static table for internal consistency
    pub fn validate_table() -> Result<()> {
        let mut ids = HashSet::new();
        for (index, spec) in VARIANTS.iter().enumerate() {
            let invalid = |reason: &str| Error::InvalidVariantTable {
                variant: spec.id.to_string(),
                reason: reason.to_string(),
            };

            if spec.variant as usize != index {
                return Err(invalid("row order does not match the enum"));
            }
            if spec.owner.is_empty() || spec.repo.is_empty() {
                return Err(invalid("feed owner and repository are required"));
            }
            if spec.family.is_empty() || spec.family.contains(['/', '\\']) {
                return Err(invalid("family must be a single path component"));
            }
            if !spec.asset.suffix.starts_with('.') {
                return Err(invalid("asset suffix must start with '.'"));
            }
            let is_exe = spec.asset.suffix == ".exe";
            if is_exe != (spec.packaging == Packaging::SingleExecutable) {
                return Err(invalid("asset suffix disagrees with packaging"));
            }
            let needle = match spec.asset.rule {
                NameRule::Prefix(s) | NameRule::Contains(s) => s,
            };
            if needle.is_empty() || needle.to_lowercase() != needle {
                return Err(invalid("asset name rule must be non-empty lowercase"));
            }
            if !ids.insert(spec.id) || spec.aliases.iter().any(|alias| !ids.insert(*alias)) {
                return Err(invalid("identifier or alias is not unique"));
            }
        }
        Ok(())
    }

    fn valid_names() -> String {
        Self::ALL
            .into_iter()
            .map(Variant::short_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.id() == wanted || v.spec().aliases.contains(&wanted.as_str()))
            .ok_or_else(|| Error::InvalidVariant {
                name: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}
