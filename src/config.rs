use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/**
 * Settings shared by a [`Catalog`](crate::Catalog) and everything it builds.
 * Missing fields take their default values when deserialized.
 */
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory prepended to every descriptor path.
    pub path_prefix: Option<String>,
    /// Protocol used for paths without a `protocol://` part.
    pub default_protocol: String,
    /// Report semantic names that have some but not all four orientations.
    pub warn_incomplete_variants: bool,
    /// Reject tilesets whose validation report holds warnings.
    pub deny_warnings: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path_prefix: None,
            default_protocol: String::from("file"),
            warn_incomplete_variants: true,
            deny_warnings: false,
        }
    }
}

impl CatalogConfig {

    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog config {}", path.display()))?;
        let config = Self::from_yaml(&source)
            .with_context(|| format!("Failed to parse catalog config {}", path.display()))?;
        Ok(config)
    }
}
