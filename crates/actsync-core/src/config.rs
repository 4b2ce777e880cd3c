//! Project configuration
//!
//! Read from `actsync.toml` at the project root. Every key is optional; a
//! missing file yields the defaults:
//!
//! ```toml
//! [output]
//! dir = "src/actions"
//!
//! [manifest]
//! path = "actsync.lock.json"
//!
//! [provider]
//! url_template = "https://github.com/{owner}/{repo}.git"
//! # cache_dir = "/custom/cache"
//! ```

use std::path::PathBuf;

use actsync_fs::{NormalizedPath, io, validate_relative_path};
use serde::{Deserialize, Serialize};

use crate::manifest::DEFAULT_MANIFEST_FILE;
use crate::{Error, Result};

/// Config file name at the project root.
pub const CONFIG_FILE: &str = "actsync.toml";

/// Default directory for generated bindings.
pub const DEFAULT_OUTPUT_DIR: &str = "src/actions";

/// Default clone URL pattern.
pub const DEFAULT_URL_TEMPLATE: &str = "https://github.com/{owner}/{repo}.git";

/// Complete project configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub manifest: ManifestConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Generated bindings directory, relative to the root.
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest location, relative to the root.
    pub path: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MANIFEST_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Clone URL with `{owner}` and `{repo}` placeholders.
    pub url_template: String,
    /// Where bare clones are cached. Defaults to `<user cache dir>/actsync`.
    pub cache_dir: Option<PathBuf>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            cache_dir: None,
        }
    }
}

impl ProviderConfig {
    /// Expand the URL template for `owner/repo`.
    pub fn repository_url(&self, owner: &str, repo: &str) -> String {
        self.url_template
            .replace("{owner}", owner)
            .replace("{repo}", repo)
    }

    /// The configured cache directory, else the platform default.
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("actsync")))
    }
}

impl Config {
    /// Load `actsync.toml` from `root`, falling back to defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file is not valid TOML, has unknown
    /// keys, or fails validation.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let Some(bytes) = io::read_optional(&path)? else {
            tracing::debug!(path = %path, "No config file, using defaults");
            return Ok(Self::default());
        };

        let fail = |message: String| Error::Config {
            path: path.to_native(),
            message,
        };
        let text = String::from_utf8(bytes).map_err(|e| fail(e.to_string()))?;
        let config: Config = toml::from_str(&text).map_err(|e| fail(e.to_string()))?;
        config.validate().map_err(fail)?;

        tracing::debug!(path = %path, "Loaded config");
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        // Empty means the project root itself.
        if !self.output.dir.is_empty() {
            validate_relative_path(&self.output.dir).map_err(|e| format!("output.dir: {e}"))?;
        }
        validate_relative_path(&self.manifest.path).map_err(|e| format!("manifest.path: {e}"))?;

        let template = &self.provider.url_template;
        if !template.contains("{owner}") || !template.contains("{repo}") {
            return Err(format!(
                "provider.url_template '{template}' must contain {{owner}} and {{repo}}"
            ));
        }
        Ok(())
    }

    /// Absolute manifest path under `root`.
    pub fn manifest_path(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(&self.manifest.path)
    }
}
