use serde::{Deserialize, Serialize};
use std::path::Path;

use cookshelf_util::errors::{ShelfError, ShelfResult};

/// Registry configuration, usually loaded from `cookshelf.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL that object URLs are built from.
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

fn default_url() -> String {
    "http://localhost:4545".to_string()
}

impl RegistryConfig {
    /// Load the configuration from `path`, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> ShelfResult<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ShelfError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ShelfResult<Self> {
        toml::from_str(content).map_err(|e| ShelfError::Config {
            message: format!("Failed to parse registry config: {e}"),
        })
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// URL of a cookbook.
    pub fn package_url(&self, name: &str) -> String {
        format!("{}/cookbooks/{name}", self.base())
    }

    /// URL of one version of a cookbook.
    pub fn version_url(&self, name: &str, version: &str) -> String {
        format!("{}/cookbooks/{name}/{version}", self.base())
    }
}
