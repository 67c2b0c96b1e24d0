//! # Router Configuration
//!
//! Options that change how dispatch annotates a request. They can be built
//! in code, read from the environment, or loaded from YAML.
//!
//! ## Environment Variables
//!
//! ### `ROUTEMUX_USE_PATH_AS_NORMALIZED_URL`
//!
//! When `true` (or `1`/`yes`), the normalized URL written onto a matched
//! request is the mount prefix followed by the request path. Otherwise it is
//! the mount prefix followed by the matched rule's declaration, so every
//! request served by one rule shares a single normalized URL.
//!
//! Default: `false`
//!
//! ## YAML
//!
//! ```yaml
//! use_path_as_normalized_url: true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Use the request path instead of the rule declaration when building
    /// the normalized URL
    pub use_path_as_normalized_url: bool,
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let use_path_as_normalized_url = env::var("ROUTEMUX_USE_PATH_AS_NORMALIZED_URL")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        RouterConfig {
            use_path_as_normalized_url,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse router configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read router configuration {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
