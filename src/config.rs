//! Configuration Management
//!
//! Optional persistent settings for aws-inventory. Every field can be left
//! out; command-line flags take precedence over the file.

use crate::aws::regions::ANCHOR_REGION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Region used for identity verification and as the region-listing fallback
    #[serde(default)]
    pub default_region: Option<String>,
    /// Region the region directory is queried in
    #[serde(default)]
    pub anchor_region: Option<String>,
    /// Directory the workbook is written to
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aws-inventory").join("config.json"))
    }

    /// Load configuration from the user config directory
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or malformed file gives defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            },
        }
    }

    /// Get effective default region (CLI > config); the SDK chain applies after this
    pub fn effective_default_region(&self, cli: Option<&str>) -> Option<String> {
        cli.map(|s| s.to_string())
            .or_else(|| self.default_region.clone())
    }

    /// Get effective anchor region (config > built-in)
    pub fn effective_anchor_region(&self) -> String {
        self.anchor_region
            .clone()
            .unwrap_or_else(|| ANCHOR_REGION.to_string())
    }

    /// Get effective output directory (CLI > config > current directory)
    pub fn effective_output_dir(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
