//! Configuration loading for YatraNav

use crate::error::{NavError, Result};
use serde::Deserialize;
use setu_io::BridgeConfig;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct NavConfig {
    pub paths: PathsConfig,
    pub bridge: BridgeConfig,
    pub navigator: NavigatorConfig,
    pub scanner: ScannerConfig,
}

/// On-disk locations of persisted data
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding one JSON record per scanned map
    pub maps_dir: String,

    /// JSON file mapping destination labels to positions
    pub destinations_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            maps_dir: "data/maps".to_string(),
            destinations_file: "data/destinations.json".to_string(),
        }
    }
}

/// Route execution policy
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Retries for a single blocked move before giving up on it
    /// (transient blockers clear on their own; walls never do)
    pub step_retries: u32,

    /// Consecutive no-progress submissions before aborting with a stuck
    /// error
    pub stuck_threshold: u32,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            step_retries: 3,
            stuck_threshold: 3,
        }
    }
}

/// Live map scan limits
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Walkable tile budget; reaching it ends the scan with a partial map
    pub max_tiles: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { max_tiles: 4096 }
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NavError::Config(format!("Failed to read config file: {}", e)))?;
        let config: NavConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
