//! TOML configuration parsing.
//!
//! All settings have defaults, so an empty file (or no file at all, via
//! [`Config::minimal`]) yields a working client pointed at a local backend.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::models::SourceId;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_synopsis_cutoff")]
    pub synopsis_cutoff: usize,
    #[serde(default = "default_max_items_per_source")]
    pub max_items_per_source: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_scroll_threshold_px")]
    pub scroll_threshold_px: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            synopsis_cutoff: default_synopsis_cutoff(),
            max_items_per_source: default_max_items_per_source(),
            history_limit: default_history_limit(),
            scroll_threshold_px: default_scroll_threshold_px(),
        }
    }
}

fn default_synopsis_cutoff() -> usize {
    150
}
fn default_max_items_per_source() -> usize {
    10
}
fn default_history_limit() -> usize {
    5
}
fn default_scroll_threshold_px() -> f64 {
    100.0
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FilterConfig {
    #[serde(default)]
    pub hidden_sources: Vec<SourceId>,
}

impl Config {
    /// Defaults for every section; used when no config file is present.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.backend.base_url)
            .with_context(|| format!("backend.base_url is not a URL: {}", self.backend.base_url))?;
        match url.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!(
                "backend.base_url must use http or https, got '{}'",
                other
            ),
        }

        if self.backend.timeout_secs == 0 {
            anyhow::bail!("backend.timeout_secs must be > 0");
        }

        // Validate display
        if self.display.synopsis_cutoff == 0 {
            anyhow::bail!("display.synopsis_cutoff must be > 0");
        }
        if self.display.max_items_per_source == 0 {
            anyhow::bail!("display.max_items_per_source must be > 0");
        }
        if self.display.history_limit == 0 {
            anyhow::bail!("display.history_limit must be > 0");
        }
        let threshold = self.display.scroll_threshold_px;
        if threshold.is_nan() || threshold < 0.0 {
            anyhow::bail!("display.scroll_threshold_px must be >= 0");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
