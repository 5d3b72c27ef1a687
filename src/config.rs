use serde::Deserialize;
use std::env::{self, VarError};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants;
use crate::error::{MonitorError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const FEED_URL_ENV: &str = "CCP_FEED_URL";

/// A UTC offset must stay strictly within one day
const MAX_TIME_OFFSET_MINUTES: i32 = 24 * 60 - 1;
const MIN_TIME_OFFSET_MINUTES: i32 = -MAX_TIME_OFFSET_MINUTES;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub normalize: NormalizeConfig,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Endpoint returning the `{ status, data }` envelope
    pub url: Option<String>,
    /// Local JSON export used instead of the endpoint
    pub path: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Offset applied when rendering `HH:mm`, in minutes east of UTC
    pub time_offset_minutes: i32,
}

/// Cut-off values used by the risk ranking, KPI summary and record table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub critical_risk_percent: f64,
    pub critical_compliance_percent: f64,
    pub caution_compliance_percent: f64,
    pub page_size: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            critical_risk_percent: constants::CRITICAL_RISK_PERCENT,
            critical_compliance_percent: constants::CRITICAL_COMPLIANCE_PERCENT,
            caution_compliance_percent: constants::CAUTION_COMPLIANCE_PERCENT,
            page_size: constants::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let mut config = if config_path.exists() {
            let config_content = fs::read_to_string(config_path).map_err(|e| {
                MonitorError::Config(format!("Failed to read config file '{}': {}", config_path.display(), e))
            })?;
            let config: Config = toml::from_str(&config_content)?;
            info!("Loaded configuration from {}", config_path.display());
            config
        } else {
            debug!("No config file at {}, using defaults", config_path.display());
            Config::default()
        };

        if let Some(url) = feed_url_override(env::var(FEED_URL_ENV))? {
            config.feed.url = Some(url);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if t.page_size == 0 {
            return Err(MonitorError::Config("thresholds.page_size must be at least 1".to_string()));
        }
        if t.critical_compliance_percent > t.caution_compliance_percent {
            return Err(MonitorError::Config(format!(
                "thresholds.critical_compliance_percent ({}) exceeds caution_compliance_percent ({})",
                t.critical_compliance_percent, t.caution_compliance_percent
            )));
        }
        if !(MIN_TIME_OFFSET_MINUTES..=MAX_TIME_OFFSET_MINUTES).contains(&self.normalize.time_offset_minutes) {
            return Err(MonitorError::Config(format!(
                "normalize.time_offset_minutes out of range: {}",
                self.normalize.time_offset_minutes
            )));
        }
        Ok(())
    }
}

/// Feed URL from the environment. Unset or blank means no override; a value
/// that is not valid unicode is an error.
fn feed_url_override(var: std::result::Result<String, VarError>) -> Result<Option<String>> {
    match var {
        Ok(url) if !url.trim().is_empty() => Ok(Some(url.trim().to_string())),
        Ok(_) | Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
