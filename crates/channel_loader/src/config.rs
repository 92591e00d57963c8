//! Loader configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) yields
//! a working setup that reads the collection job's output from `./data`.
//! Environment variables override the file:
//!
//! | variable | effect |
//! |---|---|
//! | `CHANNEL_CONFIG` | path of the TOML file to load |
//! | `CHANNEL_DATA_BASE_URL` | fetch over HTTP from this base URL |
//! | `CHANNEL_DATA_DIR` | read from this directory instead |
//! | `CHANNEL_REFRESH_POLICY` | `preserve-last-good` or `replace-with-fallback` |

use crate::error::ConfigError;
use domain::{ChaosThresholds, Resource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub source: SourceConfig,
    pub paths: ResourcePaths,
    pub timeouts: TimeoutConfig,
    pub retry: RetryConfig,
    pub refresh: RefreshConfig,
    pub chaos: ChaosThresholds,
    /// JSON file replacing the built-in fallback table
    pub fallback_path: Option<PathBuf>,
}

/// Where the three JSON documents live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Http { base_url: String },
    Directory { root: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Directory {
            root: PathBuf::from("."),
        }
    }
}

/// Relative location of each resource under the source root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    pub stats: String,
    pub videos: String,
    pub shorts: String,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            stats: "data/youtube-stats.json".to_string(),
            videos: "data/youtube-videos.json".to_string(),
            shorts: "data/youtube-shorts.json".to_string(),
        }
    }
}

impl ResourcePaths {
    pub fn get(&self, resource: Resource) -> &str {
        match resource {
            Resource::Stats => &self.stats,
            Resource::Videos => &self.videos,
            Resource::Shorts => &self.shorts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub per_resource_ms: u64,
    pub overall_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            per_resource_ms: 3_000,
            overall_ms: 8_000,
        }
    }
}

impl TimeoutConfig {
    pub fn per_resource(&self) -> Duration {
        Duration::from_millis(self.per_resource_ms)
    }

    pub fn overall(&self) -> Duration {
        Duration::from_millis(self.overall_ms)
    }
}

/// Retries apply only when every resource failed and nothing was loaded before
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay_ms: 1_500,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub policy: RefreshPolicy,
    pub mode: RefreshMode,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 4 * 60 * 60,
            policy: RefreshPolicy::default(),
            mode: RefreshMode::default(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// What a refresh does with resources that fail after real data was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Keep the last good value of each failed resource
    #[default]
    PreserveLastGood,
    /// Substitute built-in fallback data, as on a first load
    ReplaceWithFallback,
}

impl FromStr for RefreshPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "preserve-last-good" => Ok(RefreshPolicy::PreserveLastGood),
            "replace-with-fallback" => Ok(RefreshPolicy::ReplaceWithFallback),
            other => Err(ConfigError::Invalid(format!(
                "unknown refresh policy '{other}'. Use 'preserve-last-good' or 'replace-with-fallback'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshMode {
    /// Reload everything on every tick
    #[default]
    Always,
    /// Reload only when the stats document reports a newer `lastUpdated`
    WhenStale,
}

impl LoaderConfig {
    /// Build the configuration from `CHANNEL_CONFIG` and the override
    /// variables, then validate it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoaderConfig::from_env`] with an injectable variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("CHANNEL_CONFIG") {
            Some(path) => load_from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(root) = lookup("CHANNEL_DATA_DIR") {
            self.source = SourceConfig::Directory {
                root: PathBuf::from(root),
            };
        }
        // A base URL wins over a directory when both are set.
        if let Some(base_url) = lookup("CHANNEL_DATA_BASE_URL") {
            self.source = SourceConfig::Http { base_url };
        }
        if let Some(policy) = lookup("CHANNEL_REFRESH_POLICY") {
            self.refresh.policy = policy.parse()?;
        }
        Ok(())
    }

    /// Check semantic constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.timeouts.per_resource_ms == 0 || self.timeouts.overall_ms == 0 {
            return invalid("timeouts must be greater than zero".to_string());
        }
        if self.timeouts.per_resource_ms > self.timeouts.overall_ms {
            return invalid(format!(
                "per-resource timeout ({}ms) exceeds the overall timeout ({}ms)",
                self.timeouts.per_resource_ms, self.timeouts.overall_ms
            ));
        }
        if self.refresh.enabled && self.refresh.interval_secs == 0 {
            return invalid("refresh interval must be greater than zero".to_string());
        }
        for resource in Resource::ALL {
            if self.paths.get(resource).trim().is_empty() {
                return invalid(format!("path for {resource} must not be empty"));
            }
        }
        if let SourceConfig::Http { base_url } = &self.source {
            if let Err(e) = reqwest::Url::parse(base_url) {
                return invalid(format!("invalid base_url '{base_url}': {e}"));
            }
        }
        let chaos = &self.chaos;
        if !(chaos.legendary >= chaos.viral && chaos.viral >= chaos.popular) {
            return invalid("chaos thresholds must satisfy legendary >= viral >= popular".to_string());
        }
        Ok(())
    }
}

/// Load and validate a [`LoaderConfig`] from a TOML file
pub fn load_from_file(path: &Path) -> Result<LoaderConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        file: path.display().to_string(),
        source: e,
    })?;

    load_from_str(&content, &path.display().to_string())
}

/// Load and validate a [`LoaderConfig`] from TOML text
pub fn load_from_str(content: &str, source_name: &str) -> Result<LoaderConfig, ConfigError> {
    let config: LoaderConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
        file: source_name.to_string(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}
