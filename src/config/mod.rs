//! Configuration management for gardenwatch
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.
//!
//! # Example
//!
//! ```toml
//! [api]
//! stock_url = "https://example.com/api/stock"
//! weather_url = "https://example.com/api/weather"
//!
//! [schedule]
//! fast_poll_secs = 20
//!
//! [relay]
//! invite_url = "https://discord.com/oauth2/authorize?client_id=..."
//! ```
//!
//! The bot token is read from `DISCORD_BOT_TOKEN` when the file leaves it
//! empty.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::notifications::DiscordConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream API configuration
    pub api: ApiConfig,

    /// Discord client configuration
    pub discord: DiscordConfig,

    /// Persisted file locations
    pub storage: StorageConfig,

    /// Driver periods
    pub schedule: ScheduleConfig,

    /// Relay behaviour
    pub relay: RelayConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics endpoint
    pub metrics: MetricsConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Stock endpoint (stock categories and announcements)
    pub stock_url: String,

    /// Weather endpoint
    pub weather_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Rate limit (requests per second)
    pub requests_per_second: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            stock_url: String::new(),
            weather_url: String::new(),
            request_timeout_secs: 10,
            requests_per_second: 2,
        }
    }
}

/// Persisted file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Category -> channel bindings
    pub channels_path: PathBuf,

    /// Baseline markers
    pub baseline_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            channels_path: PathBuf::from("channels.json"),
            baseline_path: PathBuf::from("last_state.json"),
        }
    }
}

/// Driver periods in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Weather + announcements
    pub fast_poll_secs: u64,

    /// Full sweep including all stock categories
    pub full_sweep_secs: u64,

    /// Tracked event refresh
    pub refresh_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            fast_poll_secs: 20,
            full_sweep_secs: 300,
            refresh_secs: 5,
        }
    }
}

impl ScheduleConfig {
    #[must_use]
    pub fn fast_poll_interval(&self) -> Duration {
        Duration::from_secs(self.fast_poll_secs)
    }

    #[must_use]
    pub fn full_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.full_sweep_secs)
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

/// Relay behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Invite link attached to every message as a button
    pub invite_url: Option<String>,

    /// Log messages instead of posting them
    pub dry_run: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

/// Metrics endpoint configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Address to serve `/metrics` on; disabled when absent
    pub listen_addr: Option<SocketAddr>,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a file
    ///
    /// An empty bot token is filled from `DISCORD_BOT_TOKEN`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        if config.discord.token.trim().is_empty() {
            if let Some(token) = env_string("DISCORD_BOT_TOKEN") {
                config.discord.token = token;
            }
        }

        Ok(config)
    }

    /// Load from `path` if given, else from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_string("GARDENWATCH_STOCK_URL") {
            self.api.stock_url = v;
        }
        if let Some(v) = env_string("GARDENWATCH_WEATHER_URL") {
            self.api.weather_url = v;
        }
        if let Some(v) = env_parse("GARDENWATCH_REQUEST_TIMEOUT") {
            self.api.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("GARDENWATCH_RATE_LIMIT") {
            self.api.requests_per_second = v;
        }

        if let Some(v) = env_string("DISCORD_BOT_TOKEN") {
            self.discord.token = v;
        }
        if let Some(v) = env_string("GARDENWATCH_DISCORD_API_BASE") {
            self.discord.api_base = v;
        }

        if let Some(v) = env_string("GARDENWATCH_CHANNELS_PATH") {
            self.storage.channels_path = PathBuf::from(v);
        }
        if let Some(v) = env_string("GARDENWATCH_BASELINE_PATH") {
            self.storage.baseline_path = PathBuf::from(v);
        }

        if let Some(v) = env_parse("GARDENWATCH_FAST_POLL_SECS") {
            self.schedule.fast_poll_secs = v;
        }
        if let Some(v) = env_parse("GARDENWATCH_FULL_SWEEP_SECS") {
            self.schedule.full_sweep_secs = v;
        }
        if let Some(v) = env_parse("GARDENWATCH_REFRESH_SECS") {
            self.schedule.refresh_secs = v;
        }

        if let Some(v) = env_string("GARDENWATCH_INVITE_URL") {
            self.relay.invite_url = Some(v);
        }

        if let Some(v) = env_string("GARDENWATCH_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env_string("GARDENWATCH_LOG_FORMAT") {
            self.logging.format = v;
        }

        if let Some(v) = env_parse("GARDENWATCH_METRICS_ADDR") {
            self.metrics.listen_addr = Some(v);
        }
    }

    /// Validate configuration values needed to run the relay
    pub fn validate(&self) -> Result<()> {
        if self.api.stock_url.trim().is_empty() {
            anyhow::bail!("api.stock_url must be set");
        }

        if self.api.weather_url.trim().is_empty() {
            anyhow::bail!("api.weather_url must be set");
        }

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("api.request_timeout_secs must be greater than 0");
        }

        if self.api.requests_per_second == 0 {
            anyhow::bail!("api.requests_per_second must be greater than 0");
        }

        if self.schedule.fast_poll_secs == 0
            || self.schedule.full_sweep_secs == 0
            || self.schedule.refresh_secs == 0
        {
            anyhow::bail!("schedule intervals must be greater than 0");
        }

        if self.discord.timeout_secs == 0 {
            anyhow::bail!("discord.timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Get upstream request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runnable() -> Config {
        let mut config = Config::default();
        config.api.stock_url = "http://localhost/stock".to_string();
        config.api.weather_url = "http://localhost/weather".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.schedule, ScheduleConfig::default());
        assert_eq!(config.schedule.fast_poll_interval(), Duration::from_secs(20));
        assert_eq!(config.schedule.full_sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.schedule.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.storage.baseline_path, PathBuf::from("last_state.json"));
        assert_eq!(config.storage.channels_path, PathBuf::from("channels.json"));
        assert!(config.metrics.listen_addr.is_none());
    }

    #[test]
    fn test_default_needs_urls() {
        assert!(Config::default().validate().is_err());
        assert!(runnable().validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = runnable();
        config.schedule.refresh_secs = 0;
        assert!(config.validate().is_err());

        let mut config = runnable();
        config.api.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [api]
            stock_url = "http://localhost/stock"
            weather_url = "http://localhost/weather"

            [schedule]
            fast_poll_secs = 30

            [metrics]
            listen_addr = "127.0.0.1:9100"
            "#,
        )
        .unwrap();

        assert_eq!(config.schedule.fast_poll_secs, 30);
        assert_eq!(config.schedule.refresh_secs, 5);
        assert_eq!(config.api.requests_per_second, 2);
        assert_eq!(config.discord.api_base, "https://discord.com/api/v10");
        assert_eq!(
            config.metrics.listen_addr,
            Some("127.0.0.1:9100".parse().unwrap())
        );
        assert!(config.validate().is_ok());
    }
}
