//! Application configuration.

use crate::error::{AppError, AppResult};
use opsdash_client::RetryPolicy;
use opsdash_core::Resource;
use opsdash_notify::NotifierConfig;
use opsdash_push::{PushConfig, StaggerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-resource refresh intervals, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalsConfig {
    /// Bot status poll interval. Default: 15s.
    #[serde(default = "default_status_secs")]
    pub status_secs: u64,
    /// Positions table poll interval. Default: 5s.
    #[serde(default = "default_positions_secs")]
    pub positions_secs: u64,
    /// Signals table poll interval. Default: 10s.
    #[serde(default = "default_signals_secs")]
    pub signals_secs: u64,
    /// Account summary poll interval. Default: 10s.
    #[serde(default = "default_account_secs")]
    pub account_secs: u64,
    /// Log feed poll interval. Default: 30s.
    #[serde(default = "default_logs_secs")]
    pub logs_secs: u64,
    /// Excluded-coin list poll interval. Default: 60s.
    #[serde(default = "default_excluded_secs")]
    pub excluded_secs: u64,
}

fn default_status_secs() -> u64 {
    15
}

fn default_positions_secs() -> u64 {
    5
}

fn default_signals_secs() -> u64 {
    10
}

fn default_account_secs() -> u64 {
    10
}

fn default_logs_secs() -> u64 {
    30
}

fn default_excluded_secs() -> u64 {
    60
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            status_secs: default_status_secs(),
            positions_secs: default_positions_secs(),
            signals_secs: default_signals_secs(),
            account_secs: default_account_secs(),
            logs_secs: default_logs_secs(),
            excluded_secs: default_excluded_secs(),
        }
    }
}

impl IntervalsConfig {
    /// Refresh interval for one resource.
    pub fn interval(&self, resource: Resource) -> Duration {
        let secs = match resource {
            Resource::Status => self.status_secs,
            Resource::Positions => self.positions_secs,
            Resource::Signals => self.signals_secs,
            Resource::Account => self.account_secs,
            Resource::Logs => self.logs_secs,
            Resource::ExcludedCoins => self.excluded_secs,
        };
        Duration::from_secs(secs)
    }
}

/// Fetch retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per logical fetch. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts (ms). Default: 200.
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    200
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

/// Push transport configuration subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTransportConfig {
    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Base delay for reconnection backoff (ms).
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Maximum delay for reconnection backoff (ms).
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_reconnect_max_delay_ms() -> u64 {
    60000
}

impl Default for PushTransportConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
        }
    }
}

impl PushTransportConfig {
    pub fn to_push_config(&self, url: String) -> PushConfig {
        PushConfig {
            url,
            max_reconnect_attempts: self.max_reconnect_attempts,
            reconnect_base_delay_ms: self.reconnect_base_delay_ms,
            reconnect_max_delay_ms: self.reconnect_max_delay_ms,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend base URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Push channel WebSocket URL.
    #[serde(default = "default_push_url")]
    pub push_url: String,
    /// Per-resource poll intervals.
    #[serde(default)]
    pub intervals: IntervalsConfig,
    /// Fetch retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Disconnect alerting configuration.
    #[serde(default = "default_notifier")]
    pub notifier: NotifierConfig,
    /// Stagger offsets for the server's refresh-now broadcast.
    #[serde(default)]
    pub stagger: StaggerConfig,
    /// Resources re-read on each staggered pass, by stable key.
    #[serde(default = "default_refresh_resources")]
    pub refresh_resources: Vec<String>,
    /// Push transport configuration.
    #[serde(default)]
    pub push: PushTransportConfig,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_push_url() -> String {
    "ws://127.0.0.1:5000/stream".to_string()
}

fn default_notifier() -> NotifierConfig {
    NotifierConfig {
        // The account and log pollers log instead of alerting on first
        // failure; the table pollers alert.
        quiet_channels: ["account", "logs"].iter().map(|s| s.to_string()).collect(),
    }
}

fn default_refresh_resources() -> Vec<String> {
    vec![
        "status".to_string(),
        "positions".to_string(),
        "signals".to_string(),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            push_url: default_push_url(),
            intervals: IntervalsConfig::default(),
            retry: RetryConfig::default(),
            notifier: default_notifier(),
            stagger: StaggerConfig::default(),
            refresh_resources: default_refresh_resources(),
            push: PushTransportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("OPSDASH_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Resources triggered by each staggered refresh-now pass. Unknown keys
    /// are skipped with a warning.
    pub fn refresh_resources(&self) -> Vec<Resource> {
        self.refresh_resources
            .iter()
            .filter_map(|key| {
                let resource = Resource::from_key(key);
                if resource.is_none() {
                    tracing::warn!(key, "Unknown resource key in refresh_resources");
                }
                resource
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.intervals.positions_secs, 5);
        assert_eq!(config.intervals.account_secs, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.notifier.quiet_channels.contains("account"));
        assert!(config.notifier.quiet_channels.contains("logs"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            base_url = "http://10.0.0.2:5000"

            [intervals]
            positions_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.intervals.positions_secs, 2);
        assert_eq!(config.intervals.status_secs, 15);
        assert_eq!(config.retry.delay_ms, 200);
    }

    #[test]
    fn test_refresh_resources_skips_unknown_keys() {
        let mut config = AppConfig::default();
        config.refresh_resources = vec!["positions".to_string(), "nonsense".to_string()];
        assert_eq!(config.refresh_resources(), vec![Resource::Positions]);
    }

    #[test]
    fn test_interval_lookup() {
        let intervals = IntervalsConfig::default();
        assert_eq!(intervals.interval(Resource::Logs), Duration::from_secs(30));
        assert_eq!(
            intervals.interval(Resource::ExcludedCoins),
            Duration::from_secs(60)
        );
    }
}
