//! Configuration settings for hotspot-dash.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hotspot addresses to track, in display preference order.
    pub addresses: Vec<String>,
    /// Optional JSON address list (`{"addresses": [...]}`).
    pub address_file: Option<PathBuf>,
    /// API configuration.
    pub api: ApiConfig,
    /// Polling configuration.
    pub polling: PollingConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `path`, or from the config directory when
    /// `None`. Returns the default if the file doesn't exist.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(|| {
            super::config_dir()
                .map(|p| p.join("config.toml"))
                .unwrap_or_else(|_| PathBuf::from("config.toml"))
        });

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> crate::Result<()> {
        if self.polling.interval_secs == 0 {
            return Err(crate::Error::config("polling.interval_secs must be > 0"));
        }
        if self.api.timeout_secs == 0 {
            return Err(crate::Error::config("api.timeout_secs must be > 0"));
        }
        if self.api.rate_limit == 0 {
            return Err(crate::Error::config("api.rate_limit must be > 0"));
        }
        Ok(())
    }
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Helium API base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rate limit (requests per second) shared by all pollers.
    pub rate_limit: u32,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.helium.io".to_string(),
            timeout_secs: 10,
            rate_limit: 10,
            user_agent: concat!("hotspot-dash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How often metadata is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataCadence {
    /// Refresh on every polling cycle, like the reward metrics.
    #[default]
    Repeat,
    /// Stop after the first successful fetch.
    Once,
}

/// What a failed fetch does to the other pollers of the same address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Every poller keeps retrying on its own schedule.
    #[default]
    Independent,
    /// The first failure cancels all four pollers of that address.
    CancelAddress,
}

/// Polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between polls of one metric.
    pub interval_secs: u64,
    /// Metadata refresh cadence.
    pub metadata_cadence: MetadataCadence,
    /// Sibling cancellation policy.
    pub failure_policy: FailurePolicy,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            metadata_cadence: MetadataCadence::Repeat,
            failure_policy: FailurePolicy::Independent,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub filter: String,
    /// Also write a daily rolling log file under the data directory.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hotspot_dash=info".to_string(),
            file_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.helium.io");
        assert_eq!(config.polling.interval(), Duration::from_secs(60));
        assert_eq!(config.polling.failure_policy, FailurePolicy::Independent);
        assert_eq!(config.polling.metadata_cadence, MetadataCadence::Repeat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            addresses = ["addr1", "addr2"]

            [polling]
            interval_secs = 30
            failure_policy = "cancel_address"
            "#,
        )
        .unwrap();

        assert_eq!(config.addresses, vec!["addr1", "addr2"]);
        assert_eq!(config.polling.interval_secs, 30);
        assert_eq!(config.polling.failure_policy, FailurePolicy::CancelAddress);
        assert_eq!(config.polling.metadata_cadence, MetadataCadence::Repeat);
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = Config::from_toml("[polling]\ninterval_secs = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let result = Config::from_toml("[polling\n");
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }
}
