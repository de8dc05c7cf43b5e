//! FX engine configuration.

use ratewatch_common::time::constants;
use std::time::Duration;

use crate::endpoint::SourceEndpoints;

/// Main engine configuration.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Rate source endpoints.
    pub endpoints: SourceEndpoints,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Default history window in days.
    pub window_days: u32,
    /// Day fetches allowed in flight while building a series.
    pub max_concurrency: usize,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            endpoints: SourceEndpoints::default(),
            request_timeout: constants::default_request_timeout(),
            user_agent: concat!("ratewatch/", env!("CARGO_PKG_VERSION")).to_string(),
            window_days: constants::DEFAULT_WINDOW_DAYS,
            max_concurrency: 1,
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RATEWATCH_PRIMARY_URL") {
            config.endpoints.primary = url;
        }

        if let Ok(url) = std::env::var("RATEWATCH_FALLBACK_URL") {
            config.endpoints.fallback = url;
        }

        if let Ok(secs) = std::env::var("RATEWATCH_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(days) = std::env::var("RATEWATCH_WINDOW_DAYS") {
            if let Ok(days) = days.parse() {
                config.window_days = days;
            }
        }

        if let Ok(limit) = std::env::var("RATEWATCH_MAX_CONCURRENCY") {
            if let Ok(limit) = limit.parse() {
                config.max_concurrency = limit;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.endpoints.validate()?;

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        if self.window_days == 0 {
            return Err("History window cannot be zero days".to_string());
        }

        if self.window_days > constants::MAX_WINDOW_DAYS {
            return Err(format!(
                "History window cannot exceed {} days",
                constants::MAX_WINDOW_DAYS
            ));
        }

        if self.max_concurrency == 0 {
            return Err("Max concurrency cannot be zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_days, 30);
        assert_eq!(config.max_concurrency, 1);
        assert!(config.user_agent.starts_with("ratewatch/"));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = FxConfig::default();
        config.window_days = 0;
        assert!(config.validate().is_err());

        let mut config = FxConfig::default();
        config.window_days = 100_000_000;
        assert!(config.validate().is_err());

        let mut config = FxConfig::default();
        config.window_days = constants::MAX_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        let mut config = FxConfig::default();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = FxConfig::default();
        config.max_concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = FxConfig::default();
        config.endpoints.fallback = "https://mirror.test/rates.json".to_string();
        assert!(config.validate().is_err());
    }
}
