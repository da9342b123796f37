//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::net::SocketAddr;

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `bind_addr` is not a valid socket address
    /// - `catalog_base_url` is empty or not http(s)
    /// - `resolve_timeout_ms` is less than 1s or exceeds 5 minutes
    /// - `launch_timeout_ms` is less than 1s or exceeds 2 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Invalid {
                field: "bind_addr".into(),
                reason: "must be a host:port socket address".into(),
            });
        }

        if !self.catalog_base_url.starts_with("http://") && !self.catalog_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "catalog_base_url".into(),
                reason: "must be an http(s) URL".into(),
            });
        }

        if self.resolve_timeout_ms < 1_000 {
            return Err(ConfigError::Invalid {
                field: "resolve_timeout_ms".into(),
                reason: "must be at least 1000ms".into(),
            });
        }
        if self.resolve_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "resolve_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.launch_timeout_ms < 1_000 {
            return Err(ConfigError::Invalid {
                field: "launch_timeout_ms".into(),
                reason: "must be at least 1000ms".into(),
            });
        }
        if self.launch_timeout_ms > 120_000 {
            return Err(ConfigError::Invalid {
                field: "launch_timeout_ms".into(),
                reason: "must not exceed 2 minutes (120000ms)".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_bind_addr() {
        let config = AppConfig { bind_addr: "not-an-addr".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "bind_addr"));
    }

    #[test]
    fn test_validate_bad_base_url() {
        let config = AppConfig { catalog_base_url: "ftp://example.com".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "catalog_base_url"));
    }

    #[test]
    fn test_validate_resolve_timeout_too_small() {
        let config = AppConfig { resolve_timeout_ms: 500, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "resolve_timeout_ms"));
    }

    #[test]
    fn test_validate_resolve_timeout_exceeds_limit() {
        let config = AppConfig { resolve_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "resolve_timeout_ms"));
    }

    #[test]
    fn test_validate_launch_timeout_bounds() {
        let config = AppConfig { launch_timeout_ms: 121_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "launch_timeout_ms"));

        let config = AppConfig { launch_timeout_ms: 1_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
