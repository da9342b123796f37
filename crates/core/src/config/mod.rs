//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (VID_LOOKUP_*)
//! 2. TOML config file (if VID_LOOKUP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (VID_LOOKUP_*)
/// 2. TOML config file (if VID_LOOKUP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via VID_LOOKUP_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Socket address the HTTP server binds to.
    ///
    /// Set via VID_LOOKUP_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the parts catalog site.
    ///
    /// Set via VID_LOOKUP_CATALOG_BASE_URL environment variable.
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,

    /// Ceiling in milliseconds for the identifier-element wait during
    /// resolution.
    ///
    /// Set via VID_LOOKUP_RESOLVE_TIMEOUT_MS environment variable.
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,

    /// Ceiling in milliseconds for launching the headless browser.
    ///
    /// Set via VID_LOOKUP_LAUNCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_launch_timeout_ms")]
    pub launch_timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./vid_cache.db")
}

fn default_bind_addr() -> String {
    "0.0.0.0:8003".into()
}

fn default_catalog_base_url() -> String {
    "https://www.realoem.com".into()
}

fn default_resolve_timeout_ms() -> u64 {
    30_000
}

fn default_launch_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            catalog_base_url: default_catalog_base_url(),
            resolve_timeout_ms: default_resolve_timeout_ms(),
            launch_timeout_ms: default_launch_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Element-wait ceiling as a Duration for use with tokio.
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Browser launch ceiling as a Duration.
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `VID_LOOKUP_`
    /// 2. TOML file from `VID_LOOKUP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("VID_LOOKUP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("VID_LOOKUP_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
