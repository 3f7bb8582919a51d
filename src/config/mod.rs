//! Configuration management module.
//!
//! Supports loading configuration from:
//! - TOML files (config/default.toml, config/{profile}.toml)
//! - Environment variables with `PIDMINTER__<SECTION>__<KEY>` pattern

mod server;
mod storage;

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::MintConfiguration;

pub use server::ServerConfig;
pub use storage::{FileStorageConfig, StorageBackend, StorageConfig};

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Minting configuration.
    #[serde(default)]
    pub minter: MinterConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. `config/default.toml`
    /// 2. `config/{PIDMINTER_PROFILE}.toml` (if `PIDMINTER_PROFILE` is set)
    /// 3. Environment variables with `PIDMINTER__` prefix
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let profile =
            std::env::var("PIDMINTER_PROFILE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            // PIDMINTER__MINTER__MAX_BATCH=500 -> minter.max_batch = 500
            .add_source(
                Environment::with_prefix("PIDMINTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port cannot be 0".to_string()));
        }

        self.storage.validate()?;
        self.minter.validate()?;

        Ok(())
    }
}

/// Minting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MinterConfig {
    /// Number of identifiers the prefetch cache is topped up to.
    #[serde(default = "default_prefetch_size")]
    pub prefetch_size: usize,

    /// Refill the cache when it holds fewer than this many identifiers.
    #[serde(default = "default_prefetch_threshold")]
    pub prefetch_threshold: usize,

    /// Largest amount a single mint request may ask for.
    #[serde(default = "default_max_batch")]
    pub max_batch: u64,

    /// Timeout of a single collision check, in milliseconds.
    #[serde(default = "default_gate_timeout_ms")]
    pub gate_timeout_ms: u64,

    /// Seed of the random source. Unset means seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Active configuration used until one is stored.
    #[serde(default)]
    pub defaults: MintConfiguration,
}

const fn default_prefetch_size() -> usize {
    100
}

const fn default_prefetch_threshold() -> usize {
    20
}

const fn default_max_batch() -> u64 {
    1000
}

const fn default_gate_timeout_ms() -> u64 {
    2000
}

impl MinterConfig {
    /// Collision check timeout.
    #[must_use]
    pub const fn gate_timeout(&self) -> Duration {
        Duration::from_millis(self.gate_timeout_ms)
    }

    /// Validate the minting configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is zero, the threshold exceeds the cache
    /// size, or the default mint configuration is malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch == 0 {
            return Err(ConfigError::Message(
                "minter.max_batch cannot be 0".to_string(),
            ));
        }

        if self.gate_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "minter.gate_timeout_ms cannot be 0".to_string(),
            ));
        }

        if self.prefetch_threshold > self.prefetch_size {
            return Err(ConfigError::Message(format!(
                "minter.prefetch_threshold ({}) cannot exceed minter.prefetch_size ({})",
                self.prefetch_threshold, self.prefetch_size
            )));
        }

        self.defaults
            .validate()
            .map_err(|e| ConfigError::Message(format!("minter.defaults: {e}")))
    }
}

impl Default for MinterConfig {
    fn default() -> Self {
        Self {
            prefetch_size: default_prefetch_size(),
            prefetch_threshold: default_prefetch_threshold(),
            max_batch: default_max_batch(),
            gate_timeout_ms: default_gate_timeout_ms(),
            seed: None,
            defaults: MintConfiguration::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Enable Prometheus metrics endpoint.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Metrics endpoint path.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

const fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_enabled: default_metrics_enabled(),
            metrics_path: default_metrics_path(),
        }
    }
}
