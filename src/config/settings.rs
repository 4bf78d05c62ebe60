//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::utils::helpers::ttl_seconds;

/// Default lifetime of a stored continuation
pub const DEFAULT_EXPIRES_IN_SECONDS: u64 = 5 * 60;

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    /// Namespace under which this bot's continuations are registered
    pub bot_type: String,
}

/// Which Redis deployment the storage talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedisMode {
    Single,
    Cluster,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub mode: RedisMode,
    /// Connection URL used in single-node mode
    pub url: String,
    /// Seed node URLs used in cluster mode
    #[serde(default)]
    pub cluster_nodes: Vec<String>,
}

/// Continuation storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// TTL applied on every store, in seconds. Zero disables expiry.
    pub expires_in_seconds: u64,
}

impl StorageConfig {
    /// Partial seconds round up, so a sub-second lifetime never becomes "no expiry"
    pub fn new(expires_in: Duration) -> Self {
        Self {
            expires_in_seconds: ttl_seconds(expires_in),
        }
    }

    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expires_in_seconds)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            expires_in_seconds: DEFAULT_EXPIRES_IN_SECONDS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily rolling log files; stdout only when absent
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    ///
    /// Environment variables use the `CONTEXTBUDDY` prefix and `__` as the
    /// section separator, e.g. `CONTEXTBUDDY__REDIS__URL`.
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = Settings::default();
        let settings = config::Config::builder()
            .set_default("bot.token", defaults.bot.token)?
            .set_default("bot.bot_type", defaults.bot.bot_type)?
            .set_default("redis.mode", "single")?
            .set_default("redis.url", defaults.redis.url)?
            .set_default("storage.expires_in_seconds", defaults.storage.expires_in_seconds)?
            .set_default("logging.level", defaults.logging.level)?
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("CONTEXTBUDDY")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("redis.cluster_nodes")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ContextError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                bot_type: "telegram".to_string(),
            },
            redis: RedisConfig {
                mode: RedisMode::Single,
                url: "redis://localhost:6379".to_string(),
                cluster_nodes: vec![],
            },
            storage: StorageConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
            },
        }
    }
}
