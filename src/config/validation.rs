//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ContextError, Result};
use super::{RedisMode, Settings};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_redis_config(&settings.redis)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(ContextError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.bot_type.is_empty() {
        return Err(ContextError::Config(
            "Bot type is required".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
pub(crate) fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    match config.mode {
        RedisMode::Single if config.url.is_empty() => Err(ContextError::Config(
            "Redis URL is required in single mode".to_string()
        )),
        RedisMode::Cluster if config.cluster_nodes.is_empty() => Err(ContextError::Config(
            "At least one cluster node is required in cluster mode".to_string()
        )),
        _ => Ok(()),
    }
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ContextError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ContextError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
