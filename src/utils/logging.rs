//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for continuation storage events.

use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{ContextError, Result};

/// Initialize logging based on configuration
///
/// When a log directory is configured, a daily rolling file layer is added next
/// to stdout. The returned guard must be kept alive for the file writer to flush.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match config.file_path.as_deref() {
        Some(dir) if !dir.is_empty() => {
            let file_appender = tracing_appender::rolling::daily(dir, "contextbuddy.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .try_init()
        .map_err(|e| ContextError::Config(format!("failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Continuation lifecycle events worth a structured log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationEvent {
    Stored,
    Resumed,
    Missing,
    Deleted,
    Flushed,
}

impl ContinuationEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContinuationEvent::Stored => "stored",
            ContinuationEvent::Resumed => "resumed",
            ContinuationEvent::Missing => "missing",
            ContinuationEvent::Deleted => "deleted",
            ContinuationEvent::Flushed => "flushed",
        }
    }
}

/// Log a continuation lifecycle event with structured data
pub fn log_continuation_event(
    event: ContinuationEvent,
    bot_type: &str,
    key: Option<&str>,
    func_identifier: Option<&str>,
) {
    match event {
        ContinuationEvent::Flushed => warn!(
            event = event.as_str(),
            bot_type = bot_type,
            "All stored continuations flushed"
        ),
        _ => debug!(
            event = event.as_str(),
            bot_type = bot_type,
            key = key,
            func_identifier = func_identifier,
            "Continuation event"
        ),
    }
}
