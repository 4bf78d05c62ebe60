//! Error handling for ContextBuddy
//!
//! This module defines the error types returned by the continuation registry,
//! the envelope codec and the user context storage.

use thiserror::Error;

/// Main error type for continuation storage operations
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("no function is registered for bot type: {bot_type}")]
    UnknownBot { bot_type: String },

    #[error("malformed continuation envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("failed to decode argument for {func_identifier}: {source}")]
    ArgumentDecode {
        func_identifier: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("argument for {func_identifier} is not of the registered type {expected}")]
    ArgumentTypeMismatch {
        func_identifier: String,
        expected: &'static str,
    },

    #[error("invalid user context: {0}")]
    InvalidContinuation(String),

    #[error("backend {operation} failed for key {key:?}: {source}")]
    Backend {
        operation: &'static str,
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Errors reported by a key-value backend client
#[derive(Error, Debug)]
pub enum BackendError {
    /// The requested key does not exist. Callers translate this into "no state".
    #[error("key not found")]
    NotFound,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// Check if this is the "key absent" sentinel
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound)
    }
}

/// Result type alias for continuation storage operations
pub type Result<T> = std::result::Result<T, ContextError>;

/// Result type alias for backend client operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

impl ContextError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ContextError::UnknownBot { .. } => false,
            ContextError::MalformedEnvelope { .. } => false,
            ContextError::ArgumentDecode { .. } => false,
            ContextError::ArgumentTypeMismatch { .. } => false,
            ContextError::InvalidContinuation(_) => false,
            ContextError::Backend { source, .. } => !source.is_not_found(),
            ContextError::Serialization(_) => false,
            ContextError::Config(_) => false,
            ContextError::Redis(_) => true,
            ContextError::Telegram(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ContextError::UnknownBot { .. } => ErrorSeverity::Critical,
            ContextError::Config(_) => ErrorSeverity::Critical,
            ContextError::InvalidContinuation(_) => ErrorSeverity::Warning,
            ContextError::Backend { .. } => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
