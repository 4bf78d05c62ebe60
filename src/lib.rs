//! ContextBuddy
//!
//! Redis-backed conversation continuations for Telegram bots. A handler that
//! wants to hear the user's next message registers itself under an
//! identifier at startup; at runtime only that identifier and a JSON argument
//! are stored, with a TTL, and turned back into a callable continuation when
//! the next message arrives.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ContextError, Result};

// Re-export main components for easy access
pub use models::{BotType, CommandResponse, ExecutionContext, Input, SerializableArgument};
pub use services::KeyValueClient;
pub use state::{ContextualFunc, ContinuationRegistry, UserContextStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
