//! Data models module
//!
//! This module contains the data structures exchanged between the bot and
//! its continuations

pub mod bot;
pub mod input;
pub mod response;

// Re-export commonly used models
pub use bot::BotType;
pub use input::{Input, ExecutionContext};
pub use response::{CommandResponse, SerializableArgument, HandlerResult};
