//! Bot handlers module
//!
//! This module contains the Telegram bot handlers organized by type:
//! - Command handlers for bot commands
//! - Message handlers resuming stored conversations
//! - The greeting conversation served by the bot binary

pub mod commands;
pub mod greeting;
pub mod messages;

// Re-export commonly used handler functions
pub use commands::{Command, handle_cancel, handle_help};
pub use greeting::{register_greeting, start_handler};
pub use messages::{handle_message, process_input, StartHandler};
