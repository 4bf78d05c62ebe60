//! Command handlers module
//!
//! Handles bot commands that bypass the stored conversation

pub mod help;

use teloxide::{Bot, types::Message, prelude::*};
use teloxide::utils::command::BotCommands;
use tracing::info;
use crate::models::Input;
use crate::state::UserContextStorage;
use crate::utils::errors::Result;

pub use help::handle_help;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "ContextBuddy Bot Commands")]
pub enum Command {
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Forget the current conversation")]
    Cancel,
}

/// Handle /cancel command
pub async fn handle_cancel(bot: Bot, msg: Message, storage: &UserContextStorage) -> Result<()> {
    let input = Input::from_message(&msg);
    storage.delete(&input.sender_key).await?;
    info!(sender_key = %input.sender_key, "Conversation cancelled");

    bot.send_message(msg.chat.id, "Okay, let's start over. Say anything to begin.").await?;
    Ok(())
}
