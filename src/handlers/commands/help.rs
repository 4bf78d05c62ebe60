//! Help command handler

use teloxide::{Bot, types::Message, prelude::*};
use crate::utils::errors::Result;

/// Handle /help command
pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    let help_text = "🤖 ContextBuddy Help\n\n\
        Just talk to me, I remember where we left off.\n\n\
        /help - Show this help message\n\
        /cancel - Forget the current conversation";

    bot.send_message(msg.chat.id, help_text).await?;
    Ok(())
}
