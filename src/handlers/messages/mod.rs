//! Message handlers module
//!
//! Resumes the stored continuation of a conversation, or starts a new one,
//! and stores whatever the handler asks to continue with next.

use std::sync::Arc;
use futures::future::BoxFuture;
use teloxide::{Bot, types::Message, prelude::*};
use tracing::{debug, error};
use crate::models::{ExecutionContext, HandlerResult, Input};
use crate::state::UserContextStorage;

/// Entry point run when a sender has no stored continuation
pub type StartHandler = Arc<dyn Fn(ExecutionContext, Input) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Run one turn of a conversation.
///
/// A response carrying a `next` continuation is stored under the sender key;
/// any other outcome clears the stored state.
pub async fn process_input(
    storage: &UserContextStorage,
    ctx: ExecutionContext,
    input: Input,
    start: &StartHandler,
) -> HandlerResult {
    let key = input.sender_key.clone();

    let response = match storage.get(&key).await? {
        Some(continuation) => {
            debug!(key = %key, func_identifier = continuation.func_identifier(), "Resuming conversation");
            continuation.call(ctx, input).await?
        }
        None => {
            debug!(key = %key, "Starting conversation");
            start(ctx, input).await?
        }
    };

    match response.as_ref().and_then(|response| response.next.as_ref()) {
        Some(next) => storage.set(&key, Some(next)).await?,
        None => storage.delete(&key).await?,
    }

    Ok(response)
}

/// Handle incoming text messages
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    storage: Arc<UserContextStorage>,
    start: StartHandler,
) -> anyhow::Result<()> {
    let input = Input::from_message(&msg);
    debug!(sender_key = %input.sender_key, chat_id = ?msg.chat.id, "Processing message");

    let response = match process_input(&storage, ExecutionContext::new(), input, &start).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, chat_id = ?msg.chat.id, "Failed to process message");
            bot.send_message(msg.chat.id, "Something went wrong, please start over with /cancel.").await?;
            return Err(e);
        }
    };

    if let Some(response) = response {
        if !response.content.is_empty() {
            bot.send_message(msg.chat.id, response.content).await?;
        }
    }

    Ok(())
}
