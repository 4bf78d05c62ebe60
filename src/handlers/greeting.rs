//! Greeting conversation
//!
//! A short three-turn flow used by the bot binary: ask for a name, ask for a
//! favourite dance, then say goodbye. Each step suspends on a registered
//! continuation so the flow survives restarts.

use std::sync::Arc;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use crate::models::{BotType, CommandResponse, ExecutionContext, HandlerResult, Input, SerializableArgument};
use crate::state::ContinuationRegistry;
use super::messages::StartHandler;

pub const RECEIVE_NAME: &str = "greeting.receive_name";
pub const RECEIVE_DANCE: &str = "greeting.receive_dance";

/// State carried between greeting steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreetingState {
    pub name: String,
    pub attempts: u32,
}

/// Register every greeting step for `bot_type`
pub fn register_greeting(registry: &mut ContinuationRegistry, bot_type: &BotType) {
    registry.register(bot_type.clone(), RECEIVE_NAME, receive_name);
    registry.register(bot_type.clone(), RECEIVE_DANCE, receive_dance);
}

/// Start handler opening the greeting flow
pub fn start_handler() -> StartHandler {
    Arc::new(|ctx: ExecutionContext, input: Input| start_greeting(ctx, input).boxed())
}

async fn start_greeting(_ctx: ExecutionContext, _input: Input) -> HandlerResult {
    let next = SerializableArgument::new(RECEIVE_NAME, &GreetingState::default())?;
    Ok(Some(CommandResponse::text("Hi! What's your name?").with_next(next)))
}

async fn receive_name(ctx: ExecutionContext, input: Input, state: Arc<GreetingState>) -> HandlerResult {
    if ctx.is_cancelled() {
        anyhow::bail!("greeting cancelled before the name was handled");
    }

    let name = input.message.trim();
    if name.is_empty() {
        let retry = GreetingState {
            attempts: state.attempts + 1,
            ..(*state).clone()
        };
        let next = SerializableArgument::new(RECEIVE_NAME, &retry)?;
        return Ok(Some(CommandResponse::text("I didn't catch that. What's your name?").with_next(next)));
    }

    let next = SerializableArgument::new(
        RECEIVE_DANCE,
        &GreetingState {
            name: name.to_string(),
            attempts: 0,
        },
    )?;
    Ok(Some(
        CommandResponse::text(format!("Nice to meet you, {}! Which dance do you like most?", name)).with_next(next),
    ))
}

async fn receive_dance(_ctx: ExecutionContext, input: Input, state: Arc<GreetingState>) -> HandlerResult {
    let dance = input.message.trim();
    let dance = if dance.is_empty() { "swing" } else { dance };
    Ok(Some(CommandResponse::text(format!(
        "Great choice, {}. See you at the next {} social!",
        state.name, dance
    ))))
}
