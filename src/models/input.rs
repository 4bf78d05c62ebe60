//! Inbound input and execution context models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::types::Message;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// A single inbound message handed to a continuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Key identifying the conversation; used as the storage key
    pub sender_key: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    /// Chat to reply to, when the input came from a chat
    pub reply_to: Option<i64>,
}

impl Input {
    pub fn new(sender_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender_key: sender_key.into(),
            message: message.into(),
            sent_at: Utc::now(),
            reply_to: None,
        }
    }

    /// Build an input from a Telegram message.
    ///
    /// The sender key is scoped per chat and per user so that the same user
    /// talking in two groups keeps two separate conversations.
    pub fn from_message(msg: &Message) -> Self {
        let chat_id = msg.chat.id.0;
        let sender_key = match msg.from.as_ref() {
            Some(user) => format!("{}:{}", chat_id, user.id.0),
            None => chat_id.to_string(),
        };

        Self {
            sender_key,
            message: msg.text().unwrap_or_default().to_string(),
            sent_at: msg.date,
            reply_to: Some(chat_id),
        }
    }
}

/// Cancellable context a continuation runs under
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    token: CancellationToken,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Derive a context that is cancelled together with this one
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_context_follows_parent() {
        let parent = ExecutionContext::new();
        let child = parent.child();
        assert!(!child.is_cancelled());

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let parent = ExecutionContext::new();
        let child = parent.child();
        child.cancel();
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn test_new_input() {
        let input = Input::new("42:7", "hello");
        assert_eq!(input.sender_key, "42:7");
        assert_eq!(input.message, "hello");
        assert!(input.reply_to.is_none());
    }
}
