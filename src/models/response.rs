//! Handler response and serializable continuation models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::utils::errors::Result;

/// Identifier plus argument describing the next step of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableArgument {
    pub func_identifier: String,
    /// `None` means no argument was supplied; storing such a value is rejected
    pub argument: Option<Value>,
}

impl SerializableArgument {
    /// Capture `argument` for the continuation registered as `func_identifier`.
    ///
    /// Fails when the argument cannot be represented as JSON, e.g. a map with
    /// non-string keys.
    pub fn new<T: Serialize + ?Sized>(func_identifier: impl Into<String>, argument: &T) -> Result<Self> {
        Ok(Self {
            func_identifier: func_identifier.into(),
            argument: Some(serde_json::to_value(argument)?),
        })
    }
}

/// What a handler sends back to the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandResponse {
    pub content: String,
    /// Continuation to suspend on; `None` ends the conversation
    pub next: Option<SerializableArgument>,
}

impl CommandResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            next: None,
        }
    }

    pub fn with_next(mut self, next: SerializableArgument) -> Self {
        self.next = Some(next);
        self
    }
}

/// Result returned by every registered handler
pub type HandlerResult = anyhow::Result<Option<CommandResponse>>;
