//! Bot identity model

use std::fmt;
use serde::{Deserialize, Serialize};

/// Label scoping a namespace of registered continuations.
///
/// Distinct bot types never see each other's continuations even when they
/// share a Redis instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotType(String);

impl BotType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BotType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for BotType {
    fn from(name: String) -> Self {
        Self(name)
    }
}
