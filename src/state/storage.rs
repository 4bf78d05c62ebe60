//! User context storage
//!
//! This module persists the next step of a conversation in Redis. A stored
//! record holds only a continuation identifier and its JSON argument; on read
//! the identifier is resolved through the [`ContinuationRegistry`] back into
//! an invocable [`ContextualFunc`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use crate::config::{Settings, StorageConfig};
use crate::models::{BotType, ExecutionContext, HandlerResult, Input, SerializableArgument};
use crate::services::redis::{connect_client, KeyValueClient, RedisClient, RedisClusterClient};
use crate::utils::errors::{ContextError, Result};
use crate::utils::logging::{log_continuation_event, ContinuationEvent};
use super::envelope::{self, DecodedContinuation};
use super::registry::{ContinuationDescriptor, ContinuationRegistry, ErasedArgument};

/// A resumable continuation bound to its decoded argument
#[derive(Clone)]
pub struct ContextualFunc {
    descriptor: Arc<ContinuationDescriptor>,
    argument: ErasedArgument,
}

impl ContextualFunc {
    pub fn func_identifier(&self) -> &str {
        self.descriptor.identifier()
    }

    /// The decoded argument, if it is of type `A`
    pub fn argument<A: Send + Sync + 'static>(&self) -> Option<Arc<A>> {
        self.argument.clone().downcast::<A>().ok()
    }

    /// Run the registered handler with the decoded argument
    pub async fn call(&self, ctx: ExecutionContext, input: Input) -> HandlerResult {
        let handler = self.descriptor.handler();
        handler(ctx, input, self.argument.clone()).await
    }
}

impl From<DecodedContinuation> for ContextualFunc {
    fn from(decoded: DecodedContinuation) -> Self {
        Self {
            descriptor: decoded.descriptor,
            argument: decoded.argument,
        }
    }
}

impl fmt::Debug for ContextualFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextualFunc")
            .field("func_identifier", &self.func_identifier())
            .field("argument_type", &self.descriptor.shape().type_name())
            .finish()
    }
}

/// Redis-backed storage of suspended conversations
#[derive(Clone)]
pub struct UserContextStorage {
    bot_type: BotType,
    registry: Arc<ContinuationRegistry>,
    client: Arc<dyn KeyValueClient>,
    expires_in: Duration,
}

impl UserContextStorage {
    /// Start building a storage; a backend client must be supplied before `build`
    pub fn builder(
        bot_type: impl Into<BotType>,
        registry: Arc<ContinuationRegistry>,
        config: &StorageConfig,
    ) -> UserContextStorageBuilder {
        UserContextStorageBuilder {
            bot_type: bot_type.into(),
            registry,
            expires_in: config.expires_in(),
            client: None,
        }
    }

    /// Connect to the Redis deployment described by `settings`
    pub async fn connect(registry: Arc<ContinuationRegistry>, settings: &Settings) -> Result<Self> {
        let client = connect_client(&settings.redis).await?;
        Self::builder(settings.bot.bot_type.as_str(), registry, &settings.storage)
            .with_client(client)
            .build()
    }

    pub fn bot_type(&self) -> &BotType {
        &self.bot_type
    }

    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Load the continuation stored at `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored or when the stored identifier
    /// is no longer registered for this bot.
    pub async fn get(&self, key: &str) -> Result<Option<ContextualFunc>> {
        debug!(key = %key, bot_type = %self.bot_type, "Loading user context");

        let raw = match self.client.get(key).await {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => {
                log_continuation_event(ContinuationEvent::Missing, self.bot_type.as_str(), Some(key), None);
                return Ok(None);
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to fetch user context");
                return Err(ContextError::Backend {
                    operation: "get",
                    key: key.to_string(),
                    source: e,
                });
            }
        };

        let decoded = match envelope::decode(&self.registry, &self.bot_type, &raw) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => {
                debug!(key = %key, bot_type = %self.bot_type, "Stored continuation is not registered");
                return Ok(None);
            }
            Err(e) => {
                error!(key = %key, bot_type = %self.bot_type, error = %e, "Failed to decode user context");
                return Err(e);
            }
        };

        log_continuation_event(
            ContinuationEvent::Resumed,
            self.bot_type.as_str(),
            Some(key),
            Some(decoded.func_identifier()),
        );
        Ok(Some(decoded.into()))
    }

    /// Store `user_context` at `key`, replacing any previous value and
    /// resetting its expiry.
    ///
    /// A missing context, an empty identifier, or a missing or `null`
    /// argument is rejected before anything is sent to Redis.
    pub async fn set(&self, key: &str, user_context: Option<&SerializableArgument>) -> Result<()> {
        let user_context = user_context.ok_or_else(|| {
            ContextError::InvalidContinuation("user context is not given".to_string())
        })?;

        if user_context.func_identifier.is_empty() {
            return Err(ContextError::InvalidContinuation(
                "function identifier is empty".to_string()
            ));
        }

        let argument = match &user_context.argument {
            Some(argument) if !argument.is_null() => argument,
            _ => {
                return Err(ContextError::InvalidContinuation(format!(
                    "argument for {} is not given",
                    user_context.func_identifier
                )));
            }
        };

        let bytes = envelope::encode(&user_context.func_identifier, argument)?;
        self.client
            .set(key, &bytes, self.expires_in)
            .await
            .map_err(|e| {
                error!(key = %key, error = %e, "Failed to store user context");
                ContextError::Backend {
                    operation: "set",
                    key: key.to_string(),
                    source: e,
                }
            })?;

        log_continuation_event(
            ContinuationEvent::Stored,
            self.bot_type.as_str(),
            Some(key),
            Some(&user_context.func_identifier),
        );
        Ok(())
    }

    /// Remove the continuation stored at `key`; removing nothing is fine
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .del(&[key])
            .await
            .map_err(|e| ContextError::Backend {
                operation: "del",
                key: key.to_string(),
                source: e,
            })?;

        log_continuation_event(ContinuationEvent::Deleted, self.bot_type.as_str(), Some(key), None);
        Ok(())
    }

    /// Remove every key in the backend, not only this bot's continuations
    pub async fn flush(&self) -> Result<()> {
        self.client
            .flush_all()
            .await
            .map_err(|e| ContextError::Backend {
                operation: "flushall",
                key: "*".to_string(),
                source: e,
            })?;

        log_continuation_event(ContinuationEvent::Flushed, self.bot_type.as_str(), None, None);
        Ok(())
    }
}

impl fmt::Debug for UserContextStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContextStorage")
            .field("bot_type", &self.bot_type)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Builder selecting the backend client of a [`UserContextStorage`]
pub struct UserContextStorageBuilder {
    bot_type: BotType,
    registry: Arc<ContinuationRegistry>,
    expires_in: Duration,
    client: Option<Arc<dyn KeyValueClient>>,
}

impl UserContextStorageBuilder {
    pub fn with_redis_client(self, client: RedisClient) -> Self {
        self.with_client(Arc::new(client))
    }

    pub fn with_redis_cluster_client(self, client: RedisClusterClient) -> Self {
        self.with_client(Arc::new(client))
    }

    pub fn with_client(mut self, client: Arc<dyn KeyValueClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<UserContextStorage> {
        let client = self.client.ok_or_else(|| {
            ContextError::Config("redis client is not given".to_string())
        })?;

        Ok(UserContextStorage {
            bot_type: self.bot_type,
            registry: self.registry,
            client,
            expires_in: self.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_build_without_client() {
        let registry = Arc::new(ContinuationRegistry::new());
        let result = UserContextStorage::builder("dummyBot", registry, &StorageConfig::default()).build();
        assert_matches!(result, Err(ContextError::Config(msg)) if msg.contains("not given"));
    }
}
