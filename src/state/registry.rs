//! Continuation registry
//!
//! Handlers cannot be written to Redis, so each one is registered once at
//! startup under a `(bot type, identifier)` pair and only the identifier is
//! persisted. The registry also remembers the argument type each handler
//! expects, captured as an [`ArgumentShape`] that knows how to rebuild that
//! type from JSON.
//!
//! The registry is built mutably during startup and then moved into an `Arc`
//! shared with [`UserContextStorage`](super::storage::UserContextStorage).
//! Once shared, no further registration is possible.

use std::any::{self, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use crate::models::{BotType, ExecutionContext, HandlerResult, Input};
use crate::utils::errors::{ContextError, Result};

/// A decoded argument whose concrete type is only known to its descriptor
pub type ErasedArgument = Arc<dyn Any + Send + Sync>;

/// A registered handler with its argument type erased
pub type ErasedHandler =
    Arc<dyn Fn(ExecutionContext, Input, ErasedArgument) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Describes the argument type a handler expects
#[derive(Clone, Copy)]
pub struct ArgumentShape {
    type_name: &'static str,
    type_id: TypeId,
    decode: fn(Value) -> serde_json::Result<ErasedArgument>,
}

impl ArgumentShape {
    /// Shape of `A`.
    ///
    /// A JSON `null` argument decodes to `A::default()`, the zero value of the
    /// shape; anything else is deserialized into `A`.
    pub fn of<A>() -> Self
    where
        A: DeserializeOwned + Default + Send + Sync + 'static,
    {
        Self {
            type_name: any::type_name::<A>(),
            type_id: TypeId::of::<A>(),
            decode: decode_as::<A>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Allocate an instance of this shape populated from `value`
    pub fn decode(&self, value: Value) -> serde_json::Result<ErasedArgument> {
        (self.decode)(value)
    }

    /// Whether `argument` holds a value of this shape
    pub fn accepts(&self, argument: &ErasedArgument) -> bool {
        (**argument).type_id() == self.type_id
    }
}

impl fmt::Debug for ArgumentShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentShape")
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn decode_as<A>(value: Value) -> serde_json::Result<ErasedArgument>
where
    A: DeserializeOwned + Default + Send + Sync + 'static,
{
    let argument = match value {
        Value::Null => A::default(),
        other => serde_json::from_value::<A>(other)?,
    };
    Ok(Arc::new(argument))
}

/// A registered continuation: identifier, argument shape and handler
pub struct ContinuationDescriptor {
    identifier: String,
    shape: ArgumentShape,
    handler: ErasedHandler,
}

impl ContinuationDescriptor {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn shape(&self) -> &ArgumentShape {
        &self.shape
    }

    pub fn handler(&self) -> &ErasedHandler {
        &self.handler
    }
}

impl fmt::Debug for ContinuationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuationDescriptor")
            .field("identifier", &self.identifier)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Table of registered continuations, grouped per bot type
#[derive(Debug, Default)]
pub struct ContinuationRegistry {
    stash: HashMap<BotType, Vec<Arc<ContinuationDescriptor>>>,
}

impl ContinuationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler for `identifier` under `bot_type`.
    ///
    /// Registration never fails and never replaces an earlier entry; each
    /// identifier should be registered once per bot type.
    pub fn register<A, F, Fut>(&mut self, bot_type: impl Into<BotType>, identifier: impl Into<String>, handler: F)
    where
        A: DeserializeOwned + Default + Send + Sync + 'static,
        F: Fn(ExecutionContext, Input, Arc<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let identifier = identifier.into();
        let func_identifier = identifier.clone();
        let erased: ErasedHandler = Arc::new(move |ctx: ExecutionContext, input: Input, argument: ErasedArgument| {
            match argument.downcast::<A>() {
                Ok(argument) => handler(ctx, input, argument).boxed(),
                Err(_) => {
                    let err = ContextError::ArgumentTypeMismatch {
                        func_identifier: func_identifier.clone(),
                        expected: any::type_name::<A>(),
                    };
                    future::ready::<HandlerResult>(Err(err.into())).boxed()
                }
            }
        });

        self.register_shaped(bot_type, identifier, ArgumentShape::of::<A>(), erased);
    }

    /// Register an already type-erased handler with an explicit shape
    pub fn register_shaped(
        &mut self,
        bot_type: impl Into<BotType>,
        identifier: impl Into<String>,
        shape: ArgumentShape,
        handler: ErasedHandler,
    ) {
        let bot_type = bot_type.into();
        let identifier = identifier.into();
        debug!(bot_type = %bot_type, func_identifier = %identifier, shape = shape.type_name(),
               "Registering continuation");

        self.stash
            .entry(bot_type)
            .or_default()
            .push(Arc::new(ContinuationDescriptor {
                identifier,
                shape,
                handler,
            }));
    }

    /// Find the descriptor for `identifier` under `bot_type`.
    ///
    /// An unregistered bot type is a configuration error. An unknown identifier
    /// under a known bot type is `Ok(None)`. With duplicate registrations the
    /// earliest one wins.
    pub fn lookup(&self, bot_type: &BotType, identifier: &str) -> Result<Option<Arc<ContinuationDescriptor>>> {
        let descriptors = self.stash.get(bot_type).ok_or_else(|| ContextError::UnknownBot {
            bot_type: bot_type.to_string(),
        })?;

        Ok(descriptors
            .iter()
            .find(|descriptor| descriptor.identifier == identifier)
            .cloned())
    }

    pub fn contains_bot(&self, bot_type: &BotType) -> bool {
        self.stash.contains_key(bot_type)
    }

    /// Number of descriptors registered under `bot_type`, duplicates included
    pub fn len_for(&self, bot_type: &BotType) -> usize {
        self.stash.get(bot_type).map_or(0, Vec::len)
    }

    pub fn bot_types(&self) -> impl Iterator<Item = &BotType> {
        self.stash.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommandResponse;
    use assert_matches::assert_matches;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct DummyArg {
        bar: String,
    }

    async fn echo(_ctx: ExecutionContext, _input: Input, arg: Arc<DummyArg>) -> HandlerResult {
        Ok(Some(CommandResponse::text(arg.bar.clone())))
    }

    #[test]
    fn test_register() {
        let mut registry = ContinuationRegistry::new();
        let bot_type = BotType::from("dummyBot");
        registry.register(bot_type.clone(), "myFunc", echo);

        assert!(registry.contains_bot(&bot_type));
        assert_eq!(registry.len_for(&bot_type), 1);

        let descriptor = registry.lookup(&bot_type, "myFunc").unwrap().unwrap();
        assert_eq!(descriptor.identifier(), "myFunc");
        assert_eq!(descriptor.shape().type_name(), any::type_name::<DummyArg>());
    }

    #[test]
    fn test_lookup_unknown_bot_is_error() {
        let registry = ContinuationRegistry::new();
        let result = registry.lookup(&BotType::from("nobody"), "myFunc");
        assert_matches!(result, Err(ContextError::UnknownBot { bot_type }) if bot_type == "nobody");
    }

    #[test]
    fn test_lookup_unknown_identifier_is_absent() {
        let mut registry = ContinuationRegistry::new();
        let bot_type = BotType::from("dummyBot");
        registry.register(bot_type.clone(), "myFunc", echo);

        assert!(registry.lookup(&bot_type, "otherFunc").unwrap().is_none());
    }

    #[test]
    fn test_bots_are_isolated() {
        let mut registry = ContinuationRegistry::new();
        registry.register("slack", "myFunc", echo);
        registry.register("telegram", "otherFunc", echo);

        let slack = BotType::from("slack");
        assert!(registry.lookup(&slack, "myFunc").unwrap().is_some());
        assert!(registry.lookup(&slack, "otherFunc").unwrap().is_none());
        assert_eq!(registry.bot_types().count(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_identifier_returns_first() {
        let mut registry = ContinuationRegistry::new();
        let bot_type = BotType::from("dummyBot");
        registry.register(bot_type.clone(), "myFunc", |_ctx, _input, _arg: Arc<DummyArg>| async {
            Ok(Some(CommandResponse::text("first")))
        });
        registry.register(bot_type.clone(), "myFunc", |_ctx, _input, _arg: Arc<DummyArg>| async {
            Ok(Some(CommandResponse::text("second")))
        });
        assert_eq!(registry.len_for(&bot_type), 2);

        let descriptor = registry.lookup(&bot_type, "myFunc").unwrap().unwrap();
        let argument = descriptor.shape().decode(serde_json::json!({"bar": "x"})).unwrap();
        let response = (descriptor.handler())(ExecutionContext::new(), Input::new("k", "hi"), argument)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.content, "first");
    }

    #[test]
    fn test_shape_decodes_null_to_default() {
        let shape = ArgumentShape::of::<DummyArg>();
        let argument = shape.decode(Value::Null).unwrap();
        assert!(shape.accepts(&argument));
        assert_eq!(*argument.downcast::<DummyArg>().unwrap(), DummyArg::default());
    }

    #[test]
    fn test_shape_rejects_mismatched_json() {
        let shape = ArgumentShape::of::<DummyArg>();
        assert!(shape.decode(serde_json::json!({"bar": 42})).is_err());
        assert!(shape.decode(serde_json::json!("plain string")).is_err());
    }

    #[tokio::test]
    async fn test_handler_rejects_foreign_argument() {
        let mut registry = ContinuationRegistry::new();
        let bot_type = BotType::from("dummyBot");
        registry.register(bot_type.clone(), "myFunc", echo);

        let descriptor = registry.lookup(&bot_type, "myFunc").unwrap().unwrap();
        let foreign: ErasedArgument = Arc::new(42_u32);
        assert!(!descriptor.shape().accepts(&foreign));

        let err = (descriptor.handler())(ExecutionContext::new(), Input::new("k", "hi"), foreign)
            .await
            .unwrap_err();
        assert_matches!(
            err.downcast_ref::<ContextError>(),
            Some(ContextError::ArgumentTypeMismatch { .. })
        );
    }
}
