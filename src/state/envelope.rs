//! Envelope codec
//!
//! A stored continuation is a JSON object of the form
//! `{"func_identifier": "<id>", "argument": <any JSON>}`. Encoding is plain
//! serialization. Decoding happens in two phases: the identifier is read
//! first, the registry is asked which argument type belongs to it, and only
//! then is the `argument` sub-document deserialized into that type.

use std::sync::Arc;
use serde::Serialize;
use serde_json::{Map, Value};
use crate::models::BotType;
use crate::utils::errors::{ContextError, Result};
use crate::utils::helpers::payload_preview;
use super::registry::{ContinuationDescriptor, ContinuationRegistry, ErasedArgument};

pub const FUNC_IDENTIFIER_FIELD: &str = "func_identifier";
pub const ARGUMENT_FIELD: &str = "argument";

#[derive(Serialize)]
struct Envelope<'a, T: ?Sized> {
    func_identifier: &'a str,
    argument: &'a T,
}

/// A continuation read back from storage
#[derive(Debug, Clone)]
pub struct DecodedContinuation {
    pub descriptor: Arc<ContinuationDescriptor>,
    pub argument: ErasedArgument,
}

impl DecodedContinuation {
    pub fn func_identifier(&self) -> &str {
        self.descriptor.identifier()
    }
}

/// Serialize an identifier and its argument into envelope bytes
pub fn encode<T: Serialize + ?Sized>(func_identifier: &str, argument: &T) -> Result<Vec<u8>> {
    let envelope = Envelope {
        func_identifier,
        argument,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Rebuild a continuation from envelope bytes.
///
/// Returns `Ok(None)` when the identifier is not registered for `bot_type`;
/// an unregistered bot type, a malformed envelope, or an argument that does
/// not fit the registered shape are errors.
pub fn decode(registry: &ContinuationRegistry, bot_type: &BotType, raw: &[u8]) -> Result<Option<DecodedContinuation>> {
    let mut fields: Map<String, Value> = serde_json::from_slice(raw).map_err(|e| ContextError::MalformedEnvelope {
        reason: format!("{} in {}", e, payload_preview(raw)),
    })?;

    let func_identifier = match fields.remove(FUNC_IDENTIFIER_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => id,
        Some(Value::String(_)) => {
            return Err(ContextError::MalformedEnvelope {
                reason: format!("mandatory field, {}, is empty in {}", FUNC_IDENTIFIER_FIELD, payload_preview(raw)),
            });
        }
        Some(other) => {
            return Err(ContextError::MalformedEnvelope {
                reason: format!("{} must be a string, got {}", FUNC_IDENTIFIER_FIELD, other),
            });
        }
        None => {
            return Err(ContextError::MalformedEnvelope {
                reason: format!("mandatory field, {}, is not set in {}", FUNC_IDENTIFIER_FIELD, payload_preview(raw)),
            });
        }
    };

    let descriptor = match registry.lookup(bot_type, &func_identifier)? {
        Some(descriptor) => descriptor,
        None => return Ok(None),
    };

    let value = fields.remove(ARGUMENT_FIELD).ok_or_else(|| ContextError::ArgumentDecode {
        func_identifier: func_identifier.clone(),
        source: <serde_json::Error as serde::de::Error>::missing_field(ARGUMENT_FIELD),
    })?;

    let argument = descriptor
        .shape()
        .decode(value)
        .map_err(|source| ContextError::ArgumentDecode {
            func_identifier,
            source,
        })?;

    Ok(Some(DecodedContinuation { descriptor, argument }))
}
