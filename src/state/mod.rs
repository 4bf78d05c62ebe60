//! State management module
//!
//! This module handles suspended conversations: the registry of resumable
//! handlers, the stored envelope format, and the Redis-backed storage.

pub mod envelope;
pub mod registry;
pub mod storage;

// Re-export commonly used state components
pub use envelope::{decode, encode, DecodedContinuation};
pub use registry::{ArgumentShape, ContinuationDescriptor, ContinuationRegistry, ErasedArgument, ErasedHandler};
pub use storage::{ContextualFunc, UserContextStorage, UserContextStorageBuilder};
