//! Test data generators
//!
//! Registries, arguments and storages shared by the integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use ContextBuddy::config::StorageConfig;
use ContextBuddy::{CommandResponse, ContinuationRegistry, UserContextStorage};

use super::memory_client::MemoryClient;

pub const BOT_TYPE: &str = "b";
pub const GREET: &str = "greet";
pub const TEST_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Greet {
    pub name: String,
}

/// Arguments seen by the `greet` handler, in call order
pub type Seen = Arc<Mutex<Vec<Greet>>>;

/// Registry with a single `greet` continuation under [`BOT_TYPE`]
pub fn greet_registry() -> (Arc<ContinuationRegistry>, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ContinuationRegistry::new();

    let recorder = seen.clone();
    registry.register(BOT_TYPE, GREET, move |_ctx, _input, arg: Arc<Greet>| {
        let recorder = recorder.clone();
        async move {
            recorder.lock().unwrap().push((*arg).clone());
            Ok(Some(CommandResponse::text(format!("Hello, {}", arg.name))))
        }
    });

    (Arc::new(registry), seen)
}

pub fn storage_for(bot_type: &str, registry: Arc<ContinuationRegistry>, client: Arc<MemoryClient>) -> UserContextStorage {
    UserContextStorage::builder(bot_type, registry, &StorageConfig::new(TEST_TTL))
        .with_client(client)
        .build()
        .expect("storage with a client must build")
}

/// Storage for [`BOT_TYPE`] over a fresh in-memory client
pub fn greet_storage() -> (UserContextStorage, Arc<MemoryClient>, Seen) {
    let (registry, seen) = greet_registry();
    let client = Arc::new(MemoryClient::new());
    let storage = storage_for(BOT_TYPE, registry, client.clone());
    (storage, client, seen)
}
