//! In-memory key-value client
//!
//! Stands in for Redis in tests. Every call is recorded so tests can check
//! what reached the backend, and failures can be injected on demand.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use ContextBuddy::services::KeyValueClient;
use ContextBuddy::utils::errors::{BackendError, BackendResult};

/// A backend call as seen by the client
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Set(String, Duration),
    Del(Vec<String>),
    FlushAll,
}

#[derive(Debug, Default)]
pub struct MemoryClient {
    entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<String>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes directly, bypassing the storage layer
    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), Duration::ZERO));
    }

    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().unwrap().get(key).map(|(value, _)| value.clone())
    }

    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().unwrap().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Set(..)))
            .count()
    }

    /// Make every following call fail with `message`
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn record(&self, call: Call) -> BackendResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(BackendError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KeyValueClient for MemoryClient {
    async fn get(&self, key: &str) -> BackendResult<Vec<u8>> {
        self.record(Call::Get(key.to_string()))?;
        self.stored(key).ok_or(BackendError::NotFound)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> BackendResult<()> {
        self.record(Call::Set(key.to_string(), ttl))?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), ttl));
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> BackendResult<()> {
        self.record(Call::Del(keys.iter().map(|key| key.to_string()).collect()))?;
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn flush_all(&self) -> BackendResult<()> {
        self.record(Call::FlushAll)?;
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}
