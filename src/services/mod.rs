//! Services module
//!
//! This module contains the key-value backend clients

pub mod redis;

// Re-export commonly used services
pub use redis::{connect_client, KeyValueClient, RedisClient, RedisClusterClient};
