//! Redis key-value backend clients
//!
//! The continuation storage only needs four commands from its backend. They are
//! captured by [`KeyValueClient`], implemented here for a single Redis node and
//! for a Redis Cluster. A missing key is reported as [`BackendError::NotFound`]
//! so callers can tell "nothing stored" apart from a failing connection.

use std::time::Duration;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{AsyncCommands, Client};
use tracing::{debug, info, warn};
use crate::config::{RedisConfig, RedisMode};
use crate::utils::errors::{BackendError, BackendResult, ContextError, Result};
use crate::utils::helpers::ttl_seconds;

/// Minimal key-value capability required by the continuation storage
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Fetch the value stored at `key`, or [`BackendError::NotFound`]
    async fn get(&self, key: &str) -> BackendResult<Vec<u8>>;

    /// Store `value` at `key`; a zero `ttl` stores without expiry
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> BackendResult<()>;

    /// Remove the given keys; missing keys are ignored
    async fn del(&self, keys: &[&str]) -> BackendResult<()>;

    /// Remove every key reachable by this client
    async fn flush_all(&self) -> BackendResult<()>;
}

/// Client for a single Redis node
#[derive(Clone)]
pub struct RedisClient {
    connection_manager: ConnectionManager,
}

impl RedisClient {
    /// Connect to the node at `url`
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let connection_manager = ConnectionManager::new(client).await?;
        info!(url = %url, "Connected to Redis");

        Ok(Self { connection_manager })
    }

    pub fn from_connection_manager(connection_manager: ConnectionManager) -> Self {
        Self { connection_manager }
    }

    /// Test Redis connection
    pub async fn ping(&self) -> BackendResult<()> {
        let mut conn = self.connection_manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueClient for RedisClient {
    async fn get(&self, key: &str) -> BackendResult<Vec<u8>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        value.ok_or(BackendError::NotFound)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> BackendResult<()> {
        let mut conn = self.connection_manager.clone();
        match ttl_seconds(ttl) {
            0 => conn.set::<_, _, ()>(key, value).await?,
            seconds => conn.set_ex::<_, _, ()>(key, value, seconds).await?,
        }
        debug!(key = %key, ttl_seconds = ttl_seconds(ttl), "Value set in Redis");
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> BackendResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection_manager.clone();
        let deleted: u64 = conn.del(keys).await?;
        debug!(requested = keys.len(), deleted = deleted, "Keys deleted from Redis");
        Ok(())
    }

    async fn flush_all(&self) -> BackendResult<()> {
        let mut conn = self.connection_manager.clone();
        let _: () = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
        warn!("Flushed all keys from Redis");
        Ok(())
    }
}

/// Client for a Redis Cluster
#[derive(Clone)]
pub struct RedisClusterClient {
    connection: ClusterConnection,
}

impl RedisClusterClient {
    /// Connect to the cluster through the given seed nodes
    pub async fn connect(nodes: &[String]) -> Result<Self> {
        if nodes.is_empty() {
            return Err(ContextError::Config(
                "At least one cluster node is required".to_string()
            ));
        }
        let client = ClusterClient::new(nodes.to_vec())?;
        let connection = client.get_async_connection().await?;
        info!(nodes = ?nodes, "Connected to Redis Cluster");

        Ok(Self { connection })
    }

    pub fn from_connection(connection: ClusterConnection) -> Self {
        Self { connection }
    }

    /// Test cluster connection
    pub async fn ping(&self) -> BackendResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClusterClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueClient for RedisClusterClient {
    async fn get(&self, key: &str) -> BackendResult<Vec<u8>> {
        let mut conn = self.connection.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        value.ok_or(BackendError::NotFound)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> BackendResult<()> {
        let mut conn = self.connection.clone();
        match ttl_seconds(ttl) {
            0 => conn.set::<_, _, ()>(key, value).await?,
            seconds => conn.set_ex::<_, _, ()>(key, value, seconds).await?,
        }
        debug!(key = %key, ttl_seconds = ttl_seconds(ttl), "Value set in Redis Cluster");
        Ok(())
    }

    async fn del(&self, keys: &[&str]) -> BackendResult<()> {
        let mut conn = self.connection.clone();
        // Keys may hash to different slots, so each one is deleted on its own.
        for key in keys {
            let _: u64 = conn.del(*key).await?;
        }
        debug!(requested = keys.len(), "Keys deleted from Redis Cluster");
        Ok(())
    }

    async fn flush_all(&self) -> BackendResult<()> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
        warn!("Flushed all keys from Redis Cluster");
        Ok(())
    }
}

/// Open the backend selected by the configured Redis mode
pub async fn connect_client(config: &RedisConfig) -> Result<std::sync::Arc<dyn KeyValueClient>> {
    crate::config::validation::validate_redis_config(config)?;
    let client: std::sync::Arc<dyn KeyValueClient> = match config.mode {
        RedisMode::Single => std::sync::Arc::new(RedisClient::connect(&config.url).await?),
        RedisMode::Cluster => std::sync::Arc::new(RedisClusterClient::connect(&config.cluster_nodes).await?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_redis_url() -> String {
        std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    fn test_key(prefix: &str) -> String {
        format!("{}:{}", prefix, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    async fn test_cluster_connect_requires_nodes() {
        let result = RedisClusterClient::connect(&[]).await;
        assert!(matches!(result, Err(ContextError::Config(_))));
    }

    #[tokio::test]
    #[ignore = "requires a running Redis at TEST_REDIS_URL"]
    #[serial]
    async fn test_redis_client_integration() {
        let client = RedisClient::connect(&test_redis_url()).await.unwrap();
        let key = test_key("redis-key");

        // Initial get without stored data
        assert!(client.get(&key).await.unwrap_err().is_not_found());

        // Set and get
        client.set(&key, b"value", Duration::ZERO).await.unwrap();
        assert_eq!(client.get(&key).await.unwrap(), b"value".to_vec());

        // Flush
        client.flush_all().await.unwrap();
        assert!(client.get(&key).await.unwrap_err().is_not_found());

        // Del, twice
        client.set(&key, b"value", Duration::from_secs(60)).await.unwrap();
        client.del(&[key.as_str()]).await.unwrap();
        client.del(&[key.as_str()]).await.unwrap();
        assert!(client.get(&key).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis Cluster at TEST_REDIS_CLUSTER_NODES"]
    #[serial]
    async fn test_redis_cluster_client_integration() {
        let nodes: Vec<String> = std::env::var("TEST_REDIS_CLUSTER_NODES")
            .unwrap_or_else(|_| "redis://localhost:7000".to_string())
            .split(',')
            .map(str::to_string)
            .collect();
        let client = RedisClusterClient::connect(&nodes).await.unwrap();
        let key = test_key("redis-cluster-key");

        assert!(client.get(&key).await.unwrap_err().is_not_found());

        client.set(&key, b"value", Duration::from_secs(60)).await.unwrap();
        assert_eq!(client.get(&key).await.unwrap(), b"value".to_vec());

        client.del(&[key.as_str()]).await.unwrap();
        assert!(client.get(&key).await.unwrap_err().is_not_found());
    }
}
