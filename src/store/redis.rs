use crate::error::{AppError, Result};
use crate::store::{DraftStore, StoreStats};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed draft store. All methods are `&self`: `ConnectionManager` is
/// `Arc`-based internally, so `.clone()` is a cheap atomic increment.
///
/// Keys are written without a Redis TTL. Snapshots carry their own expiry
/// and are purged when read past it.
pub struct RedisDraftStore {
    connection: ConnectionManager,
}

impl RedisDraftStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Store(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Store(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Redis draft store connection established");

        Ok(RedisDraftStore { connection })
    }
}

#[async_trait]
impl DraftStore for RedisDraftStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| AppError::Store(format!("Redis GET {}: {}", key, e)))?;

        match &value {
            Some(_) => tracing::debug!("Redis hit for draft: {}", key),
            None => tracing::debug!("Redis miss for draft: {}", key),
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.connection.clone();
        let len = value.len();
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| AppError::Store(format!("Redis SET {}: {}", key, e)))?;
        tracing::debug!("Redis stored {} bytes: {}", len, key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .del(key)
            .await
            .map_err(|e| AppError::Store(format!("Redis DEL {}: {}", key, e)))?;
        Ok(())
    }

    async fn get_stats(&self) -> StoreStats {
        let mut conn = self.connection.clone();
        let info: redis::RedisResult<String> =
            redis::cmd("INFO").arg("stats").query_async(&mut conn).await;

        match info {
            Ok(info_str) => StoreStats::new(
                parse_info_value(&info_str, "keyspace_hits"),
                parse_info_value(&info_str, "keyspace_misses"),
                true,
            ),
            Err(_) => StoreStats::new(0, 0, false),
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        let result: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        result.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

fn parse_info_value(info: &str, key: &str) -> u64 {
    info.lines()
        .find(|line| line.starts_with(key))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|val| val.trim().parse().ok())
        .unwrap_or(0)
}
