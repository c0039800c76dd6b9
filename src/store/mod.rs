pub mod memory;
pub mod postgres;
pub mod redis;

use crate::config::{Config, DraftBackend};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use memory::MemoryDraftStore;
pub use postgres::PgDraftStore;
pub use self::redis::RedisDraftStore;

/// String key-value store holding serialized draft snapshots.
///
/// Backends only move strings; parsing, expiry and purging are the caller's
/// business. All methods are `&self` so one instance can be shared behind an
/// `Arc` across handlers and autosave tasks.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn get_stats(&self) -> StoreStats;
    async fn health_check(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

/// Store statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub connected: bool,
}

impl StoreStats {
    pub fn new(hits: u64, misses: u64, connected: bool) -> Self {
        let hit_rate = if hits + misses > 0 {
            (hits as f64 / (hits + misses) as f64) * 100.0
        } else {
            0.0
        };
        StoreStats {
            hits,
            misses,
            hit_rate,
            connected,
        }
    }
}

fn memory_store(config: &Config) -> Arc<dyn DraftStore> {
    Arc::new(MemoryDraftStore::new(config.memory_store_max_entries))
}

/// Build the store selected by `DRAFT_STORE`. An unreachable Redis degrades
/// to the in-memory store; an unreachable database is fatal.
pub async fn create_store(config: &Config) -> Result<Arc<dyn DraftStore>> {
    match config.draft_backend {
        DraftBackend::Memory => {
            tracing::info!(
                "Using in-memory draft store (max {} entries)",
                config.memory_store_max_entries
            );
            Ok(memory_store(config))
        }
        DraftBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| AppError::Internal("REDIS_URL is not set".to_string()))?;
            match RedisDraftStore::new(url).await {
                Ok(store) => Ok(Arc::new(store)),
                Err(e) => {
                    tracing::warn!(
                        "Redis unavailable, falling back to in-memory draft store: {}",
                        e
                    );
                    Ok(memory_store(config))
                }
            }
        }
        DraftBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Internal("DATABASE_URL is not set".to_string()))?;
            let pool = crate::db::create_pool(url).await?;
            tracing::info!("Database connection pool established");
            Ok(Arc::new(PgDraftStore::new(pool)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_a_percentage() {
        let stats = StoreStats::new(3, 1, true);
        assert_eq!(stats.hit_rate, 75.0);
        assert_eq!(StoreStats::new(0, 0, false).hit_rate, 0.0);
    }
}
