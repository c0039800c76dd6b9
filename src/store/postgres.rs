use crate::db::draft_queries;
use crate::error::Result;
use crate::store::{DraftStore, StoreStats};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::atomic::{AtomicU64, Ordering};

/// Draft store over the `draft_snapshots` table.
pub struct PgDraftStore {
    pool: PgPool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PgDraftStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(draft_queries::count_drafts(&self.pool).await?)
    }
}

#[async_trait]
impl DraftStore for PgDraftStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = draft_queries::find_draft(&self.pool, key).await?;
        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        Ok(draft_queries::upsert_draft(&self.pool, key, &value).await?)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let removed = draft_queries::delete_draft(&self.pool, key).await?;
        tracing::debug!("Deleted {} draft row(s): {}", removed, key);
        Ok(())
    }

    async fn get_stats(&self) -> StoreStats {
        StoreStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.health_check().await,
        )
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
