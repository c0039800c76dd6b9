//! Snapshot persistence over an injected [`DraftStore`].
//!
//! Reads never fail: a missing, unreadable, corrupt or expired snapshot is
//! simply absent. Corrupt and expired entries are purged as a side effect of
//! the read. Writes from autosave are best effort.

use crate::error::{AppError, Result};
use crate::models::{now_millis, CanvasDraftSnapshot, DraftKey};
use crate::store::DraftStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct DraftPersistence {
    store: Arc<dyn DraftStore>,
    ttl: Duration,
}

impl DraftPersistence {
    pub fn new(store: Arc<dyn DraftStore>, ttl: Duration) -> Self {
        DraftPersistence { store, ttl }
    }

    pub fn store(&self) -> &Arc<dyn DraftStore> {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn load(&self, key: &DraftKey) -> Option<CanvasDraftSnapshot> {
        self.load_at(key, now_millis()).await
    }

    pub async fn load_at(&self, key: &DraftKey, now_ms: i64) -> Option<CanvasDraftSnapshot> {
        let storage_key = key.storage_key();
        let raw = match self.store.get(&storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read draft {}: {}", storage_key, e);
                return None;
            }
        };

        let snapshot: CanvasDraftSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Discarding unreadable draft {}: {}", storage_key, e);
                self.purge(&storage_key).await;
                return None;
            }
        };

        if snapshot.is_expired(now_ms) {
            tracing::debug!(
                "Draft {} expired at {}, purging",
                storage_key,
                snapshot.expires_at
            );
            self.purge(&storage_key).await;
            return None;
        }

        Some(snapshot)
    }

    async fn purge(&self, storage_key: &str) {
        if let Err(e) = self.store.remove(storage_key).await {
            tracing::warn!("Failed to purge draft {}: {}", storage_key, e);
        }
    }

    /// Write a snapshot, reporting failures. An empty snapshot removes the
    /// draft instead, since there is nothing to resume. Snapshots must be
    /// valid and stamped with this persistence's TTL.
    pub async fn try_save(&self, key: &DraftKey, snapshot: &CanvasDraftSnapshot) -> Result<()> {
        let storage_key = key.storage_key();
        if snapshot.is_empty() {
            return self.store.remove(&storage_key).await;
        }

        snapshot.validate().map_err(AppError::InvalidRequest)?;
        let ttl_ms = self.ttl.as_millis() as i64;
        if snapshot.expires_at != snapshot.updated_at.saturating_add(ttl_ms) {
            return Err(AppError::InvalidRequest(format!(
                "Draft stamped {}..{} does not match a {}ms lifetime",
                snapshot.updated_at, snapshot.expires_at, ttl_ms
            )));
        }

        let json = serde_json::to_string(snapshot)
            .map_err(|e| AppError::Internal(format!("Failed to serialize draft: {}", e)))?;
        self.store.set(&storage_key, json).await?;
        tracing::debug!(
            "Saved draft {} ({} routes, {} pending points)",
            storage_key,
            snapshot.completed_routes.len(),
            snapshot.current_points.len()
        );
        Ok(())
    }

    /// Best-effort write: failures are logged and dropped.
    pub async fn save(&self, key: &DraftKey, snapshot: &CanvasDraftSnapshot) {
        if let Err(e) = self.try_save(key, snapshot).await {
            tracing::warn!("Failed to save draft {}: {}", key.storage_key(), e);
        }
    }

    pub async fn try_discard(&self, key: &DraftKey) -> Result<()> {
        self.store.remove(&key.storage_key()).await
    }

    /// Best-effort removal, used after a successful submission.
    pub async fn discard(&self, key: &DraftKey) {
        if let Err(e) = self.try_discard(key).await {
            tracing::warn!("Failed to discard draft {}: {}", key.storage_key(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftRoute, NormalizedPoint};
    use crate::store::{MemoryDraftStore, StoreStats};
    use async_trait::async_trait;

    const WEEK: Duration = Duration::from_secs(604_800);

    struct FailingStore;

    #[async_trait]
    impl DraftStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(AppError::Store("quota exceeded".to_string()))
        }
        async fn set(&self, _key: &str, _value: String) -> Result<()> {
            Err(AppError::Store("quota exceeded".to_string()))
        }
        async fn remove(&self, _key: &str) -> Result<()> {
            Err(AppError::Store("quota exceeded".to_string()))
        }
        async fn get_stats(&self) -> StoreStats {
            StoreStats::new(0, 0, false)
        }
        async fn health_check(&self) -> bool {
            false
        }
        fn backend_name(&self) -> &'static str {
            "failing"
        }
    }

    fn key() -> DraftKey {
        DraftKey::new("photos/crag-wall.jpg", "crag-42").unwrap()
    }

    fn snapshot(now_ms: i64) -> CanvasDraftSnapshot {
        let route = DraftRoute::new(
            "Slab Master".to_string(),
            "6B".to_string(),
            None,
            vec![
                NormalizedPoint::clamped(0.1, 0.9),
                NormalizedPoint::clamped(0.4, 0.2),
            ],
            1,
        );
        CanvasDraftSnapshot {
            completed_routes: vec![route],
            current_points: vec![NormalizedPoint::clamped(0.5, 0.5)],
            current_name: "next".to_string(),
            ..CanvasDraftSnapshot::default()
        }
        .touch(now_ms, WEEK)
    }

    fn persistence() -> (DraftPersistence, Arc<MemoryDraftStore>) {
        let store = Arc::new(MemoryDraftStore::new(100));
        (DraftPersistence::new(store.clone(), WEEK), store)
    }

    #[tokio::test]
    async fn save_then_load() {
        let (drafts, _) = persistence();
        let saved = snapshot(1_000);
        drafts.save(&key(), &saved).await;

        let loaded = drafts.load_at(&key(), 2_000).await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn missing_draft_is_none() {
        let (drafts, _) = persistence();
        assert!(drafts.load_at(&key(), 0).await.is_none());
    }

    #[tokio::test]
    async fn expired_draft_is_purged() {
        let (drafts, store) = persistence();
        let saved = snapshot(1_000);
        drafts.save(&key(), &saved).await;

        // Exactly at expiry it is still valid
        assert!(drafts.load_at(&key(), saved.expires_at).await.is_some());

        assert!(drafts.load_at(&key(), saved.expires_at + 1).await.is_none());
        assert_eq!(store.get(&key().storage_key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_draft_is_purged() {
        let (drafts, store) = persistence();
        store
            .set(&key().storage_key(), "{not json".to_string())
            .await
            .unwrap();

        assert!(drafts.load_at(&key(), 0).await.is_none());
        assert_eq!(store.get(&key().storage_key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn other_crag_does_not_resume() {
        let (drafts, _) = persistence();
        drafts.save(&key(), &snapshot(1_000)).await;

        let other = DraftKey::new("photos/crag-wall.jpg", "crag-43").unwrap();
        assert!(drafts.load_at(&other, 2_000).await.is_none());
    }

    #[tokio::test]
    async fn empty_snapshot_clears_draft() {
        let (drafts, store) = persistence();
        drafts.save(&key(), &snapshot(1_000)).await;
        drafts
            .save(&key(), &CanvasDraftSnapshot::default().touch(2_000, WEEK))
            .await;
        assert_eq!(store.get(&key().storage_key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_failures_are_swallowed() {
        let drafts = DraftPersistence::new(Arc::new(FailingStore), WEEK);
        drafts.save(&key(), &snapshot(1_000)).await;
        drafts.discard(&key()).await;
        assert!(drafts.load_at(&key(), 2_000).await.is_none());
        assert!(drafts.try_save(&key(), &snapshot(1_000)).await.is_err());
    }

    #[tokio::test]
    async fn unstamped_snapshot_is_rejected() {
        let (drafts, store) = persistence();
        let mut unstamped = snapshot(1_000);
        unstamped.updated_at = 0;
        unstamped.expires_at = 0;

        let err = drafts.try_save(&key(), &unstamped).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(store.get(&key().storage_key()).await.unwrap(), None);

        // Stamped with some other lifetime
        let short = snapshot(1_000).touch(1_000, Duration::from_secs(60));
        assert!(drafts.try_save(&key(), &short).await.is_err());
    }

    #[tokio::test]
    async fn invalid_route_is_rejected() {
        let (drafts, store) = persistence();
        let mut broken = snapshot(1_000);
        broken.completed_routes[0].points.truncate(1);

        let err = drafts.try_save(&key(), &broken).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        drafts.save(&key(), &broken).await;
        assert_eq!(store.get(&key().storage_key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn discard_removes_draft() {
        let (drafts, _) = persistence();
        drafts.save(&key(), &snapshot(1_000)).await;
        drafts.discard(&key()).await;
        assert!(drafts.load_at(&key(), 2_000).await.is_none());
    }
}
