use crate::constants::{DEFAULT_GRADE, DRAFT_KEY_PREFIX};
use crate::models::{DraftRoute, NormalizedPoint};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn default_grade() -> String {
    DEFAULT_GRADE.to_string()
}

/// Serializable state of an in-progress drawing session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDraftSnapshot {
    /// Epoch milliseconds of the last mutation
    #[serde(default)]
    pub updated_at: i64,
    /// Always `updated_at + ttl`
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default)]
    pub completed_routes: Vec<DraftRoute>,
    #[serde(default)]
    pub current_points: Vec<NormalizedPoint>,
    #[serde(default)]
    pub current_name: String,
    #[serde(default = "default_grade")]
    pub current_grade: String,
    #[serde(default)]
    pub current_description: String,
}

impl Default for CanvasDraftSnapshot {
    fn default() -> Self {
        CanvasDraftSnapshot {
            updated_at: 0,
            expires_at: 0,
            completed_routes: Vec::new(),
            current_points: Vec::new(),
            current_name: String::new(),
            current_grade: default_grade(),
            current_description: String::new(),
        }
    }
}

impl CanvasDraftSnapshot {
    /// Re-stamp the snapshot as updated at `now_ms`.
    pub fn touch(mut self, now_ms: i64, ttl: Duration) -> Self {
        self.updated_at = now_ms;
        self.expires_at = now_ms.saturating_add(ttl.as_millis() as i64);
        self
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }

    /// Nothing worth resuming.
    pub fn is_empty(&self) -> bool {
        self.completed_routes.is_empty()
            && self.current_points.is_empty()
            && self.current_name.trim().is_empty()
            && self.current_description.trim().is_empty()
    }

    pub fn validate(&self) -> Result<(), String> {
        for route in &self.completed_routes {
            route.validate()?;
        }
        Ok(())
    }
}

/// Identity of a draft: the same photo on the same crag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey {
    image_ref: String,
    crag_id: String,
}

impl DraftKey {
    pub fn new(image_ref: &str, crag_id: &str) -> Result<Self, String> {
        let image_ref = image_ref.trim();
        let crag_id = crag_id.trim();
        if image_ref.is_empty() {
            return Err("image_ref must not be empty".to_string());
        }
        if crag_id.is_empty() {
            return Err("crag_id must not be empty".to_string());
        }
        Ok(DraftKey {
            image_ref: image_ref.to_string(),
            crag_id: crag_id.to_string(),
        })
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn crag_id(&self) -> &str {
        &self.crag_id
    }

    /// Key under which the snapshot is stored. Both parts are URL-encoded so
    /// a `:` inside an image URL cannot collide with the separator.
    pub fn storage_key(&self) -> String {
        format!(
            "{}{}:{}",
            DRAFT_KEY_PREFIX,
            urlencoding::encode(&self.crag_id),
            urlencoding::encode(&self.image_ref)
        )
    }
}
