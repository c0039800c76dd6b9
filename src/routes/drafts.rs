use crate::error::{AppError, Result};
use crate::models::{now_millis, CanvasDraftSnapshot, DraftKey};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct DraftQuery {
    pub image_ref: String,
    pub crag_id: String,
}

impl DraftQuery {
    fn key(&self) -> Result<DraftKey> {
        DraftKey::new(&self.image_ref, &self.crag_id).map_err(AppError::InvalidRequest)
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveDraftRequest {
    pub image_ref: String,
    pub crag_id: String,
    pub snapshot: CanvasDraftSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftResponse {
    pub key: String,
    pub updated_at: i64,
    pub expires_at: i64,
}

/// GET /drafts?image_ref=..&crag_id=..
/// The stored snapshot, or 404 when there is none or it expired.
pub async fn get_draft(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DraftQuery>,
) -> Result<Json<CanvasDraftSnapshot>> {
    let key = query.key()?;
    state
        .drafts
        .load(&key)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No draft for {}", key.storage_key())))
}

/// PUT /drafts
/// Store a snapshot. Timestamps are re-stamped with the server clock so a
/// skewed client clock cannot shorten or extend the TTL.
pub async fn save_draft(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveDraftRequest>,
) -> Result<Json<SaveDraftResponse>> {
    let key = DraftKey::new(&request.image_ref, &request.crag_id)
        .map_err(AppError::InvalidRequest)?;
    request
        .snapshot
        .validate()
        .map_err(AppError::InvalidRequest)?;

    let snapshot = request.snapshot.touch(now_millis(), state.drafts.ttl());
    state.drafts.try_save(&key, &snapshot).await?;

    Ok(Json(SaveDraftResponse {
        key: key.storage_key(),
        updated_at: snapshot.updated_at,
        expires_at: snapshot.expires_at,
    }))
}

/// DELETE /drafts?image_ref=..&crag_id=..
pub async fn delete_draft(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DraftQuery>,
) -> Result<StatusCode> {
    let key = query.key()?;
    state.drafts.try_discard(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}
