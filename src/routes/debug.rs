use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Check if the draft store is reachable
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {}
    });

    let store = state.drafts.store();
    if store.health_check().await {
        status["checks"]["draft_store"] = json!("ok");
    } else {
        status["checks"]["draft_store"] = json!({"error": "unreachable"});
        status["status"] = json!("error");
    }

    status["checks"]["draft_store_backend"] = json!(store.backend_name());
    status["checks"]["draft_store_stats"] = json!(store.get_stats().await);
    status["checks"]["draft_ttl_seconds"] = json!(state.drafts.ttl().as_secs());

    Json(status)
}
