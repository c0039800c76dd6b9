pub mod debug;
pub mod drafts;
pub mod gps;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/images/gps", post(gps::extract_image_gps))
        .route(
            "/drafts",
            get(drafts::get_draft)
                .put(drafts::save_draft)
                .delete(drafts::delete_draft),
        )
        .route("/debug/health", get(debug::health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
