use crate::error::{AppError, Result};
use crate::models::GeoCoordinate;
use crate::services::gps::{extract_gps_with_source, GpsSource};
use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GpsResponse {
    pub coordinates: Option<GeoCoordinate>,
    pub source: Option<GpsSource>,
}

/// POST /images/gps
/// Raw image bytes in, photo location out. An image without usable GPS data
/// is not an error: both fields are null.
pub async fn extract_image_gps(headers: HeaderMap, body: Bytes) -> Result<Json<GpsResponse>> {
    if body.is_empty() {
        return Err(AppError::InvalidRequest("Empty image body".to_string()));
    }

    let mime_hint = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let size = body.len();

    // Parsing is CPU-bound and touches untrusted bytes; keep it off the
    // async workers
    let fix = tokio::task::spawn_blocking(move || {
        extract_gps_with_source(&body, mime_hint.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(format!("GPS extraction task failed: {}", e)))?;

    match fix {
        Some(fix) => tracing::info!(
            source = %fix.source,
            "GPS extracted from {} byte upload: ({:.5}, {:.5})",
            size,
            fix.coordinates.latitude(),
            fix.coordinates.longitude()
        ),
        None => tracing::info!("No GPS data in {} byte upload", size),
    }

    Ok(Json(GpsResponse {
        coordinates: fix.map(|f| f.coordinates),
        source: fix.map(|f| f.source),
    }))
}
