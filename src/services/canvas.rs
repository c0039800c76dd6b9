//! Conversion between canvas pixel space and image-normalized space.
//!
//! The photo is shown with contain-fit inside its container, so the image
//! content may be letterboxed or pillarboxed. Normalized coordinates are
//! always relative to the content rectangle, never to the container.

use crate::constants::LEGACY_NORMALIZED_MAX;
use crate::models::{ImageBounds, NormalizedPoint, PixelPoint, RoutePoint};

/// Normalize one pixel position. Positions over the bars are clamped onto
/// the nearest content edge.
pub fn normalize_point(point: PixelPoint, bounds: &ImageBounds) -> NormalizedPoint {
    let rect = bounds.content_rect();
    NormalizedPoint::clamped(
        (point.x - rect.x) / rect.width,
        (point.y - rect.y) / rect.height,
    )
}

pub fn denormalize_point(point: NormalizedPoint, bounds: &ImageBounds) -> PixelPoint {
    let rect = bounds.content_rect();
    PixelPoint::new(
        rect.x + point.x() * rect.width,
        rect.y + point.y() * rect.height,
    )
}

pub fn normalize(points: &[PixelPoint], bounds: &ImageBounds) -> Vec<NormalizedPoint> {
    points.iter().map(|p| normalize_point(*p, bounds)).collect()
}

pub fn denormalize(points: &[NormalizedPoint], bounds: &ImageBounds) -> Vec<PixelPoint> {
    points.iter().map(|p| denormalize_point(*p, bounds)).collect()
}

/// Whether an untagged sequence looks normalized already. The threshold is
/// above 1.0 to tolerate slight overshoot from older clients.
pub fn looks_normalized(points: &[RoutePoint]) -> bool {
    points
        .iter()
        .all(|p| p.x.abs() <= LEGACY_NORMALIZED_MAX && p.y.abs() <= LEGACY_NORMALIZED_MAX)
}

/// Normalize stored points whose space was never recorded.
///
/// Sequences that look normalized are clamped and returned as-is, which
/// makes the call idempotent; anything else is treated as pixels.
pub fn normalize_legacy(points: &[RoutePoint], bounds: &ImageBounds) -> Vec<NormalizedPoint> {
    if looks_normalized(points) {
        points
            .iter()
            .map(|p| NormalizedPoint::clamped(p.x, p.y))
            .collect()
    } else {
        points
            .iter()
            .map(|p| normalize_point(PixelPoint::new(p.x, p.y), bounds))
            .collect()
    }
}
