//! GPS extraction from uploaded image bytes.
//!
//! Several independent strategies are tried in a fixed order and the first
//! one producing a valid coordinate wins. A strategy that fails, or panics
//! on a hostile file, only moves the waterfall on to the next one.

pub mod container;
pub mod reconcile;
mod strategies;
mod tiff;
pub mod xmp;

#[cfg(test)]
mod fixtures;

use crate::models::GeoCoordinate;
use container::ImageKind;
use reconcile::{reconcile, RawCoordinate};
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Which strategy produced a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GpsSource {
    Container,
    GpsTagScan,
    StructuredTiff,
    XmpSearch,
    Rexif,
    NomExif,
    HandRolled,
}

impl GpsSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            GpsSource::Container => "container",
            GpsSource::GpsTagScan => "gps_tag_scan",
            GpsSource::StructuredTiff => "structured_tiff",
            GpsSource::XmpSearch => "xmp_search",
            GpsSource::Rexif => "rexif",
            GpsSource::NomExif => "nom_exif",
            GpsSource::HandRolled => "hand_rolled",
        }
    }
}

impl std::fmt::Display for GpsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsFix {
    pub coordinates: GeoCoordinate,
    pub source: GpsSource,
}

/// What every strategy receives.
pub struct ImageInput<'a> {
    pub bytes: &'a [u8],
    pub mime_hint: Option<&'a str>,
}

/// Position tags gathered by a strategy, resolved in one place so every
/// strategy applies the same sign and range rules.
#[derive(Debug, Clone, Default)]
pub(crate) struct GpsFields {
    pub latitude: Option<RawCoordinate>,
    pub latitude_ref: Option<String>,
    pub longitude: Option<RawCoordinate>,
    pub longitude_ref: Option<String>,
}

impl GpsFields {
    pub fn resolve(&self) -> Option<GeoCoordinate> {
        reconcile(
            self.latitude.as_ref()?,
            self.latitude_ref.as_deref(),
            self.longitude.as_ref()?,
            self.longitude_ref.as_deref(),
        )
    }
}

type Strategy = fn(&ImageInput<'_>) -> Option<GeoCoordinate>;

const WATERFALL: [(GpsSource, Strategy); 7] = [
    (GpsSource::Container, strategies::container),
    (GpsSource::GpsTagScan, strategies::gps_tag_scan),
    (GpsSource::StructuredTiff, strategies::structured_tiff),
    (GpsSource::XmpSearch, strategies::xmp_search),
    (GpsSource::Rexif, strategies::rexif),
    (GpsSource::NomExif, strategies::nom_exif),
    (GpsSource::HandRolled, strategies::hand_rolled),
];

fn run_strategy(
    source: GpsSource,
    strategy: Strategy,
    input: &ImageInput<'_>,
) -> Option<GeoCoordinate> {
    match catch_unwind(AssertUnwindSafe(|| strategy(input))) {
        Ok(Some(coord)) => Some(coord),
        Ok(None) => {
            tracing::debug!("GPS strategy {} found nothing", source);
            None
        }
        Err(_) => {
            tracing::warn!("GPS strategy {} panicked, moving on", source);
            None
        }
    }
}

/// Extract GPS coordinates along with the strategy that found them.
///
/// Never fails: unreadable or GPS-less input yields `None`.
pub fn extract_gps_with_source(bytes: &[u8], mime_hint: Option<&str>) -> Option<GpsFix> {
    if bytes.is_empty() {
        return None;
    }

    let sniffed = ImageKind::sniff(bytes);
    if let Some(mime) = mime_hint {
        let declared = ImageKind::from_mime(mime);
        if declared != ImageKind::Unknown && declared != sniffed {
            tracing::debug!(
                "Declared type {} does not match content ({:?}), trusting content",
                mime,
                sniffed
            );
        }
    }

    let input = ImageInput { bytes, mime_hint };
    for (source, strategy) in WATERFALL {
        if let Some(coordinates) = run_strategy(source, strategy, &input) {
            tracing::info!(
                "GPS found by {}: {:.6}, {:.6}",
                source,
                coordinates.latitude(),
                coordinates.longitude()
            );
            return Some(GpsFix { coordinates, source });
        }
    }

    tracing::debug!("No GPS data in {} byte {:?} image", bytes.len(), sniffed);
    None
}

/// Extract GPS coordinates from an image buffer.
pub fn extract_gps(bytes: &[u8], mime_hint: Option<&str>) -> Option<GeoCoordinate> {
    extract_gps_with_source(bytes, mime_hint).map(|fix| fix.coordinates)
}
