use serde::{Deserialize, Serialize};

/// A photo location in decimal degrees.
///
/// `(0, 0)` is the "no data" value written by cameras without a fix, so it is
/// rejected along with out-of-range values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "UncheckedCoordinate")]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct UncheckedCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<UncheckedCoordinate> for GeoCoordinate {
    type Error = String;

    fn try_from(c: UncheckedCoordinate) -> Result<Self, Self::Error> {
        GeoCoordinate::new(c.latitude, c.longitude)
    }
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(format!(
                "Non-finite coordinates: ({}, {})",
                latitude, longitude
            ));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                latitude
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                longitude
            ));
        }
        if latitude == 0.0 && longitude == 0.0 {
            return Err("Coordinates (0, 0) carry no location".to_string());
        }
        Ok(GeoCoordinate {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Round coordinates to specified decimal places for display. Fails when
    /// rounding lands on `(0, 0)`.
    pub fn round(&self, decimal_places: u32) -> Result<Self, String> {
        let multiplier = 10_f64.powi(decimal_places as i32);
        GeoCoordinate::new(
            (self.latitude * multiplier).round() / multiplier,
            (self.longitude * multiplier).round() / multiplier,
        )
    }
}
