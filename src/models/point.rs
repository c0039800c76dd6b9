use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An untagged point as found in legacy stored data. Whether it is in pixel
/// or normalized space is not recorded; see
/// [`normalize_legacy`](crate::services::canvas::normalize_legacy).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RoutePoint {
    pub x: f64,
    pub y: f64,
}

/// A pointer position in canvas pixels, relative to the container's top-left.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PixelPoint { x, y }
    }

    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A point expressed as fractions of the image content's width and height.
/// Both components always lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RoutePoint", into = "RoutePoint")]
pub struct NormalizedPoint {
    x: f64,
    y: f64,
}

impl NormalizedPoint {
    /// Build a point, clamping each component into `[0, 1]`.
    /// Non-finite components become 0.
    pub fn clamped(x: f64, y: f64) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        NormalizedPoint {
            x: clamp(x),
            y: clamp(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

impl TryFrom<RoutePoint> for NormalizedPoint {
    type Error = String;

    fn try_from(p: RoutePoint) -> Result<Self, Self::Error> {
        let in_range = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if in_range(p.x) && in_range(p.y) {
            Ok(NormalizedPoint { x: p.x, y: p.y })
        } else {
            Err(format!(
                "Normalized point ({}, {}) outside [0, 1]",
                p.x, p.y
            ))
        }
    }
}

impl From<NormalizedPoint> for RoutePoint {
    fn from(p: NormalizedPoint) -> Self {
        RoutePoint { x: p.x, y: p.y }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BoundsError {
    #[error("Image bounds must be finite and positive, got {field} = {value}")]
    NonPositive { field: &'static str, value: f64 },
}

/// Geometry of an image displayed inside a container with `object-fit: contain`
/// semantics. `display_*` is the container, `natural_*` the intrinsic image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBounds {
    display_width: f64,
    display_height: f64,
    natural_width: f64,
    natural_height: f64,
}

/// The part of the container actually covered by image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ImageBounds {
    pub fn new(
        display_width: f64,
        display_height: f64,
        natural_width: f64,
        natural_height: f64,
    ) -> Result<Self, BoundsError> {
        for (field, value) in [
            ("display_width", display_width),
            ("display_height", display_height),
            ("natural_width", natural_width),
            ("natural_height", natural_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BoundsError::NonPositive { field, value });
            }
        }
        Ok(ImageBounds {
            display_width,
            display_height,
            natural_width,
            natural_height,
        })
    }

    /// Scale the image to fit entirely inside the container and center it.
    /// The leftover space forms letterbox (top/bottom) or pillarbox
    /// (left/right) bars.
    pub fn content_rect(&self) -> ContentRect {
        let scale = (self.display_width / self.natural_width)
            .min(self.display_height / self.natural_height);
        let width = self.natural_width * scale;
        let height = self.natural_height * scale;
        ContentRect {
            x: (self.display_width - width) / 2.0,
            y: (self.display_height - height) / 2.0,
            width,
            height,
        }
    }
}
