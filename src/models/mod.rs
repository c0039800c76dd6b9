pub mod coordinates;
pub mod draft;
pub mod point;
pub mod route;

pub use coordinates::GeoCoordinate;
pub use draft::{now_millis, CanvasDraftSnapshot, DraftKey};
pub use point::{BoundsError, ContentRect, ImageBounds, NormalizedPoint, PixelPoint, RoutePoint};
pub use route::DraftRoute;
