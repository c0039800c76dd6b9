pub mod autosave;
pub mod canvas;
pub mod drafts;
pub mod drawing;
pub mod gps;

pub use autosave::DraftAutosaver;
pub use drafts::DraftPersistence;
pub use drawing::{DraftPhase, DrawError, DrawingSession, RouteEdit};
pub use gps::{extract_gps, extract_gps_with_source, GpsFix, GpsSource};
