//! Stable application-wide constants.
//!
//! Values here are structural invariants, binary-format constants, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! Runtime tuning lives in [`Config`](crate::config::Config).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Draft persistence defaults ---

/// Default draft snapshot TTL: 7 days. Overridden by `DRAFT_TTL_SECONDS`.
pub const DEFAULT_DRAFT_TTL_SECONDS: u64 = 604_800;
/// Delay after the last mutation before an autosave write. Overridden by
/// `DRAFT_AUTOSAVE_DEBOUNCE_MS`.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 1_000;
/// Maximum entries held by the in-memory draft store.
pub const DEFAULT_MEMORY_STORE_MAX_ENTRIES: u64 = 10_000;
/// Prefix of every draft storage key.
pub const DRAFT_KEY_PREFIX: &str = "gsyrocks:draft:";
/// Grade preselected for a new route.
pub const DEFAULT_GRADE: &str = "6A";

// --- Route drawing ---

/// Minimum pixel distance between consecutive captured points. Overridden by
/// `MIN_POINT_SPACING_PX`.
pub const DEFAULT_MIN_POINT_SPACING_PX: f64 = 4.0;
/// Minimum number of points for a drawable route.
pub const MIN_ROUTE_POINTS: usize = 2;
/// Legacy point sequences whose largest component is at most this value are
/// assumed to already be normalized.
pub const LEGACY_NORMALIZED_MAX: f64 = 1.2;

// --- Uploads ---

/// Maximum accepted image body for GPS extraction: 25 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

// --- JPEG / TIFF layout ---

/// JPEG start-of-image marker.
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
/// Identifier at the start of an EXIF APP1 payload (the sixth byte is padding).
pub const EXIF_HEADER: &[u8; 5] = b"Exif\0";
/// TIFF magic number following the byte-order mark.
pub const TIFF_MAGIC: u16 = 42;
/// IFD0 tag pointing at the GPS IFD.
pub const TAG_GPS_IFD_POINTER: u16 = 0x8825;
pub const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
pub const TAG_GPS_LATITUDE: u16 = 0x0002;
pub const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
pub const TAG_GPS_LONGITUDE: u16 = 0x0004;
/// Upper bound on directory entries read from a single IFD. Real GPS IFDs
/// hold a few dozen at most.
pub const MAX_IFD_ENTRIES: usize = 512;
