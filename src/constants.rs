//! Stable application-wide constants.
//!
//! Values here are structural invariants and default fallbacks for
//! env-var-based configuration. Business assumptions that operators may want
//! to override (country scope, fallback speed) are surfaced again through
//! [`Config`](crate::config::Config).

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP facade.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP facade.
pub const DEFAULT_PORT: &str = "3000";

// --- Outbound HTTP ---

/// Default request timeout for routing, geocoding and icon fetches.
/// A timeout is treated like any other transport failure.
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;
/// User agent sent to third-party services (Nominatim rejects anonymous clients).
pub const DEFAULT_USER_AGENT: &str = concat!("fieldmap/", env!("CARGO_PKG_VERSION"));

// --- Routing ---

/// Directions endpoint (OSRM-compatible, profile and coordinates appended).
pub const DEFAULT_ROUTING_BASE_URL: &str = "https://router.project-osrm.org/route/v1";
/// Average speed assumed when synthesizing a straight-line fallback route.
/// Overridden by `FALLBACK_SPEED_KMH`.
pub const DEFAULT_FALLBACK_SPEED_KMH: f64 = 50.0;

// --- Geocoding ---

/// Nominatim-compatible search service.
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
/// Country scope for forward searches (ISO 3166-1 alpha-2, comma separated).
/// Overridden by `GEOCODER_COUNTRY_CODES`.
pub const DEFAULT_GEOCODER_COUNTRY_CODES: &str = "fr";

// --- Icons ---

/// Origin serving the static icon assets.
pub const DEFAULT_ICON_BASE_URL: &str = "http://localhost:8080";
/// Path prefix of the icon assets; the canonical name and `.svg` are appended.
pub const ICON_ASSET_PATH_PREFIX: &str = "/assets/map-icons";
/// How long a fetched icon is kept for coalescing repeated signals.
pub const DEFAULT_ICON_CACHE_TTL_SECONDS: u64 = 300;
/// Upper bound on cached icon images.
pub const DEFAULT_ICON_CACHE_MAX_ENTRIES: u64 = 256;

// --- Route overlay styling ---

pub const ROUTE_LINE_COLOR: &str = "#3b82f6";
pub const ROUTE_LINE_WIDTH: f64 = 5.0;
pub const ROUTE_LINE_OPACITY: f64 = 0.8;
/// Padding (pixels) applied when fitting the view to a displayed route.
pub const ROUTE_FIT_PADDING_PX: u32 = 50;

// --- Location tracking ---

/// Zoom applied by the tracker when it first centers on the device position.
pub const TRACKING_ZOOM: f64 = 16.0;
/// Marker colour of the live-position marker.
pub const TRACKING_MARKER_COLOR: &str = "#ef4444";
/// Default maximum wait for a position fix.
pub const DEFAULT_POSITION_TIMEOUT_MS: u64 = 10_000;

// --- Map defaults ---

/// Style used when a map is created without an explicit style URL.
pub const DEFAULT_MAP_STYLE: &str = "liberty";
