//! Stable application-wide constants.
//!
//! Values here are scheduling floors, heuristic coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! For tuning knobs that benefit from runtime experimentation, see
//! [`PlannerConfig`](crate::config::PlannerConfig) and
//! [`RankerConfig`](crate::config::RankerConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- Show timing floors ---
// Configured values below these are raised to them before any scheduling.

/// Shortest show the engine will schedule.
pub const MIN_SHOW_DURATION_MIN: i64 = 60;
/// Doors never open later than this many minutes before the start.
pub const MIN_DOORS_BEFORE_MIN: i64 = 30;
/// The attendee is at the venue at least this long before the start.
pub const MIN_ARRIVAL_BUFFER_MIN: i64 = 45;

// --- Request limits ---

/// Upper bound on any minute field in a request (show, doors, buffer, stop).
pub const MAX_TIMING_MIN: i64 = 24 * 60;
/// Most custom stops one evening may carry.
pub const MAX_CUSTOM_STOPS: usize = 20;
/// Show starts outside these years are rejected.
pub const MIN_SHOW_YEAR: i32 = 1900;
pub const MAX_SHOW_YEAR: i32 = 2999;

// --- Show timing defaults (request fields left out) ---

pub const DEFAULT_SHOW_DURATION_MIN: i64 = 150;
pub const DEFAULT_DOORS_BEFORE_MIN: i64 = 90;
pub const DEFAULT_ARRIVAL_BUFFER_MIN: i64 = 45;
/// Dwell at a custom must-visit stop when the request does not say.
pub const DEFAULT_STOP_DURATION_MIN: i64 = 30;

// --- Geometric travel heuristic ---

/// No leg is ever estimated shorter than this.
pub const MIN_TRAVEL_MINUTES: u32 = 4;
/// No leg is ever scheduled longer than this (one year).
pub const MAX_TRAVEL_MINUTES: u32 = 525_600;
/// Assumed city driving speed, door to door.
pub const DRIVING_SPEED_MPH: f64 = 22.0;
/// Assumed walking speed.
pub const WALKING_SPEED_MPH: f64 = 3.0;

// --- Travel estimate cache ---

/// Default travel estimate cache TTL: 15 minutes. Overridden by `TRAVEL_CACHE_TTL`.
pub const DEFAULT_TRAVEL_CACHE_TTL_SECONDS: u64 = 900;
/// Default wait on the live routing service before falling back.
/// Overridden by `TRAVEL_LOOKUP_TIMEOUT_MS`.
pub const DEFAULT_TRAVEL_LOOKUP_TIMEOUT_MS: u64 = 2_500;
/// Maximum cached legs.
pub const DEFAULT_TRAVEL_CACHE_MAX_ENTRIES: u64 = 10_000;
/// Decimal places kept when bucketing coordinates for cache keys (~11m).
pub const TRAVEL_CACHE_COORD_PRECISION: u32 = 4;

// --- Doors-open extras (minutes after doors open) ---

pub const MERCH_WINDOW_MIN: (i64, i64) = (0, 20);
pub const CONCESSIONS_WINDOW_MIN: (i64, i64) = (20, 35);
pub const HYDRATION_WINDOW_MIN: (i64, i64) = (35, 40);

// --- Candidate ranking ---

/// Proximity bonus reaches zero at this distance from the anchor.
pub const PROXIMITY_DECAY_MILES: f64 = 1.6;
/// Ratings are scored as deviation from this midpoint.
pub const RATING_MIDPOINT: f64 = 4.0;

// --- Place discovery (Overpass) ---

pub const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 25;
pub const OVERPASS_RETRY_MAX_ATTEMPTS: usize = 1;
pub const OVERPASS_RESULT_LIMIT: usize = 200;
