//! Default values and constants for all configuration settings.

// =============================================================================
// Source defaults
// =============================================================================

/// Default index resource path, relative to the base URL.
pub const DEFAULT_INDEX_PATH: &str = "api_data.json";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Playback defaults
// =============================================================================

/// Default frame interval in milliseconds.
pub const DEFAULT_SPEED_MS: u64 = 200;

/// Fastest allowed frame interval in milliseconds.
pub const MIN_SPEED_MS: u64 = 100;

/// Slowest allowed frame interval in milliseconds.
pub const MAX_SPEED_MS: u64 = 3000;

/// Playback loops back to the first frame by default.
pub const DEFAULT_LOOPING: bool = true;

// =============================================================================
// Prefetch defaults
// =============================================================================

/// Broadcast channel capacity for coalesced snapshot loads.
/// Only one message is ever sent per channel, so this just needs to be >= 1.
pub const DEFAULT_COALESCE_CHANNEL_CAPACITY: usize = 16;
