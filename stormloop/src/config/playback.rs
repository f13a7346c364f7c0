//! Playback timing configuration.

use super::defaults::{DEFAULT_LOOPING, DEFAULT_SPEED_MS, MAX_SPEED_MS, MIN_SPEED_MS};

/// Frame timing and loop behavior for the playback scheduler.
///
/// # Example
///
/// ```
/// use stormloop::config::PlaybackConfig;
///
/// let config = PlaybackConfig::new().with_speed_range(50, 1000);
/// assert_eq!(config.clamp_speed(10), 50);
/// assert_eq!(config.clamp_speed(5000), 1000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackConfig {
    initial_speed_ms: u64,
    min_speed_ms: u64,
    max_speed_ms: u64,
    looping: bool,
}

impl PlaybackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame interval used when playback starts. Default: 200ms.
    pub fn with_initial_speed_ms(mut self, ms: u64) -> Self {
        self.initial_speed_ms = ms;
        self
    }

    /// Set the allowed frame interval range. An inverted range is swapped
    /// and both bounds are at least 1ms. Default: 100ms to 3000ms.
    pub fn with_speed_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_speed_ms = min_ms.min(max_ms).max(1);
        self.max_speed_ms = min_ms.max(max_ms).max(1);
        self
    }

    /// Set whether playback wraps to the first frame. Default: true.
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Initial frame interval, clamped into the allowed range.
    pub fn initial_speed_ms(&self) -> u64 {
        self.clamp_speed(self.initial_speed_ms)
    }

    pub fn min_speed_ms(&self) -> u64 {
        self.min_speed_ms
    }

    pub fn max_speed_ms(&self) -> u64 {
        self.max_speed_ms
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Clamp a requested frame interval into `[min_speed_ms, max_speed_ms]`.
    pub fn clamp_speed(&self, ms: u64) -> u64 {
        ms.clamp(self.min_speed_ms, self.max_speed_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            initial_speed_ms: DEFAULT_SPEED_MS,
            min_speed_ms: MIN_SPEED_MS,
            max_speed_ms: MAX_SPEED_MS,
            looping: DEFAULT_LOOPING,
        }
    }
}
