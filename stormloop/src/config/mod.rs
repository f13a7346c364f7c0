//! Configuration types for stormloop components.
//!
//! Each struct groups the parameters of one concern and follows the same
//! builder convention: `new()` equals `default()`, `with_*` setters consume
//! and return `self`, and plain getters read the values back.
//!
//! # Example
//!
//! ```
//! use stormloop::config::{PlaybackConfig, PrefetchConfig, ReplayConfig, SourceConfig};
//!
//! let config = ReplayConfig::new(SourceConfig::new("https://data.example.org/api"))
//!     .with_playback(PlaybackConfig::new().with_initial_speed_ms(500).with_looping(false))
//!     .with_prefetch(PrefetchConfig::new().with_max_concurrent(8));
//!
//! assert_eq!(config.playback().initial_speed_ms(), 500);
//! assert_eq!(config.prefetch().max_concurrent(), Some(8));
//! ```

pub mod defaults;
mod playback;
mod prefetch;
mod source;

pub use playback::PlaybackConfig;
pub use prefetch::PrefetchConfig;
pub use source::SourceConfig;

/// Complete configuration for one replay session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayConfig {
    source: SourceConfig,
    playback: PlaybackConfig,
    prefetch: PrefetchConfig,
}

impl ReplayConfig {
    /// Creates a session configuration for the given data source with
    /// default playback and prefetch settings.
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            playback: PlaybackConfig::default(),
            prefetch: PrefetchConfig::default(),
        }
    }

    /// Replaces the playback settings.
    pub fn with_playback(mut self, playback: PlaybackConfig) -> Self {
        self.playback = playback;
        self
    }

    /// Replaces the prefetch settings.
    pub fn with_prefetch(mut self, prefetch: PrefetchConfig) -> Self {
        self.prefetch = prefetch;
        self
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    pub fn playback(&self) -> &PlaybackConfig {
        &self.playback
    }

    pub fn prefetch(&self) -> &PrefetchConfig {
        &self.prefetch
    }
}
