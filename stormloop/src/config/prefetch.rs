//! Bulk prefetch configuration.

use super::defaults::DEFAULT_COALESCE_CHANNEL_CAPACITY;

/// Concurrency settings for the bulk prefetch.
///
/// By default every snapshot is requested at once. Large indexes can cap
/// the number of in-flight snapshot loads with [`with_max_concurrent`].
///
/// [`with_max_concurrent`]: PrefetchConfig::with_max_concurrent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchConfig {
    max_concurrent: Option<usize>,
    coalesce_channel_capacity: usize,
}

impl PrefetchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of concurrent snapshot loads (minimum 1).
    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = Some(limit.max(1));
        self
    }

    /// Remove any concurrency cap.
    pub fn unbounded(mut self) -> Self {
        self.max_concurrent = None;
        self
    }

    /// Set the broadcast capacity used for coalesced loads (minimum 1).
    pub fn with_coalesce_channel_capacity(mut self, capacity: usize) -> Self {
        self.coalesce_channel_capacity = capacity.max(1);
        self
    }

    pub fn max_concurrent(&self) -> Option<usize> {
        self.max_concurrent
    }

    pub fn coalesce_channel_capacity(&self) -> usize {
        self.coalesce_channel_capacity
    }
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: None,
            coalesce_channel_capacity: DEFAULT_COALESCE_CHANNEL_CAPACITY,
        }
    }
}
