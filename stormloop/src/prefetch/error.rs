//! Error types for the prefetch module.

use thiserror::Error;

/// Errors that end a bulk prefetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefetchError {
    /// Every snapshot failed to load; there is nothing to play.
    #[error("Prefetch failed: all {total} snapshots failed to load")]
    AllFailed { total: usize },

    /// The session was torn down while prefetching.
    #[error("Prefetch abandoned: session closed")]
    Cancelled,
}
