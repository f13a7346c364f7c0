//! Error types for snapshot loading.

use thiserror::Error;

/// Errors that can occur while loading one snapshot.
///
/// `Clone` so one failure can be delivered to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// A required resource of the snapshot could not be fetched or parsed.
    #[error("Snapshot {timestamp} failed to load: {reason}")]
    LoadFailed { timestamp: i64, reason: String },

    /// The load finished after its session was torn down and was discarded.
    #[error("Snapshot {timestamp} load discarded: session closed")]
    Cancelled { timestamp: i64 },
}

impl SnapshotError {
    /// Timestamp of the snapshot the error belongs to.
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::LoadFailed { timestamp, .. } | Self::Cancelled { timestamp } => *timestamp,
        }
    }
}
