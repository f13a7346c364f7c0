//! Error types for the session module.

use thiserror::Error;

use crate::index::IndexError;
use crate::loader::SnapshotError;
use crate::prefetch::PrefetchError;
use crate::transport::TransportError;

/// Errors surfaced by [`ReplaySession`](super::ReplaySession) operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The transport could not be constructed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Prefetch(#[from] PrefetchError),

    /// An on-demand frame load failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Frame {index} is out of range ({total} frames)")]
    FrameOutOfRange { index: usize, total: usize },

    #[error("Session is already loading or loaded")]
    AlreadyStarted,

    #[error("Session closed")]
    Closed,
}

impl SessionError {
    /// True for errors that leave the session without anything to play.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Index(_) | Self::Prefetch(PrefetchError::AllFailed { .. })
        )
    }
}
