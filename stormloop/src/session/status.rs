//! Observable session state.

use std::fmt;
use std::sync::Arc;

use crate::model::{LoadedSnapshot, SnapshotDescriptor};
use crate::prefetch::PrefetchProgress;

/// Loading phase of a session, published through a watch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingStatus {
    /// Not started yet.
    Idle,
    LoadingIndex,
    Prefetching { completed: usize, total: usize },
    /// Playback is available. `failed` snapshots have no data.
    Ready { frames: usize, failed: usize },
    /// A fatal error; playback stays disabled until a successful restart.
    Failed(String),
    Closed,
}

impl LoadingStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// True while the session is loading.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::LoadingIndex | Self::Prefetching { .. })
    }

    /// True if `start()` may run from this state.
    pub(super) fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed(_))
    }
}

impl fmt::Display for LoadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::LoadingIndex => write!(f, "Loading index..."),
            Self::Prefetching { completed, total } => {
                let progress = PrefetchProgress {
                    completed: *completed,
                    total: *total,
                };
                write!(
                    f,
                    "Prefetching... {}/{} ({}%)",
                    completed,
                    total,
                    progress.percent()
                )
            }
            Self::Ready { frames, failed: 0 } => write!(f, "Ready: {} frames", frames),
            Self::Ready { frames, failed } => write!(
                f,
                "Ready: {} frames ({} unavailable)",
                frames, failed
            ),
            Self::Failed(message) => write!(f, "Error: {}", message),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// The frame playback is currently showing.
#[derive(Debug, Clone)]
pub struct CurrentFrame {
    pub index: usize,
    pub descriptor: SnapshotDescriptor,
    /// `None` when the snapshot failed to load: no data for this frame.
    pub snapshot: Option<Arc<LoadedSnapshot>>,
}

impl CurrentFrame {
    pub fn has_data(&self) -> bool {
        self.snapshot.is_some()
    }
}
