//! Prefetch progress and summary types.

use crate::loader::SnapshotError;

/// Progress of a running prefetch, reported after each snapshot settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefetchProgress {
    /// Snapshots that have succeeded or failed so far.
    pub completed: usize,
    pub total: usize,
}

impl PrefetchProgress {
    /// Completion as a whole percentage, rounded to nearest.
    ///
    /// ```
    /// use stormloop::prefetch::PrefetchProgress;
    ///
    /// assert_eq!(PrefetchProgress { completed: 1, total: 3 }.percent(), 33);
    /// assert_eq!(PrefetchProgress { completed: 2, total: 3 }.percent(), 67);
    /// assert_eq!(PrefetchProgress { completed: 0, total: 0 }.percent(), 100);
    /// ```
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u8
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}

/// Summary of a finished prefetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub total: usize,
    pub succeeded: usize,
    /// Snapshots that failed, with the error each one produced.
    pub failed: Vec<(i64, SnapshotError)>,
    /// Overlay preloads that failed (never fatal).
    pub overlays_failed: usize,
}

impl PrefetchReport {
    pub(super) fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn completed(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    /// True if at least one snapshot failed.
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn failed_timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.failed.iter().map(|(timestamp, _)| *timestamp)
    }
}
