//! Fully loaded snapshot content.

use super::report::Report;
use super::trajectory::TrajectoryDocument;

/// The materialized content of one [`SnapshotDescriptor`].
///
/// Built once by the content loader and never mutated afterwards; the
/// snapshot cache hands out shared `Arc<LoadedSnapshot>` references.
///
/// [`SnapshotDescriptor`]: super::SnapshotDescriptor
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSnapshot {
    pub timestamp: i64,
    pub display_date: String,
    /// One document per trajectory reference, in the same order.
    pub trajectories: Vec<TrajectoryDocument>,
    /// `None` if the descriptor has no report or it could not be fetched.
    pub report: Option<Report>,
}

impl LoadedSnapshot {
    /// Names of the tracked systems in this snapshot, in trajectory order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.trajectories
            .iter()
            .map(|doc| doc.cyclone_trajectory.cyclone_name.as_str())
    }
}
