//! Snapshot data model.
//!
//! - [`SnapshotDescriptor`]: one immutable index entry naming the resources
//!   that make up a snapshot.
//! - [`LoadedSnapshot`]: the fully materialized content of one descriptor,
//!   owned by the snapshot cache once created.
//! - [`TrajectoryDocument`] / [`Report`]: typed views of the per-reference
//!   JSON documents.

mod descriptor;
mod report;
mod snapshot;
mod trajectory;

pub use descriptor::{BoundingBox, OverlayRef, SnapshotDescriptor};
pub use report::{BlockKind, Report, ReportBlock, REPORT_SEPARATOR};
pub use snapshot::LoadedSnapshot;
pub use trajectory::{
    CycloneData, DataType, Dvorak, Feature, FeatureProperties, Geometry, MaximumWind, Trajectory,
    TrajectoryDocument,
};
