//! Loader trait used by the snapshot cache.

use std::future::Future;

use super::error::SnapshotError;
use super::overlay::PreloadOutcome;
use crate::model::{LoadedSnapshot, SnapshotDescriptor};

/// Resolves one descriptor into loaded content.
///
/// The snapshot cache is generic over this trait so tests can count and
/// control loads without any transport.
pub trait SnapshotLoader: Send + Sync + 'static {
    /// Loads the content (trajectories and report) of one snapshot.
    fn load(
        &self,
        descriptor: &SnapshotDescriptor,
    ) -> impl Future<Output = Result<LoadedSnapshot, SnapshotError>> + Send;

    /// Preloads the raster overlays referenced by the descriptor.
    ///
    /// Always completes; individual failures are reported in the outcomes.
    fn preload_overlays(
        &self,
        descriptor: &SnapshotDescriptor,
    ) -> impl Future<Output = Vec<PreloadOutcome>> + Send {
        let _ = descriptor;
        std::future::ready(Vec::new())
    }
}
