//! Content loader backed by an HTTP transport.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::SnapshotError;
use super::overlay::{OverlayPreloader, PreloadOutcome};
use super::traits::SnapshotLoader;
use crate::model::{LoadedSnapshot, Report, SnapshotDescriptor, TrajectoryDocument};
use crate::transport::{join_url, AsyncHttpClient};

/// Fetches the documents referenced by a descriptor beneath a base URL.
///
/// Every trajectory document is required: one failed fetch or parse fails
/// the whole snapshot. The report is optional and degrades to `None`.
pub struct ContentLoader<C> {
    client: Arc<C>,
    base_url: String,
    overlays: Arc<OverlayPreloader<C>>,
}

impl<C: AsyncHttpClient> ContentLoader<C> {
    /// Creates a loader resolving paths beneath `base_url`.
    ///
    /// # Arguments
    ///
    /// * `client` - Transport shared with the index loader and preloader
    /// * `base_url` - Root that every relative path is joined onto
    /// * `overlays` - Preloader used for the descriptor's raster overlays
    pub fn new(
        client: Arc<C>,
        base_url: impl Into<String>,
        overlays: Arc<OverlayPreloader<C>>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            overlays,
        }
    }

    /// The overlay preloader this loader dispatches to.
    pub fn overlays(&self) -> &Arc<OverlayPreloader<C>> {
        &self.overlays
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, String> {
        let url = join_url(&self.base_url, path);
        let body = self
            .client
            .get(&url)
            .await
            .map_err(|e| format!("{}: {}", path, e))?;
        serde_json::from_slice(&body).map_err(|e| format!("{}: invalid document: {}", path, e))
    }

    async fn fetch_trajectory(
        &self,
        timestamp: i64,
        path: &str,
    ) -> Result<TrajectoryDocument, SnapshotError> {
        self.fetch_json(path)
            .await
            .map_err(|reason| SnapshotError::LoadFailed { timestamp, reason })
    }

    async fn fetch_report(&self, timestamp: i64, path: Option<&str>) -> Option<Report> {
        let path = path?;
        match self.fetch_json(path).await {
            Ok(report) => Some(report),
            Err(reason) => {
                warn!(timestamp, reason = %reason, "Report unavailable, continuing without it");
                None
            }
        }
    }
}

impl<C: AsyncHttpClient> SnapshotLoader for ContentLoader<C> {
    async fn load(&self, descriptor: &SnapshotDescriptor) -> Result<LoadedSnapshot, SnapshotError> {
        let timestamp = descriptor.timestamp;

        let trajectories = try_join_all(
            descriptor
                .trajectory_refs
                .iter()
                .map(|path| self.fetch_trajectory(timestamp, path)),
        );
        let report = self.fetch_report(timestamp, descriptor.report_ref.as_deref());
        let (trajectories, report) = futures::join!(trajectories, report);
        let trajectories = trajectories?;

        debug!(
            timestamp,
            trajectories = trajectories.len(),
            has_report = report.is_some(),
            "Snapshot content loaded"
        );

        Ok(LoadedSnapshot {
            timestamp,
            display_date: descriptor.display_date.clone(),
            trajectories,
            report,
        })
    }

    async fn preload_overlays(&self, descriptor: &SnapshotDescriptor) -> Vec<PreloadOutcome> {
        join_all(
            descriptor
                .overlay_refs
                .iter()
                .map(|overlay| self.overlays.preload(&overlay.file)),
        )
        .await
    }
}
