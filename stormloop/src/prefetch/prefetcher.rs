//! Concurrent prefetch driver.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::PrefetchError;
use super::progress::{PrefetchProgress, PrefetchReport};
use crate::cache::SnapshotCache;
use crate::config::PrefetchConfig;
use crate::loader::{PreloadOutcome, SnapshotError, SnapshotLoader};
use crate::model::SnapshotDescriptor;

/// Settled result of prefetching one descriptor.
struct Settled {
    timestamp: i64,
    content: Result<(), SnapshotError>,
    overlays: Vec<PreloadOutcome>,
}

/// Drives the content loader over a whole index through the cache.
pub struct Prefetcher<L> {
    cache: Arc<SnapshotCache<L>>,
    config: PrefetchConfig,
    liveness: CancellationToken,
}

impl<L: SnapshotLoader> Prefetcher<L> {
    /// Creates a prefetcher filling `cache`.
    ///
    /// A prefetch in progress stops reporting and returns
    /// [`PrefetchError::Cancelled`] once `liveness` is cancelled.
    pub fn new(
        cache: Arc<SnapshotCache<L>>,
        config: PrefetchConfig,
        liveness: CancellationToken,
    ) -> Self {
        Self {
            cache,
            config,
            liveness,
        }
    }

    /// Loads every descriptor's content and overlays into the cache.
    ///
    /// `on_progress` is called once per settled snapshot with a strictly
    /// increasing `completed` count. A snapshot settles when both its
    /// content and its overlay preloads have finished, successfully or not.
    ///
    /// # Errors
    ///
    /// - [`PrefetchError::AllFailed`] if no snapshot could be loaded
    /// - [`PrefetchError::Cancelled`] if the session was torn down
    pub async fn prefetch_all<F>(
        &self,
        descriptors: &[SnapshotDescriptor],
        mut on_progress: F,
    ) -> Result<PrefetchReport, PrefetchError>
    where
        F: FnMut(PrefetchProgress),
    {
        let total = descriptors.len();
        let limit = self.config.max_concurrent().unwrap_or(total).max(1);

        info!(
            total,
            max_concurrent = ?self.config.max_concurrent(),
            "Prefetching snapshots"
        );

        // Collected up front so the stream holds no closure across awaits,
        // which keeps this future `Send`.
        let pending: Vec<_> = descriptors.iter().map(|d| self.prefetch_one(d)).collect();
        let mut settled = stream::iter(pending).buffer_unordered(limit);
        let mut report = PrefetchReport::new(total);

        loop {
            let next = tokio::select! {
                biased;

                _ = self.liveness.cancelled() => {
                    debug!(completed = report.completed(), total, "Prefetch abandoned at teardown");
                    return Err(PrefetchError::Cancelled);
                }

                next = settled.next() => next,
            };
            let Some(outcome) = next else {
                break;
            };

            report.overlays_failed += outcome
                .overlays
                .iter()
                .filter(|o| !o.is_available())
                .count();
            match outcome.content {
                Ok(()) => report.succeeded += 1,
                Err(e) => report.failed.push((outcome.timestamp, e)),
            }

            let progress = PrefetchProgress {
                completed: report.completed(),
                total,
            };
            debug!(
                timestamp = outcome.timestamp,
                completed = progress.completed,
                total,
                percent = progress.percent(),
                "Snapshot prefetched"
            );
            on_progress(progress);
        }

        if total > 0 && report.succeeded == 0 {
            warn!(total, "Every snapshot failed to load");
            return Err(PrefetchError::AllFailed { total });
        }

        if report.is_partial() {
            warn!(
                failed = report.failed.len(),
                succeeded = report.succeeded,
                total,
                "Prefetch finished with missing snapshots; their frames will have no data"
            );
        } else {
            info!(total, overlays_failed = report.overlays_failed, "Prefetch complete");
        }

        Ok(report)
    }

    async fn prefetch_one(&self, descriptor: &SnapshotDescriptor) -> Settled {
        let (content, overlays) = futures::join!(
            self.cache.get_or_load(descriptor),
            self.cache.loader().preload_overlays(descriptor)
        );
        Settled {
            timestamp: descriptor.timestamp,
            content: content.map(|_| ()),
            overlays,
        }
    }
}
