//! The replay session orchestrator.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::error::SessionError;
use super::status::{CurrentFrame, LoadingStatus};
use crate::cache::SnapshotCache;
use crate::config::ReplayConfig;
use crate::index::MetadataIndex;
use crate::loader::{ContentLoader, OverlayPreloader, SnapshotLoader};
use crate::model::{LoadedSnapshot, SnapshotDescriptor};
use crate::playback::PlaybackScheduler;
use crate::prefetch::{PrefetchError, PrefetchReport, Prefetcher};
use crate::transport::{AsyncHttpClient, AsyncReqwestClient};

/// One replay of a tracked event: index, prefetch, then playback.
///
/// # Example
///
/// ```ignore
/// use stormloop::config::{ReplayConfig, SourceConfig};
/// use stormloop::session::ReplaySession;
///
/// let config = ReplayConfig::new(SourceConfig::new("https://example.org/meteo-france-api"));
/// let session = ReplaySession::connect(config)?;
///
/// let mut status = session.subscribe_status();
/// tokio::spawn(async move {
///     while status.changed().await.is_ok() {
///         println!("{}", *status.borrow());
///     }
/// });
///
/// session.start().await?;
/// session.scheduler().restart();
/// ```
pub struct ReplaySession<C> {
    index: MetadataIndex<C>,
    cache: Arc<SnapshotCache<ContentLoader<C>>>,
    prefetcher: Prefetcher<ContentLoader<C>>,
    scheduler: PlaybackScheduler,
    descriptors: Mutex<Arc<Vec<SnapshotDescriptor>>>,
    status: watch::Sender<LoadingStatus>,
    frames: Arc<watch::Sender<Option<CurrentFrame>>>,
    liveness: CancellationToken,
}

impl ReplaySession<AsyncReqwestClient> {
    /// Creates a session over HTTP using the configured request timeout.
    pub fn connect(config: ReplayConfig) -> Result<Self, SessionError> {
        let client = AsyncReqwestClient::with_timeout(config.source().request_timeout_secs())?;
        Ok(Self::new(Arc::new(client), config))
    }
}

impl<C: AsyncHttpClient> ReplaySession<C> {
    /// Creates an idle session fetching through `client`.
    pub fn new(client: Arc<C>, config: ReplayConfig) -> Self {
        let liveness = CancellationToken::new();
        let source = config.source();

        let overlays = Arc::new(OverlayPreloader::new(
            Arc::clone(&client),
            source.base_url(),
            liveness.clone(),
        ));
        let loader = Arc::new(ContentLoader::new(
            Arc::clone(&client),
            source.base_url(),
            overlays,
        ));
        let cache = Arc::new(
            SnapshotCache::new(loader, liveness.clone())
                .with_channel_capacity(config.prefetch().coalesce_channel_capacity()),
        );
        let prefetcher = Prefetcher::new(Arc::clone(&cache), *config.prefetch(), liveness.clone());
        let (status, _) = watch::channel(LoadingStatus::Idle);
        let (frames, _) = watch::channel(None);

        Self {
            index: MetadataIndex::new(client, source.index_url()),
            cache,
            prefetcher,
            scheduler: PlaybackScheduler::new(*config.playback()),
            descriptors: Mutex::new(Arc::new(Vec::new())),
            status,
            frames: Arc::new(frames),
            liveness,
        }
    }

    /// Loads the index and prefetches every snapshot.
    ///
    /// On success the scheduler holds one frame per descriptor, paused at
    /// frame 0, and the status is `Ready`. Snapshots that failed to load
    /// leave gaps: their frames publish `snapshot: None`.
    ///
    /// May be called again after a failure to reload.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Index`] if the index is unavailable or malformed
    /// - [`SessionError::Prefetch`] if every snapshot failed
    /// - [`SessionError::AlreadyStarted`] if loading or loaded
    /// - [`SessionError::Closed`] if the session was shut down
    pub async fn start(&self) -> Result<PrefetchReport, SessionError> {
        self.begin()?;

        let descriptors = tokio::select! {
            biased;
            _ = self.liveness.cancelled() => return Err(SessionError::Closed),
            loaded = self.index.load() => loaded,
        };
        let descriptors = match descriptors {
            Ok(descriptors) => Arc::new(descriptors),
            Err(e) => return Err(self.fail(e.into())),
        };

        let total = descriptors.len();
        *self.descriptors.lock() = Arc::clone(&descriptors);
        self.register_frame_callback(Arc::clone(&descriptors));
        self.scheduler.set_total_frames(total);
        self.publish(LoadingStatus::Prefetching {
            completed: 0,
            total,
        });

        let report = self
            .prefetcher
            .prefetch_all(&descriptors, |progress| {
                self.publish(LoadingStatus::Prefetching {
                    completed: progress.completed,
                    total: progress.total,
                });
            })
            .await;
        let report = match report {
            Ok(report) => report,
            Err(PrefetchError::Cancelled) => return Err(SessionError::Closed),
            Err(e) => return Err(self.fail(e.into())),
        };

        self.publish_frame(&descriptors, self.scheduler.state().current_index);
        self.publish(LoadingStatus::Ready {
            frames: total,
            failed: report.failed.len(),
        });
        self.cache.log_stats();
        info!(
            frames = total,
            failed = report.failed.len(),
            "Replay session ready"
        );

        Ok(report)
    }

    /// Loads one frame on demand, bypassing the bulk prefetch.
    ///
    /// Overlays are preloaded in a detached task that never affects the
    /// result. A failure is returned to the caller and leaves playback
    /// running.
    pub async fn load_frame(&self, index: usize) -> Result<Arc<LoadedSnapshot>, SessionError> {
        if self.liveness.is_cancelled() {
            return Err(SessionError::Closed);
        }
        let descriptors = self.descriptors();
        let descriptor = descriptors
            .get(index)
            .ok_or(SessionError::FrameOutOfRange {
                index,
                total: descriptors.len(),
            })?;

        let loader = Arc::clone(self.cache.loader());
        let detached = descriptor.clone();
        tokio::spawn(async move {
            loader.preload_overlays(&detached).await;
        });

        let snapshot = self.cache.get_or_load(descriptor).await?;
        if self.current().is_some_and(|f| f.index == index && !f.has_data()) {
            self.publish_frame(&descriptors, index);
        }
        Ok(snapshot)
    }

    fn begin(&self) -> Result<(), SessionError> {
        if self.liveness.is_cancelled() {
            return Err(SessionError::Closed);
        }
        let mut started = false;
        self.status.send_if_modified(|status| {
            if status.can_start() {
                *status = LoadingStatus::LoadingIndex;
                started = true;
            }
            started
        });
        if started {
            info!(url = %self.index.url(), "Starting replay session");
            Ok(())
        } else {
            Err(SessionError::AlreadyStarted)
        }
    }

    fn fail(&self, error: SessionError) -> SessionError {
        error!(error = %error, "Replay session failed");
        self.scheduler.set_total_frames(0);
        self.publish(LoadingStatus::Failed(error.to_string()));
        error
    }

    fn register_frame_callback(&self, descriptors: Arc<Vec<SnapshotDescriptor>>) {
        let cache = Arc::clone(&self.cache);
        let frames = Arc::clone(&self.frames);
        let liveness = self.liveness.clone();
        self.scheduler.on_frame(move |index, _state| {
            if liveness.is_cancelled() {
                return;
            }
            if let Some(frame) = current_frame(&cache, &descriptors, index) {
                frames.send_replace(Some(frame));
            }
        });
    }

    fn publish_frame(&self, descriptors: &[SnapshotDescriptor], index: usize) {
        if self.liveness.is_cancelled() {
            return;
        }
        if let Some(frame) = current_frame(&self.cache, descriptors, index) {
            self.frames.send_replace(Some(frame));
        }
    }

    /// The snapshot cache shared by prefetch and on-demand loads.
    pub fn cache(&self) -> &Arc<SnapshotCache<ContentLoader<C>>> {
        &self.cache
    }
}

fn current_frame<L: SnapshotLoader>(
    cache: &SnapshotCache<L>,
    descriptors: &[SnapshotDescriptor],
    index: usize,
) -> Option<CurrentFrame> {
    let descriptor = descriptors.get(index)?;
    let snapshot = cache.get(descriptor.timestamp);
    if snapshot.is_none() {
        debug!(index, timestamp = descriptor.timestamp, "No data for frame");
    }
    Some(CurrentFrame {
        index,
        descriptor: descriptor.clone(),
        snapshot,
    })
}

impl<C> ReplaySession<C> {
    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    /// Descriptors from the loaded index (empty before `start`).
    pub fn descriptors(&self) -> Arc<Vec<SnapshotDescriptor>> {
        Arc::clone(&self.descriptors.lock())
    }

    pub fn status(&self) -> LoadingStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<LoadingStatus> {
        self.status.subscribe()
    }

    pub fn current(&self) -> Option<CurrentFrame> {
        self.frames.borrow().clone()
    }

    pub fn subscribe_frames(&self) -> watch::Receiver<Option<CurrentFrame>> {
        self.frames.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.liveness.is_cancelled()
    }

    /// Tears the session down.
    ///
    /// Disarms the playback timer and marks every in-flight load as stale
    /// so its result is discarded. Idempotent; also run on drop.
    pub fn shutdown(&self) {
        if self.liveness.is_cancelled() {
            return;
        }
        self.liveness.cancel();
        self.scheduler.shutdown();
        self.status.send_replace(LoadingStatus::Closed);
        debug!("Replay session closed");
    }

    fn publish(&self, status: LoadingStatus) {
        if self.liveness.is_cancelled() {
            warn!(status = %status, "Dropping status update after teardown");
            return;
        }
        self.status.send_replace(status);
    }
}

impl<C> Drop for ReplaySession<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlaybackConfig, SourceConfig};
    use crate::transport::{MockHttpClient, TransportError};
    use std::time::Duration;

    const BASE: &str = "https://h/api";
    const INDEX: &str = "https://h/api/api_data.json";

    fn trajectory(name: &str) -> String {
        format!(
            r#"{{"cyclone_trajectory": {{"cyclone_name": "{}", "features": []}}}}"#,
            name
        )
    }

    fn index_body(timestamps: &[i64]) -> String {
        let entries: Vec<String> = timestamps
            .iter()
            .map(|t| {
                format!(
                    r#"{{"timestamp": {t}, "date": "d{t}", "trajectory_files": ["t{t}.json"], "report_file": null}}"#
                )
            })
            .collect();
        format!("[{}]", entries.join(","))
    }

    fn client_with(timestamps: &[i64]) -> MockHttpClient {
        timestamps.iter().fold(
            MockHttpClient::new().with_body(INDEX, index_body(timestamps)),
            |client, t| client.with_body(&format!("{}/t{}.json", BASE, t), trajectory("X")),
        )
    }

    fn session(client: MockHttpClient, looping: bool) -> ReplaySession<MockHttpClient> {
        let config = ReplayConfig::new(SourceConfig::new(BASE))
            .with_playback(PlaybackConfig::new().with_looping(looping));
        ReplaySession::new(Arc::new(client), config)
    }

    #[tokio::test]
    async fn test_start_reaches_ready() {
        let session = session(client_with(&[3, 1, 2]), true);
        let mut seen = Vec::new();
        let mut status = session.subscribe_status();

        let report = session.start().await.unwrap();
        while status.has_changed().unwrap_or(false) {
            seen.push(status.borrow_and_update().clone());
        }

        assert_eq!(report.succeeded, 3);
        assert_eq!(
            session.status(),
            LoadingStatus::Ready {
                frames: 3,
                failed: 0
            }
        );
        let timestamps: Vec<i64> = session.descriptors().iter().map(|d| d.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2, 3]);
        assert_eq!(session.scheduler().state().total_frames, 3);

        let frame = session.current().unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.descriptor.timestamp, 1);
        assert!(frame.has_data());
        assert!(seen.last().is_some_and(LoadingStatus::is_ready));
    }

    #[tokio::test]
    async fn test_index_failure_is_fatal() {
        let client = MockHttpClient::new()
            .with_error(INDEX, TransportError::Http("connection refused".into()));
        let session = session(client, true);

        let err = session.start().await.unwrap_err();

        assert!(matches!(err, SessionError::Index(_)));
        assert!(err.is_fatal());
        assert!(matches!(session.status(), LoadingStatus::Failed(_)));
        assert!(session.scheduler().state().is_idle());
    }

    #[tokio::test]
    async fn test_all_snapshots_failing_disables_playback() {
        let client = MockHttpClient::new().with_body(INDEX, index_body(&[1, 2]));
        let session = session(client, true);

        let err = session.start().await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Prefetch(PrefetchError::AllFailed { total: 2 })
        ));
        assert!(session.scheduler().state().is_idle());
        session.scheduler().play();
        assert!(!session.scheduler().state().is_playing);
    }

    #[tokio::test]
    async fn test_partial_failure_leaves_gap() {
        let client = MockHttpClient::new()
            .with_body(INDEX, index_body(&[1, 2]))
            .with_body(&format!("{}/t2.json", BASE), trajectory("X"));
        let session = session(client, true);

        session.start().await.unwrap();

        assert_eq!(
            session.status(),
            LoadingStatus::Ready {
                frames: 2,
                failed: 1
            }
        );
        assert!(!session.current().unwrap().has_data());

        session.scheduler().go_to_frame(1);
        assert!(session.current().unwrap().has_data());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let session = session(client_with(&[1]), true);

        session.start().await.unwrap();

        assert!(matches!(
            session.start().await,
            Err(SessionError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_restart_after_failure() {
        let client = MockHttpClient::new()
            .with_error(INDEX, TransportError::Http("down".into()));
        let session = session(client, true);
        assert!(session.start().await.is_err());

        assert!(matches!(
            session.start().await,
            Err(SessionError::Index(_))
        ));
    }

    #[tokio::test]
    async fn test_load_frame_out_of_range() {
        let session = session(client_with(&[1]), true);
        session.start().await.unwrap();

        assert!(matches!(
            session.load_frame(5).await,
            Err(SessionError::FrameOutOfRange { index: 5, total: 1 })
        ));
    }

    #[tokio::test]
    async fn test_load_frame_uses_cache() {
        let client = client_with(&[1, 2]);
        let session = session(client.clone(), true);
        session.start().await.unwrap();

        let snapshot = session.load_frame(1).await.unwrap();

        assert_eq!(snapshot.timestamp, 2);
        assert_eq!(client.calls_to(&format!("{}/t2.json", BASE)), 1);
    }

    #[tokio::test]
    async fn test_load_frame_fills_gap_on_retry() {
        let client = MockHttpClient::new()
            .with_body(INDEX, index_body(&[1, 2]))
            .with_body(&format!("{}/t2.json", BASE), trajectory("X"));
        let session = session(client.clone(), true);
        session.start().await.unwrap();
        assert!(!session.current().unwrap().has_data());

        assert!(matches!(
            session.load_frame(0).await,
            Err(SessionError::Snapshot(_))
        ));

        let recovered = client.with_body(&format!("{}/t1.json", BASE), trajectory("X"));
        assert_eq!(recovered.calls_to(&format!("{}/t1.json", BASE)), 2);
        session.load_frame(0).await.unwrap();
        assert!(session.current().unwrap().has_data());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_prefetch() {
        let client = client_with(&[1, 2])
            .with_delay(&format!("{}/t2.json", BASE), Duration::from_secs(5));
        let session = Arc::new(session(client, true));

        let runner = Arc::clone(&session);
        let start = tokio::spawn(async move { runner.start().await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.shutdown();

        assert!(matches!(start.await.unwrap(), Err(SessionError::Closed)));
        assert_eq!(session.status(), LoadingStatus::Closed);
        assert!(session.cache().get(2).is_none());
        assert!(matches!(session.load_frame(0).await, Err(SessionError::Closed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_publishes_frames() {
        let session = session(client_with(&[1, 2, 3]), false);
        session.start().await.unwrap();
        let mut frames = session.subscribe_frames();
        frames.borrow_and_update();

        session.scheduler().restart();
        let mut visited = Vec::new();
        while visited.len() < 2 {
            frames.changed().await.unwrap();
            visited.push(frames.borrow_and_update().as_ref().map(|f| f.index));
        }

        assert_eq!(visited, vec![Some(1), Some(2)]);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!session.scheduler().state().is_playing);
    }
}
