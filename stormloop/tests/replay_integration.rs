//! Integration tests for a full replay: index, prefetch, playback.
//!
//! These tests drive the public API against an in-memory fixture server:
//! - Prefetch progress across a whole index (completion order)
//! - Request coalescing through the real content loader
//! - Session lifecycle, gaps, and teardown
//! - Looping and non-looping playback over loaded frames
//!
//! Run with: `cargo test --test replay_integration`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use stormloop::cache::SnapshotCache;
use stormloop::config::{PlaybackConfig, PrefetchConfig, ReplayConfig, SourceConfig};
use stormloop::index::MetadataIndex;
use stormloop::loader::{ContentLoader, OverlayPreloader};
use stormloop::model::BlockKind;
use stormloop::prefetch::Prefetcher;
use stormloop::session::{LoadingStatus, ReplaySession};
use stormloop::transport::{AsyncHttpClient, TransportError};

// ============================================================================
// Fixture server
// ============================================================================

const BASE: &str = "https://fixtures.test/meteo-france-api";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

/// In-memory transport serving canned resources with optional latency.
#[derive(Default)]
struct FixtureServer {
    resources: HashMap<String, (Vec<u8>, Duration)>,
    hits: Mutex<HashMap<String, usize>>,
}

impl FixtureServer {
    fn serve(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.resources
            .insert(format!("{}/{}", BASE, path), (body.into(), Duration::ZERO));
        self
    }

    fn serve_slow(mut self, path: &str, body: impl Into<Vec<u8>>, latency: Duration) -> Self {
        self.resources
            .insert(format!("{}/{}", BASE, path), (body.into(), latency));
        self
    }

    fn hits(&self, path: &str) -> usize {
        let url = format!("{}/{}", BASE, path);
        self.hits.lock().get(&url).copied().unwrap_or(0)
    }
}

impl AsyncHttpClient for FixtureServer {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        *self.hits.lock().entry(url.to_string()).or_default() += 1;
        let Some((body, latency)) = self.resources.get(url).cloned() else {
            return Err(TransportError::Status {
                status: 404,
                url: url.to_string(),
            });
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(body)
    }
}

fn index_entry(timestamp: i64) -> String {
    format!(
        r#"{{
            "timestamp": {t},
            "date": "2024-01-1{d} 06:00",
            "trajectory_files": ["trajectories/{t}.json"],
            "report_file": "reports/{t}.json",
            "satellite_ir108": {{"file": "ir108/{t}.png", "bbox": [40.0, -30.0, 70.0, -5.0]}},
            "satellite_rgb_naturalenhncd": null
        }}"#,
        t = timestamp,
        d = timestamp % 10
    )
}

fn trajectory(name: &str) -> String {
    format!(
        r#"{{"cyclone_trajectory": {{
            "cyclone_name": "{}",
            "reference_time": "2024-01-15T06:00:00Z",
            "features": [
                {{"type": "Feature",
                  "geometry": {{"type": "Point", "coordinates": [55.5, -20.9]}},
                  "properties": {{"data_type": "analysis", "time": "2024-01-15T06:00:00Z",
                    "cyclone_data": {{"development": "tropical cyclone", "minimum_pressure": 975,
                      "maximum_wind": {{"wind_speed_kt": 70, "wind_speed_gust_kt": 95}}}}}}}}
            ]
        }}}}"#,
        name
    )
}

const REPORT: &str = r#"{"text_bloc_item": [
    {"bloc_title": "BULLETIN"},
    {"text": "-------------------------------------------------"},
    {"text": "Centre located near 20.9S / 55.5E."}
]}"#;

/// Fixture with `timestamps` fully served; `latency_ms[i]` delays the
/// trajectory of the i-th timestamp.
fn fixture(timestamps: &[i64], latency_ms: &[u64]) -> FixtureServer {
    let entries: Vec<String> = timestamps.iter().map(|t| index_entry(*t)).collect();
    let mut server = FixtureServer::default().serve("api_data.json", format!("[{}]", entries.join(",")));
    for (i, t) in timestamps.iter().enumerate() {
        let latency = Duration::from_millis(latency_ms.get(i).copied().unwrap_or(0));
        server = server
            .serve_slow(&format!("trajectories/{}.json", t), trajectory("BELAL"), latency)
            .serve(&format!("reports/{}.json", t), REPORT)
            .serve(&format!("ir108/{}.png", t), PNG);
    }
    server
}

fn session_config(looping: bool) -> ReplayConfig {
    ReplayConfig::new(SourceConfig::new(BASE))
        .with_playback(PlaybackConfig::new().with_looping(looping))
}

// ============================================================================
// Component pipeline
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_prefetch_progress_in_completion_order() {
    let server = Arc::new(fixture(&[300, 100, 200], &[30, 10, 20]));
    let liveness = CancellationToken::new();

    let index = MetadataIndex::new(Arc::clone(&server), format!("{}/api_data.json", BASE));
    let descriptors = index.load().await.unwrap();
    assert_eq!(
        descriptors.iter().map(|d| d.timestamp).collect::<Vec<_>>(),
        vec![100, 200, 300]
    );

    let overlays = Arc::new(OverlayPreloader::new(Arc::clone(&server), BASE, liveness.clone()));
    let loader = Arc::new(ContentLoader::new(Arc::clone(&server), BASE, Arc::clone(&overlays)));
    let cache = Arc::new(SnapshotCache::new(loader, liveness.clone()));
    let prefetcher = Prefetcher::new(Arc::clone(&cache), PrefetchConfig::default(), liveness);

    let mut percents = Vec::new();
    let report = prefetcher
        .prefetch_all(&descriptors, |p| percents.push(p.percent()))
        .await
        .unwrap();

    assert_eq!(percents, vec![33, 67, 100]);
    assert_eq!(report.succeeded, 3);
    assert!(!report.is_partial());
    assert_eq!(cache.len(), 3);
    assert_eq!(overlays.len(), 3);
    assert!(overlays.is_preloaded("ir108/100.png"));

    let snapshot = cache.get(300).unwrap();
    let trajectory = &snapshot.trajectories[0].cyclone_trajectory;
    assert_eq!(trajectory.cyclone_name, "BELAL");
    assert!(trajectory.latest_analysis().is_some());
    let kinds: Vec<BlockKind> = snapshot
        .report
        .as_ref()
        .unwrap()
        .blocks()
        .iter()
        .map(|b| b.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![BlockKind::Heading, BlockKind::Separator, BlockKind::Body]
    );
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_share_one_fetch() {
    let server = Arc::new(fixture(&[100], &[50]));
    let liveness = CancellationToken::new();
    let overlays = Arc::new(OverlayPreloader::new(Arc::clone(&server), BASE, liveness.clone()));
    let loader = Arc::new(ContentLoader::new(Arc::clone(&server), BASE, overlays));
    let cache = Arc::new(SnapshotCache::new(loader, liveness));

    let descriptors = MetadataIndex::new(Arc::clone(&server), format!("{}/api_data.json", BASE))
        .load()
        .await
        .unwrap();
    let descriptor = descriptors[0].clone();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let cache = Arc::clone(&cache);
        let descriptor = descriptor.clone();
        handles.push(tokio::spawn(async move {
            cache.get_or_load(&descriptor).await
        }));
    }
    let mut loaded = Vec::new();
    for handle in handles {
        loaded.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(server.hits("trajectories/100.json"), 1);
    assert!(loaded.iter().all(|s| Arc::ptr_eq(s, &loaded[0])));

    let again = cache.get_or_load(&descriptor).await.unwrap();
    assert!(Arc::ptr_eq(&again, &loaded[0]));
    assert_eq!(server.hits("trajectories/100.json"), 1);

    let stats = cache.stats();
    assert_eq!(stats.loads, 1);
    assert_eq!(stats.total_requests, 6);
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_looping_replay_wraps_to_first_frame() {
    let server = Arc::new(fixture(&[100, 200, 300], &[]));
    let session = ReplaySession::new(server, session_config(true));

    session.start().await.unwrap();
    assert_eq!(
        session.status(),
        LoadingStatus::Ready {
            frames: 3,
            failed: 0
        }
    );

    let mut frames = session.subscribe_frames();
    let first = frames.borrow_and_update().clone().unwrap();
    assert_eq!(first.index, 0);
    assert!(first.has_data());

    session.scheduler().restart();
    let mut visited = Vec::new();
    for _ in 0..3 {
        frames.changed().await.unwrap();
        let frame = frames.borrow_and_update().clone().unwrap();
        assert!(frame.has_data());
        visited.push(frame.index);
    }

    assert_eq!(visited, vec![1, 2, 0]);
    assert!(session.scheduler().state().is_playing);
    session.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_non_looping_replay_stops_on_last_frame() {
    let server = Arc::new(fixture(&[100, 200, 300], &[]));
    let session = ReplaySession::new(server, session_config(false));
    session.start().await.unwrap();

    session.scheduler().restart();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let state = session.scheduler().state();
    assert_eq!(state.current_index, 2);
    assert!(!state.is_playing);
    assert_eq!(session.current().unwrap().descriptor.timestamp, 300);
}

#[tokio::test(start_paused = true)]
async fn test_missing_snapshot_plays_as_gap() {
    let mut server = fixture(&[100, 200, 300], &[]);
    server
        .resources
        .remove(&format!("{}/trajectories/200.json", BASE));
    let session = ReplaySession::new(Arc::new(server), session_config(true));

    let report = session.start().await.unwrap();

    assert_eq!(report.failed_timestamps().collect::<Vec<_>>(), vec![200]);
    assert_eq!(
        session.status(),
        LoadingStatus::Ready {
            frames: 3,
            failed: 1
        }
    );

    session.scheduler().go_to_frame(1);
    let frame = session.current().unwrap();
    assert_eq!(frame.index, 1);
    assert!(!frame.has_data());
    assert!(session.load_frame(1).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_teardown_discards_in_flight_work() {
    let server = Arc::new(
        fixture(&[100, 200], &[])
            .serve_slow("ir108/200.png", PNG, Duration::from_secs(10)),
    );
    let session = Arc::new(ReplaySession::new(Arc::clone(&server), session_config(true)));

    let runner = Arc::clone(&session);
    let start = tokio::spawn(async move { runner.start().await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.shutdown();

    assert!(start.await.unwrap().is_err());
    assert_eq!(session.status(), LoadingStatus::Closed);

    tokio::time::sleep(Duration::from_secs(20)).await;
    let overlays = session.cache().loader().overlays();
    assert!(overlays.is_preloaded("ir108/100.png"));
    assert!(!overlays.is_preloaded("ir108/200.png"));
    assert!(!session.scheduler().is_armed());
}
