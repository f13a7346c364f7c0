//! Keyed snapshot cache with at-most-one in-flight load per key.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::stats::{CacheCounters, CacheStats};
use crate::config::defaults::DEFAULT_COALESCE_CHANNEL_CAPACITY;
use crate::loader::{SnapshotError, SnapshotLoader};
use crate::model::{LoadedSnapshot, SnapshotDescriptor};

/// Result delivered to every caller of one load.
type LoadResult = Result<Arc<LoadedSnapshot>, SnapshotError>;

enum CacheEntry {
    /// Load in flight; waiters subscribe to the sender.
    Pending(broadcast::Sender<LoadResult>),
    /// Load finished; reusable forever.
    Ready(Arc<LoadedSnapshot>),
}

/// Outcome of registering a request against the entry map.
enum Registration {
    Hit(Arc<LoadedSnapshot>),
    Leader(broadcast::Sender<LoadResult>),
    Waiter(broadcast::Receiver<LoadResult>),
}

/// Cache of loaded snapshots keyed by timestamp.
///
/// The cache belongs to one session: it is created at session start,
/// dropped at session end, and grows monotonically in between. Loads that
/// resolve after the session's liveness token is cancelled are discarded
/// instead of being stored.
pub struct SnapshotCache<L> {
    loader: Arc<L>,
    entries: DashMap<i64, CacheEntry>,
    liveness: CancellationToken,
    channel_capacity: usize,
    counters: CacheCounters,
}

impl<L: SnapshotLoader> SnapshotCache<L> {
    /// Creates an empty cache loading through `loader`.
    pub fn new(loader: Arc<L>, liveness: CancellationToken) -> Self {
        Self {
            loader,
            entries: DashMap::new(),
            liveness,
            channel_capacity: DEFAULT_COALESCE_CHANNEL_CAPACITY,
            counters: CacheCounters::default(),
        }
    }

    /// Sets the broadcast capacity used for coalesced waiters.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// The loader used for cache misses.
    pub fn loader(&self) -> &Arc<L> {
        &self.loader
    }

    /// Returns the snapshot for `descriptor`, loading it if needed.
    ///
    /// - Resolved entry: returned immediately, no I/O.
    /// - Pending entry: waits for the in-flight load; never starts another.
    /// - No entry: becomes the single loader for the key.
    ///
    /// On failure the pending entry is removed (failures are not cached)
    /// and the error is delivered to every current waiter.
    pub async fn get_or_load(&self, descriptor: &SnapshotDescriptor) -> LoadResult {
        let timestamp = descriptor.timestamp;
        if self.liveness.is_cancelled() {
            return Err(SnapshotError::Cancelled { timestamp });
        }

        self.counters.record_request();

        match self.register(timestamp) {
            Registration::Hit(snapshot) => {
                self.counters.record_hit();
                Ok(snapshot)
            }
            Registration::Waiter(mut rx) => {
                self.counters.record_coalesced();
                debug!(timestamp, "Waiting on in-flight snapshot load");
                // A closed channel means the loading caller was dropped mid-load.
                rx.recv()
                    .await
                    .unwrap_or(Err(SnapshotError::Cancelled { timestamp }))
            }
            Registration::Leader(tx) => self.load_as_leader(descriptor, tx).await,
        }
    }

    fn register(&self, timestamp: i64) -> Registration {
        match self.entries.entry(timestamp) {
            Entry::Occupied(entry) => match entry.get() {
                CacheEntry::Ready(snapshot) => Registration::Hit(Arc::clone(snapshot)),
                CacheEntry::Pending(tx) => Registration::Waiter(tx.subscribe()),
            },
            Entry::Vacant(entry) => {
                let (tx, _rx) = broadcast::channel(self.channel_capacity);
                entry.insert(CacheEntry::Pending(tx.clone()));
                Registration::Leader(tx)
            }
        }
    }

    async fn load_as_leader(
        &self,
        descriptor: &SnapshotDescriptor,
        tx: broadcast::Sender<LoadResult>,
    ) -> LoadResult {
        let timestamp = descriptor.timestamp;
        let guard = PendingGuard::new(&self.entries, timestamp);
        self.counters.record_load();

        let loaded = self.loader.load(descriptor).await.map(Arc::new);
        let result = match loaded {
            Ok(_) if self.liveness.is_cancelled() => {
                debug!(timestamp, "Discarding snapshot loaded after teardown");
                Err(SnapshotError::Cancelled { timestamp })
            }
            other => other,
        };

        match &result {
            Ok(snapshot) => {
                self.entries
                    .insert(timestamp, CacheEntry::Ready(Arc::clone(snapshot)));
                debug!(timestamp, waiters = tx.receiver_count(), "Snapshot cached");
            }
            Err(e) => {
                self.counters.record_failure();
                remove_pending(&self.entries, timestamp);
                warn!(timestamp, error = %e, "Snapshot load failed; not cached");
            }
        }
        guard.disarm();

        // No receivers is fine: nobody else asked for this key.
        let _ = tx.send(result.clone());
        result
    }

    /// Returns a resolved snapshot without loading.
    pub fn get(&self, timestamp: i64) -> Option<Arc<LoadedSnapshot>> {
        self.entries
            .get(&timestamp)
            .and_then(|entry| match entry.value() {
                CacheEntry::Ready(snapshot) => Some(Arc::clone(snapshot)),
                CacheEntry::Pending(_) => None,
            })
    }

    /// True if a resolved snapshot exists for `timestamp`.
    pub fn contains(&self, timestamp: i64) -> bool {
        self.get(timestamp).is_some()
    }

    /// True if a load for `timestamp` is currently in flight.
    pub fn is_pending(&self, timestamp: i64) -> bool {
        self.entries
            .get(&timestamp)
            .is_some_and(|entry| matches!(entry.value(), CacheEntry::Pending(_)))
    }

    /// Number of resolved snapshots.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.value(), CacheEntry::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of loads currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.entries.len() - self.len()
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Logs current statistics.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            total_requests = stats.total_requests,
            hits = stats.hits,
            coalesced = stats.coalesced,
            loads = stats.loads,
            failures = stats.failures,
            cached = self.len(),
            hit_ratio = format!("{:.1}%", stats.hit_ratio() * 100.0),
            "Snapshot cache statistics"
        );
    }
}

fn remove_pending(entries: &DashMap<i64, CacheEntry>, timestamp: i64) {
    entries.remove_if(&timestamp, |_, entry| {
        matches!(entry, CacheEntry::Pending(_))
    });
}

/// Removes the pending entry if the loading future is dropped before it
/// resolves, so the key is not stuck pending and waiters are released.
struct PendingGuard<'a> {
    entries: &'a DashMap<i64, CacheEntry>,
    timestamp: i64,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(entries: &'a DashMap<i64, CacheEntry>, timestamp: i64) -> Self {
        Self {
            entries,
            timestamp,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            remove_pending(self.entries, self.timestamp);
        }
    }
}
