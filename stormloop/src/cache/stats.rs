//! Cache statistics tracking and reporting.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of cache counters for monitoring and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls to `get_or_load`.
    pub total_requests: u64,
    /// Requests answered from a resolved entry.
    pub hits: u64,
    /// Requests that waited on another caller's in-flight load.
    pub coalesced: u64,
    /// Underlying loader invocations.
    pub loads: u64,
    /// Loader invocations that failed or were discarded.
    pub failures: u64,
}

impl CacheStats {
    /// Share of requests served from a resolved entry (0.0 to 1.0).
    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.total_requests)
    }

    /// Share of requests that joined an in-flight load (0.0 to 1.0).
    pub fn coalescing_ratio(&self) -> f64 {
        ratio(self.coalesced, self.total_requests)
    }
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Lock-free counters behind [`CacheStats`].
#[derive(Debug, Default)]
pub(super) struct CacheCounters {
    total_requests: AtomicU64,
    hits: AtomicU64,
    coalesced: AtomicU64,
    loads: AtomicU64,
    failures: AtomicU64,
}

impl CacheCounters {
    pub(super) fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self) -> CacheStats {
        CacheStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}
