//! Snapshot content cache with request coalescing.
//!
//! # Architecture
//!
//! ```text
//! Prefetcher ────────┐
//!                    │                                  ContentLoader
//! on-demand load ────┼──► SnapshotCache::get_or_load ──► (one load per key)
//!                    │          │                             │
//! on-demand load ────┘          ▼                             ▼
//!                        [all callers receive the same Arc<LoadedSnapshot>]
//! ```
//!
//! Entries are either pending (an in-flight load with a broadcast channel
//! for waiters) or resolved. Resolved entries are never evicted; failed
//! loads leave no entry so a later call retries.

mod snapshot;
mod stats;

pub use snapshot::SnapshotCache;
pub use stats::CacheStats;
