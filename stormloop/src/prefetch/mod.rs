//! Bulk prefetch of every snapshot ahead of playback.
//!
//! ```text
//! descriptors ──► Prefetcher ──┬─► SnapshotCache::get_or_load ─┐
//!                              └─► preload_overlays ───────────┴─► progress n/total
//! ```
//!
//! Snapshots are fetched concurrently (unbounded by default) and progress
//! is reported in completion order. One snapshot failing never aborts the
//! others; only a prefetch in which every snapshot fails is an error.

mod error;
mod prefetcher;
mod progress;

pub use error::PrefetchError;
pub use prefetcher::Prefetcher;
pub use progress::{PrefetchProgress, PrefetchReport};
