//! Resolution of snapshot descriptors into loaded content.
//!
//! # Architecture
//!
//! ```text
//! SnapshotDescriptor ──► ContentLoader::load ──► LoadedSnapshot
//!        │                  ├─ trajectories (all required)
//!        │                  └─ report (optional, failures → None)
//!        │
//!        └──────────► preload_overlays ──► OverlayPreloader (best effort)
//! ```
//!
//! Content and overlays are separate operations so the caller decides
//! whether overlay preloading is awaited (bulk prefetch) or detached
//! (on-demand loads). Overlay preloading never produces an error: its
//! outcome type reports failures as data.

mod content;
mod error;
mod overlay;
mod traits;

pub use content::ContentLoader;
pub use error::SnapshotError;
pub use overlay::{OverlayImage, OverlayPreloader, PreloadOutcome};
pub use traits::SnapshotLoader;
