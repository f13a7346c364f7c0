//! Replay session orchestration.
//!
//! A [`ReplaySession`] owns every per-session object: the snapshot cache,
//! the overlay store, the playback scheduler and the liveness token that
//! marks teardown. Nothing outlives the session; dropping it disarms the
//! timer and discards any load still in flight.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ─► LoadingIndex ─► Prefetching { n / total } ─► Ready { frames, failed }
//!              │                   │
//!              └───────────────────┴─► Failed(message)      (controls disabled)
//!
//! any state ─ shutdown() ─► Closed
//! ```

mod error;
mod replay;
mod status;

pub use error::SessionError;
pub use replay::ReplaySession;
pub use status::{CurrentFrame, LoadingStatus};
