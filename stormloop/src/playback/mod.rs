//! Frame-indexed playback over the ordered snapshot sequence.
//!
//! The [`PlaybackScheduler`] owns the [`PlaybackState`] and a single
//! cancellable repeating timer. Arming and disarming the timer are the only
//! two timer operations; every control (play, pause, seek, speed change)
//! reduces to those plus an index update.
//!
//! ```text
//!            set_total_frames(n > 0)
//!   Idle ───────────────────────────► Paused ◄──── go_to_frame / pause
//!                                      │  ▲
//!                        play/restart  │  │  pause, or last frame
//!                                      ▼  │  reached without looping
//!                                     Playing ── tick ──► index + 1
//! ```

mod scheduler;
mod state;

pub use scheduler::{FrameCallback, PlaybackScheduler};
pub use state::PlaybackState;
