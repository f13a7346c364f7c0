//! Playback scheduler with a cancellable repeating timer.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::state::PlaybackState;
use crate::config::PlaybackConfig;

/// Callback invoked once per change of the current index.
///
/// Runs while the scheduler's state lock is held, so the state it receives
/// is exactly the state that produced the index. It must not call back into
/// the scheduler.
pub type FrameCallback = Box<dyn FnMut(usize, &PlaybackState) + Send>;

/// Handle to the armed timer task.
struct Timer {
    generation: u64,
    cancel: CancellationToken,
}

struct Inner {
    state: PlaybackState,
    config: PlaybackConfig,
    on_frame: Option<FrameCallback>,
    timer: Option<Timer>,
    generation: u64,
    closed: bool,
}

impl Inner {
    fn set_index(&mut self, index: usize) {
        if self.state.current_index == index {
            return;
        }
        self.state.current_index = index;
        let state = self.state;
        if let Some(callback) = self.on_frame.as_mut() {
            callback(index, &state);
        }
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel.cancel();
            trace!(generation = timer.generation, "Playback timer disarmed");
        }
    }

    fn pause(&mut self) {
        self.state.is_playing = false;
        self.disarm();
    }

    /// Advances one frame for the timer of `generation`.
    ///
    /// Returns false when that timer should stop.
    fn tick(&mut self, generation: u64) -> bool {
        let armed = matches!(&self.timer, Some(t) if t.generation == generation);
        if !armed || !self.state.is_playing {
            return false;
        }

        let next = self.state.current_index + 1;
        if next <= self.state.last_index() {
            self.set_index(next);
            true
        } else if self.state.is_looping {
            self.set_index(0);
            true
        } else {
            debug!(index = self.state.current_index, "Reached last frame, stopping");
            self.pause();
            false
        }
    }
}

/// Drives the current frame index on a fixed interval.
///
/// All controls are synchronous and take effect immediately. At most one
/// timer is armed at a time; re-arming always disarms the previous timer
/// first. The timer task holds only a weak reference to the scheduler, and
/// dropping the scheduler disarms it.
///
/// Arming the timer spawns a task, so [`play`](Self::play),
/// [`restart`](Self::restart) and [`update_speed`](Self::update_speed) must
/// be called from within a tokio runtime.
pub struct PlaybackScheduler {
    inner: Arc<Mutex<Inner>>,
}

impl PlaybackScheduler {
    /// Creates an idle scheduler (zero frames, paused).
    pub fn new(config: PlaybackConfig) -> Self {
        let state = PlaybackState::idle(config.initial_speed_ms(), config.looping());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                config,
                on_frame: None,
                timer: None,
                generation: 0,
                closed: false,
            })),
        }
    }

    /// Registers the frame callback, replacing any previous one.
    pub fn on_frame<F>(&self, callback: F)
    where
        F: FnMut(usize, &PlaybackState) + Send + 'static,
    {
        self.inner.lock().on_frame = Some(Box::new(callback));
    }

    /// Returns the current state.
    pub fn state(&self) -> PlaybackState {
        self.inner.lock().state
    }

    /// Returns true while a timer is armed.
    pub fn is_armed(&self) -> bool {
        self.inner.lock().timer.is_some()
    }

    /// Loads a new frame count, pausing at frame 0.
    ///
    /// `0` returns the scheduler to idle.
    pub fn set_total_frames(&self, total: usize) {
        let mut inner = self.inner.lock();
        inner.pause();
        inner.state.total_frames = total;
        inner.set_index(0);
        debug!(total, "Playback frames loaded");
    }

    /// Starts autoplay from the current index. No-op when idle.
    pub fn play(&self) {
        let mut inner = self.inner.lock();
        if inner.closed || inner.state.is_idle() || inner.timer.is_some() {
            return;
        }
        inner.state.is_playing = true;
        self.arm(&mut inner);
    }

    /// Stops autoplay. Idempotent.
    pub fn pause(&self) {
        self.inner.lock().pause();
    }

    pub fn toggle_play_pause(&self) {
        if self.state().is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jumps to frame 0 and plays from there on a fresh cadence.
    pub fn restart(&self) {
        let mut inner = self.inner.lock();
        if inner.closed || inner.state.is_idle() {
            return;
        }
        inner.disarm();
        inner.set_index(0);
        inner.state.is_playing = true;
        self.arm(&mut inner);
    }

    /// Flips looping and returns the new value.
    pub fn toggle_loop(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.state.is_looping = !inner.state.is_looping;
        inner.state.is_looping
    }

    /// Seeks to `index`, clamped into range, and pauses.
    ///
    /// The timer is disarmed before the index changes, so a tick racing
    /// with the seek can never overwrite it.
    pub fn go_to_frame(&self, index: i64) {
        let mut inner = self.inner.lock();
        inner.pause();
        let clamped = inner.state.clamp_index(index);
        inner.set_index(clamped);
    }

    /// Changes the tick interval and returns the applied (clamped) value.
    ///
    /// A running timer is re-armed at the new interval; the current index
    /// is left untouched.
    pub fn update_speed(&self, speed_ms: u64) -> u64 {
        let mut inner = self.inner.lock();
        let speed_ms = inner.config.clamp_speed(speed_ms);
        inner.state.speed_ms = speed_ms;
        if inner.timer.is_some() {
            inner.disarm();
            self.arm(&mut inner);
        }
        speed_ms
    }

    /// Disarms the timer and refuses further playback.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.pause();
        inner.on_frame = None;
    }

    fn arm(&self, inner: &mut Inner) {
        inner.generation += 1;
        let generation = inner.generation;
        let period = Duration::from_millis(inner.state.speed_ms);
        let cancel = CancellationToken::new();
        inner.timer = Some(Timer {
            generation,
            cancel: cancel.clone(),
        });

        let start = Instant::now() + period;
        tokio::spawn(run_timer(
            Arc::downgrade(&self.inner),
            generation,
            start,
            period,
            cancel,
        ));
        trace!(generation, speed_ms = inner.state.speed_ms, "Playback timer armed");
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.inner.lock().disarm();
    }
}

async fn run_timer(
    inner: Weak<Mutex<Inner>>,
    generation: u64,
    start: Instant,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticks = tokio::time::interval_at(start, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = ticks.tick() => {
                if !tick_once(&inner, generation) {
                    break;
                }
            }
        }
    }
}

fn tick_once(inner: &Weak<Mutex<Inner>>, generation: u64) -> bool {
    let Some(inner) = inner.upgrade() else {
        return false;
    };
    let keep_ticking = inner.lock().tick(generation);
    keep_ticking
}
