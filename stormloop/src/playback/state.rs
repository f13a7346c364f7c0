//! Playback state value type.

/// Snapshot of the scheduler's state.
///
/// `total_frames == 0` is the idle state: no index has been loaded and
/// every control is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub total_frames: usize,
    pub is_playing: bool,
    pub is_looping: bool,
    /// Interval between ticks in milliseconds.
    pub speed_ms: u64,
}

impl PlaybackState {
    pub(super) fn idle(speed_ms: u64, is_looping: bool) -> Self {
        Self {
            current_index: 0,
            total_frames: 0,
            is_playing: false,
            is_looping,
            speed_ms,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.total_frames == 0
    }

    pub fn last_index(&self) -> usize {
        self.total_frames.saturating_sub(1)
    }

    /// Clamps a possibly out-of-range index into `[0, total_frames - 1]`.
    pub fn clamp_index(&self, index: i64) -> usize {
        if index <= 0 {
            return 0;
        }
        usize::try_from(index)
            .unwrap_or(usize::MAX)
            .min(self.last_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_index() {
        let state = PlaybackState {
            total_frames: 10,
            ..PlaybackState::idle(200, true)
        };

        assert_eq!(state.clamp_index(-3), 0);
        assert_eq!(state.clamp_index(4), 4);
        assert_eq!(state.clamp_index(99), 9);
        assert_eq!(state.clamp_index(i64::MAX), 9);
    }

    #[test]
    fn test_idle_clamps_to_zero() {
        let state = PlaybackState::idle(200, true);
        assert!(state.is_idle());
        assert_eq!(state.clamp_index(5), 0);
    }
}
