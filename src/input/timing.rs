//! Monotonic millisecond timestamps
//!
//! Every timestamp the tracker and resolver see is a [`Millis`] value taken
//! from a [`MonotonicClock`]. The clock is built on `tokio::time::Instant`
//! so that paused-time tests drive it deterministically.

use std::time::Duration;
use tokio::time::Instant;

/// Milliseconds since the clock's epoch
pub type Millis = u64;

/// Millisecond clock anchored at construction time
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock was started
    pub fn now_ms(&self) -> Millis {
        duration_to_millis(self.epoch.elapsed())
    }

    /// Instant at which the clock reads `at_ms`
    pub fn instant_at(&self, at_ms: Millis) -> Instant {
        self.epoch + Duration::from_millis(at_ms)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Milliseconds from `earlier` to `now`, zero if `earlier` is in the future
pub fn elapsed_ms(now: Millis, earlier: Millis) -> Millis {
    now.saturating_sub(earlier)
}

/// True if `earlier` lies strictly less than `window` milliseconds before `now`
pub fn within_window(now: Millis, earlier: Millis, window: Millis) -> bool {
    earlier.saturating_add(window) > now
}

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`
pub fn duration_to_millis(duration: Duration) -> Millis {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
