//! Motion/Click Resolver: accelerating pointer motion
//!
//! A held direction key moves the pointer once per tick after an initial
//! dead zone. Speed grows exponentially with hold time and saturates:
//!
//! ```text
//! speed(held) = min(max_speed, 1 + floor(base * e^(rate * (held - initial_delay))))
//! ```
//!
//! With the defaults (200 ms, 0.2, 0.005, 32) speed is 1 when the dead zone
//! ends, 11 after one second of hold and reaches 32 after about 1.2 s.

use crate::input::clicks::{resolve_clicks, ClickReport};
use crate::input::keys::Direction;
use crate::input::timing::{elapsed_ms, Millis};
use crate::input::tracker::KeyTracker;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Acceleration curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationCurve {
    /// Dead zone before a held key starts moving, also the pacing interval (ms)
    pub initial_delay_ms: Millis,
    /// Multiplier of the exponential term
    pub base: f64,
    /// Exponential growth rate per millisecond of hold
    pub rate: f64,
    /// Speed ceiling (pixels per tick)
    pub max_speed: u32,
}

impl Default for AccelerationCurve {
    fn default() -> Self {
        Self {
            initial_delay_ms: 200,
            base: 0.2,
            rate: 0.005,
            max_speed: 32,
        }
    }
}

impl AccelerationCurve {
    /// Speed for a key held `held_ms` milliseconds
    pub fn speed(&self, held_ms: Millis) -> u32 {
        let excess = held_ms as f64 - self.initial_delay_ms as f64;
        let boost = (self.base * (self.rate * excess).exp()).floor();

        // `as` saturates, so an infinite boost lands on u32::MAX before the clamp
        let speed = 1u32.saturating_add(boost as u32);
        speed.min(self.max_speed)
    }

    /// Whether a key held `held_ms`, last contributing at `last_action`, moves at `now`
    pub fn is_due(&self, held_ms: Millis, last_action: Option<Millis>, now: Millis) -> bool {
        held_ms >= self.initial_delay_ms
            || last_action.is_some_and(|t| t.saturating_add(self.initial_delay_ms) <= now)
    }
}

/// Relative pointer motion for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerDelta {
    /// Horizontal motion (positive = right)
    pub dx: i32,
    /// Vertical motion (positive = down)
    pub dy: i32,
}

impl PointerDelta {
    /// Create a delta
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// True if the pointer would not move
    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

/// Turns tracker state into pointer motion and click actions once per tick
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    curve: AccelerationCurve,
}

impl Resolver {
    /// Create a resolver with the given curve
    pub fn new(curve: AccelerationCurve) -> Self {
        Self { curve }
    }

    /// Acceleration curve in use
    pub fn curve(&self) -> &AccelerationCurve {
        &self.curve
    }

    /// Sum the contributions of all held direction keys at `timestamp`.
    ///
    /// Opposite keys cancel. Each contributing key records `timestamp` as
    /// its last action time. No clamping to screen bounds happens here.
    pub fn compute_motion(&self, tracker: &mut KeyTracker, timestamp: Millis) -> PointerDelta {
        let mut delta = PointerDelta::default();

        for direction in Direction::ALL {
            let key = tracker.motion_mut(direction);
            if !key.is_down() {
                continue;
            }

            let held = elapsed_ms(timestamp, key.press_time);
            if !self.curve.is_due(held, key.last_action_time, timestamp) {
                continue;
            }

            let speed = i32::try_from(self.curve.speed(held)).unwrap_or(i32::MAX);
            let (ux, uy) = direction.unit_vector();
            delta.dx += speed * ux;
            delta.dy += speed * uy;
            key.last_action_time = Some(timestamp);

            trace!(?direction, held, speed, "Motion contribution");
        }

        delta
    }

    /// Consume every pending click action (see [`resolve_clicks`])
    pub fn resolve_clicks(&self, tracker: &mut KeyTracker) -> ClickReport {
        resolve_clicks(tracker)
    }
}
