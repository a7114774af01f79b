//! Key Tracker
//!
//! Holds the state of the four direction keys and three click keys and
//! applies raw press/release transitions to them. It produces no output;
//! the [`Resolver`](crate::input::motion::Resolver) reads it once per tick.

use crate::input::key_state::KeyState;
use crate::input::keys::{ClickButton, Direction, KeyEventKind, KeyId};
use crate::input::timing::Millis;
use tracing::trace;

/// Default debounce window for X auto-repeat (milliseconds)
pub const DEFAULT_DEBOUNCE_MS: Millis = 10;

/// State of all seven tracked keys
#[derive(Debug, Clone)]
pub struct KeyTracker {
    /// Direction keys, indexed by [`Direction::index`]
    motion: [KeyState; 4],

    /// Click keys, indexed by [`ClickButton::index`]
    clicks: [KeyState; 3],

    /// Press-after-release window treated as auto-repeat
    debounce_ms: Millis,
}

impl KeyTracker {
    /// Create a tracker with every key up and nothing pending
    pub fn new(debounce_ms: Millis) -> Self {
        Self {
            motion: [KeyState::new(); 4],
            clicks: [KeyState::new(); 3],
            debounce_ms,
        }
    }

    /// Apply one raw transition of a tracked key
    pub fn update(&mut self, key: KeyId, kind: KeyEventKind, timestamp: Millis) {
        trace!(%key, ?kind, timestamp, "Key event");

        match key {
            KeyId::Motion(direction) => {
                let debounce_ms = self.debounce_ms;
                self.motion_mut(direction)
                    .apply_motion_event(kind, timestamp, debounce_ms);
            }
            KeyId::Click(button) => self.click_mut(button).apply_toggle_event(kind),
        }
    }

    /// True if any direction key is held
    pub fn any_motion_key_down(&self) -> bool {
        self.motion.iter().any(KeyState::is_down)
    }

    /// State of one direction key
    pub fn motion(&self, direction: Direction) -> &KeyState {
        &self.motion[direction.index()]
    }

    /// Mutable state of one direction key
    pub fn motion_mut(&mut self, direction: Direction) -> &mut KeyState {
        &mut self.motion[direction.index()]
    }

    /// State of one click key
    pub fn click(&self, button: ClickButton) -> &KeyState {
        &self.clicks[button.index()]
    }

    /// Mutable state of one click key
    pub fn click_mut(&mut self, button: ClickButton) -> &mut KeyState {
        &mut self.clicks[button.index()]
    }

    /// State of any tracked key
    pub fn state(&self, key: KeyId) -> &KeyState {
        match key {
            KeyId::Motion(direction) => self.motion(direction),
            KeyId::Click(button) => self.click(button),
        }
    }

    /// Debounce window in milliseconds
    pub fn debounce_ms(&self) -> Millis {
        self.debounce_ms
    }
}

impl Default for KeyTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
