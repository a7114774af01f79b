//! Remap context
//!
//! One [`RemapContext`] lives for one mouse-mode session. It owns the key
//! code table, the tracker and the resolver, so independent sessions (and
//! tests) never share state.

use crate::input::clicks::ClickReport;
use crate::input::keys::KeyEventKind;
use crate::input::mapper::KeyMap;
use crate::input::motion::{PointerDelta, Resolver};
use crate::input::timing::Millis;
use crate::input::tracker::KeyTracker;
use tracing::trace;

/// Output of one tick: clicks first, then motion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutput {
    /// Button actions to emit
    pub clicks: ClickReport,
    /// Relative pointer motion to apply
    pub motion: PointerDelta,
}

impl TickOutput {
    /// True if the tick produced nothing to emit
    pub fn is_idle(&self) -> bool {
        self.clicks.is_empty() && self.motion.is_zero()
    }
}

/// Key state machine for one session
#[derive(Debug, Clone)]
pub struct RemapContext {
    keymap: KeyMap,
    tracker: KeyTracker,
    resolver: Resolver,

    /// Raw events that hit a tracked key
    events_processed: u64,

    /// Raw events for keys the session does not track
    events_ignored: u64,
}

impl RemapContext {
    /// Create a context with every key up
    pub fn new(keymap: KeyMap, tracker: KeyTracker, resolver: Resolver) -> Self {
        Self {
            keymap,
            tracker,
            resolver,
            events_processed: 0,
            events_ignored: 0,
        }
    }

    /// Feed one raw key event; codes outside the key map are ignored
    pub fn handle_key(&mut self, keycode: u32, kind: KeyEventKind, timestamp: Millis) {
        match self.keymap.lookup(keycode) {
            Some(key) => {
                self.tracker.update(key, kind, timestamp);
                self.events_processed += 1;
            }
            None => {
                trace!(keycode, ?kind, "Ignoring untracked key");
                self.events_ignored += 1;
            }
        }
    }

    /// True if any direction key is held
    pub fn any_motion_key_down(&self) -> bool {
        self.tracker.any_motion_key_down()
    }

    /// Resolve clicks, then motion, at `timestamp`
    pub fn tick(&mut self, timestamp: Millis) -> TickOutput {
        let clicks = self.resolver.resolve_clicks(&mut self.tracker);
        let motion = self.resolver.compute_motion(&mut self.tracker, timestamp);
        TickOutput { clicks, motion }
    }

    /// Key state, read-only
    pub fn tracker(&self) -> &KeyTracker {
        &self.tracker
    }

    /// Number of events applied to a tracked key
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Number of events for untracked keys
    pub fn events_ignored(&self) -> u64 {
        self.events_ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keys::{ButtonAction, Direction};
    use crate::input::mapper::keycodes::{KEY_ESC, KEY_F, KEY_K};
    use crate::input::mapper::{KeyBindings, StaticKeyResolver};

    fn context() -> RemapContext {
        let keymap = KeyMap::resolve(&KeyBindings::default(), &StaticKeyResolver::new()).unwrap();
        RemapContext::new(keymap, KeyTracker::default(), Resolver::default())
    }

    #[test]
    fn test_unmapped_codes_ignored() {
        let mut ctx = context();
        ctx.handle_key(KEY_ESC, KeyEventKind::Release, 5);

        assert_eq!(ctx.events_ignored(), 1);
        assert_eq!(ctx.events_processed(), 0);
        assert!(ctx.tick(5).is_idle());
    }

    #[test]
    fn test_tick_clicks_then_motion() {
        let mut ctx = context();
        ctx.handle_key(KEY_K, KeyEventKind::Press, 0);
        ctx.handle_key(KEY_F, KeyEventKind::Press, 0);
        assert!(ctx.any_motion_key_down());

        let first = ctx.tick(0);
        assert_eq!(first.clicks.left, ButtonAction::Press);
        assert!(first.motion.is_zero());

        let second = ctx.tick(200);
        assert!(second.clicks.is_empty());
        assert_eq!(second.motion, PointerDelta::new(0, -1));
        assert_eq!(
            ctx.tracker().motion(Direction::Up).last_action_time,
            Some(200)
        );
        assert_eq!(ctx.events_processed(), 2);
    }

    #[test]
    fn test_independent_contexts() {
        let mut a = context();
        let b = context();
        a.handle_key(KEY_K, KeyEventKind::Press, 0);

        assert!(a.any_motion_key_down());
        assert!(!b.any_motion_key_down());
    }
}
