//! Per-key state with millisecond timestamps and one-shot click actions.

use crate::input::keys::{KeyEventKind, PendingAction, Position};
use crate::input::timing::{within_window, Millis};
use tracing::{trace, warn};

/// State of one tracked key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    /// Current physical position
    pub position: Position,
    /// Start of the current (debounced) hold
    pub press_time: Millis,
    /// Most recent release, `None` until the first release
    pub release_time: Option<Millis>,
    /// Last tick at which this key moved the pointer, `None` until it first does
    pub last_action_time: Option<Millis>,
    /// Click action not yet handed to the output layer (click keys only)
    pub pending: PendingAction,
}

impl KeyState {
    /// Create a new key state (up, nothing pending, no timestamps)
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the key is currently held
    pub fn is_down(&self) -> bool {
        self.position == Position::Down
    }

    /// Debounced press/release handling for direction keys.
    ///
    /// X reports a held key as a stream of release-then-press pairs. A press
    /// arriving less than `debounce_ms` after this key's last release continues
    /// the same hold and keeps `press_time`.
    pub fn apply_motion_event(&mut self, kind: KeyEventKind, timestamp: Millis, debounce_ms: Millis) {
        match kind {
            KeyEventKind::Press => {
                self.position = Position::Down;

                let repeat = self
                    .release_time
                    .is_some_and(|released| within_window(timestamp, released, debounce_ms));

                if repeat {
                    trace!(timestamp, press_time = self.press_time, "Auto-repeat, hold continues");
                } else {
                    self.press_time = timestamp;
                }
            }
            KeyEventKind::Release => {
                self.position = Position::Up;
                self.release_time = Some(timestamp);
            }
        }
    }

    /// Toggle handling for click keys.
    ///
    /// A press/release pair that lands between two ticks cancels out. Seeing
    /// the same transition twice in a row cannot come from a real keyboard;
    /// it is logged and the pending action is dropped.
    pub fn apply_toggle_event(&mut self, kind: KeyEventKind) {
        self.pending = match (kind, self.pending) {
            (KeyEventKind::Press, PendingAction::None) => PendingAction::Press,
            (KeyEventKind::Press, PendingAction::Release) => PendingAction::None,
            (KeyEventKind::Release, PendingAction::None) => PendingAction::Release,
            (KeyEventKind::Release, PendingAction::Press) => PendingAction::None,
            (KeyEventKind::Press, PendingAction::Press)
            | (KeyEventKind::Release, PendingAction::Release) => {
                warn!(?kind, "Click key received the same transition twice, dropping pending action");
                PendingAction::None
            }
        };

        self.position = match kind {
            KeyEventKind::Press => Position::Down,
            KeyEventKind::Release => Position::Up,
        };
    }

    /// Hand over the pending click action, leaving nothing pending
    pub fn take_pending(&mut self) -> PendingAction {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    const DEBOUNCE: Millis = 10;

    /// Log sink shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_warnings(f: impl FnOnce()) -> String {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_key_state_default() {
        let state = KeyState::new();
        assert_eq!(state.position, Position::Up);
        assert_eq!(state.press_time, 0);
        assert_eq!(state.release_time, None);
        assert_eq!(state.last_action_time, None);
        assert_eq!(state.pending, PendingAction::None);
    }

    #[test]
    fn test_motion_press_release() {
        let mut state = KeyState::new();
        state.apply_motion_event(KeyEventKind::Press, 1000, DEBOUNCE);
        assert!(state.is_down());
        assert_eq!(state.press_time, 1000);

        state.apply_motion_event(KeyEventKind::Release, 2000, DEBOUNCE);
        assert!(!state.is_down());
        assert_eq!(state.release_time, Some(2000));
    }

    #[test]
    fn test_repeat_press_keeps_press_time() {
        let mut state = KeyState::new();
        state.apply_motion_event(KeyEventKind::Press, 40, DEBOUNCE);
        state.apply_motion_event(KeyEventKind::Release, 100, DEBOUNCE);
        state.apply_motion_event(KeyEventKind::Press, 105, DEBOUNCE);

        assert!(state.is_down());
        assert_eq!(state.press_time, 40);
    }

    #[test]
    fn test_late_press_is_new_keystroke() {
        let mut state = KeyState::new();
        state.apply_motion_event(KeyEventKind::Press, 40, DEBOUNCE);
        state.apply_motion_event(KeyEventKind::Release, 100, DEBOUNCE);
        state.apply_motion_event(KeyEventKind::Press, 150, DEBOUNCE);

        assert_eq!(state.press_time, 150);
    }

    #[test]
    fn test_first_press_near_zero_is_not_debounced() {
        let mut state = KeyState::new();
        state.apply_motion_event(KeyEventKind::Press, 3, DEBOUNCE);
        assert_eq!(state.press_time, 3);
    }

    #[test]
    fn test_toggle_press_then_release_cancels() {
        let mut state = KeyState::new();
        state.apply_toggle_event(KeyEventKind::Press);
        assert_eq!(state.pending, PendingAction::Press);

        state.apply_toggle_event(KeyEventKind::Release);
        assert_eq!(state.pending, PendingAction::None);
    }

    #[test]
    fn test_toggle_release_then_press_cancels() {
        let mut state = KeyState::new();
        state.apply_toggle_event(KeyEventKind::Release);
        assert_eq!(state.pending, PendingAction::Release);

        state.apply_toggle_event(KeyEventKind::Press);
        assert_eq!(state.pending, PendingAction::None);
    }

    #[test]
    fn test_toggle_double_press_resets() {
        let mut state = KeyState::new();
        state.apply_toggle_event(KeyEventKind::Press);
        state.apply_toggle_event(KeyEventKind::Press);
        assert_eq!(state.pending, PendingAction::None);
    }

    #[test]
    fn test_toggle_repeated_transition_warns() {
        let mut state = KeyState::new();
        let output = capture_warnings(|| {
            state.apply_toggle_event(KeyEventKind::Release);
            state.apply_toggle_event(KeyEventKind::Release);
        });

        assert!(output.contains("WARN"));
        assert!(output.contains("same transition twice"));
        assert!(output.contains("Release"));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn test_toggle_press_release_does_not_warn() {
        let mut state = KeyState::new();
        let output = capture_warnings(|| {
            state.apply_toggle_event(KeyEventKind::Press);
            state.apply_toggle_event(KeyEventKind::Release);
            state.apply_toggle_event(KeyEventKind::Press);
        });

        assert!(output.is_empty());
    }

    #[test]
    fn test_toggle_double_release_resets() {
        let mut state = KeyState::new();
        state.apply_toggle_event(KeyEventKind::Release);
        state.apply_toggle_event(KeyEventKind::Release);
        assert_eq!(state.pending, PendingAction::None);
    }

    #[test]
    fn test_take_pending_consumes() {
        let mut state = KeyState::new();
        state.apply_toggle_event(KeyEventKind::Press);

        assert_eq!(state.take_pending(), PendingAction::Press);
        assert_eq!(state.take_pending(), PendingAction::None);
    }
}
