//! Mode driver
//!
//! Runs the two-mode loop on top of the platform seams in
//! [`backend`](super::backend):
//!
//! ```text
//! normal mode ── trigger released ──▶ mouse mode
//!      ▲                                  │
//!      └── leave key released / idle ─────┘
//! ```
//!
//! In normal mode only the passive trigger grab is active and the driver
//! waits for the release of the trigger key. Mouse mode grabs the whole
//! keyboard and builds a fresh [`RemapContext`]. Each iteration then
//!
//! 1. suspends: sleeps one tick interval if a direction key is held,
//!    otherwise waits for the next key event (bounded by the idle timeout),
//! 2. drains every queued event into the context,
//! 3. emits the clicks, then the motion, of one tick.
//!
//! Releasing the leave key still lets the current tick run, so a click
//! pressed in the same batch is not lost.

use crate::config::Config;
use crate::input::timing::{duration_to_millis, elapsed_ms};
use crate::input::{
    AccelerationCurve, ButtonAction, ClickButton, InputError, KeyEventKind, KeyMap, KeyResolver, KeyTracker,
    Millis, MonotonicClock, RemapContext, Resolver, Result, TickOutput,
};
use crate::session::backend::{KeyEventSource, KeyboardGrab, PointerSink, RawKeyEvent};
use crate::session::trigger::ModeKeys;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Why a mouse-mode session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Leave key released
    LeaveKey,
    /// No key event within the idle timeout
    IdleTimeout,
    /// Key event source closed
    SourceClosed,
}

/// Statistics for one mouse-mode session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Events applied to a tracked key
    pub events_processed: u64,
    /// Events for keys outside the key map
    pub events_ignored: u64,
    /// Relative pointer moves emitted
    pub pointer_moves: u64,
    /// Button presses and releases emitted
    pub button_events: u64,
    /// Recoverable pointer output failures
    pub output_errors: u64,
    /// Session length
    pub duration_ms: Millis,
    /// How the session ended
    pub exit: ExitReason,
}

#[derive(Debug, Default)]
struct OutputCounters {
    pointer_moves: u64,
    button_events: u64,
    output_errors: u64,
    /// Buttons pressed on the sink and not yet released
    held: [bool; 3],
}

impl OutputCounters {
    fn held_buttons(&self) -> impl Iterator<Item = ClickButton> + '_ {
        ClickButton::ALL
            .into_iter()
            .filter(|button| self.held[button.index()])
    }
}

enum Wakeup {
    Event(RawKeyEvent),
    IdleTimeout,
    Closed,
}

/// Drives normal mode and mouse mode over a platform backend
pub struct ModeDriver<S, P, G> {
    source: S,
    sink: P,
    grab: G,

    keymap: KeyMap,
    mode_keys: ModeKeys,

    curve: AccelerationCurve,
    debounce_ms: Millis,
    tick_interval: Duration,
    idle_timeout: Option<Duration>,

    clock: MonotonicClock,
}

impl<S, P, G> ModeDriver<S, P, G>
where
    S: KeyEventSource,
    P: PointerSink,
    G: KeyboardGrab,
{
    /// Resolve the configured keys and build a driver
    pub fn new(
        config: &Config,
        resolver: &dyn KeyResolver,
        source: S,
        sink: P,
        grab: G,
    ) -> Result<Self> {
        let keymap = KeyMap::resolve(&config.input.bindings, resolver)?;
        let mode_keys = ModeKeys::resolve(&config.trigger, resolver)?;

        if let Some(key) = keymap.lookup(mode_keys.leave_keycode) {
            return Err(InputError::DuplicateBinding {
                keycode: mode_keys.leave_keycode,
                first: mode_keys.leave_keysym.clone(),
                second: config.input.bindings.keysym(key).to_string(),
            });
        }

        debug!(
            "Resolved {} mouse-mode keys, trigger {}, leave {}",
            keymap.len(),
            mode_keys.trigger,
            mode_keys.leave_keysym
        );

        Ok(Self {
            source,
            sink,
            grab,
            keymap,
            mode_keys,
            curve: config.motion.curve(),
            debounce_ms: config.motion.debounce_ms,
            tick_interval: config.motion.tick_interval(),
            idle_timeout: config.session.idle_timeout(),
            clock: MonotonicClock::new(),
        })
    }

    /// Use `clock` for event timestamps
    pub fn with_clock(mut self, clock: MonotonicClock) -> Self {
        self.clock = clock;
        self
    }

    /// Clock used for event timestamps
    pub fn clock(&self) -> MonotonicClock {
        self.clock
    }

    /// Resolved trigger and leave keys
    pub fn mode_keys(&self) -> &ModeKeys {
        &self.mode_keys
    }

    /// Pointer sink
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Keyboard grab
    pub fn grab(&self) -> &G {
        &self.grab
    }

    /// Give back the backend
    pub fn into_parts(self) -> (S, P, G) {
        (self.source, self.sink, self.grab)
    }

    /// Run until the key event source closes
    ///
    /// Returns one summary per mouse-mode session.
    pub async fn run(&mut self) -> Result<Vec<SessionSummary>> {
        let trigger = self.mode_keys.trigger.clone();
        self.grab.enable_trigger(&trigger)?;
        info!("Press {} to enter mouse mode", trigger);

        let mut sessions = Vec::new();
        while self.wait_for_trigger().await {
            let summary = self.run_mouse_mode().await?;
            let closed = summary.exit == ExitReason::SourceClosed;
            sessions.push(summary);
            if closed {
                break;
            }
        }

        self.grab.disable_trigger(&trigger)?;
        info!("Key event source closed after {} sessions", sessions.len());
        Ok(sessions)
    }

    /// Normal mode: wait for the trigger key's release
    ///
    /// The passive grab filters on the modifiers, so only the key code is
    /// checked here. Returns `false` if the source closes first.
    pub async fn wait_for_trigger(&mut self) -> bool {
        while let Some(event) = self.source.next_event().await {
            if event.kind == KeyEventKind::Release
                && event.keycode == self.mode_keys.trigger.keycode
            {
                return true;
            }
            trace!(keycode = event.keycode, "Ignoring key in normal mode");
        }
        false
    }

    /// Mouse mode: grab the keyboard and translate keys until the session ends
    ///
    /// Grab failures are fatal. The keyboard is ungrabbed and the trigger grab
    /// restored on every exit path after a successful grab. Buttons still held
    /// on an idle timeout or a closed source are released first.
    pub async fn run_mouse_mode(&mut self) -> Result<SessionSummary> {
        let trigger = self.mode_keys.trigger.clone();

        self.grab.disable_trigger(&trigger)?;
        if let Err(e) = self.grab.grab_keyboard() {
            if let Err(restore) = self.grab.enable_trigger(&trigger) {
                warn!("Failed to restore trigger grab: {}", restore);
            }
            return Err(e);
        }

        info!(
            "Entering mouse mode (release {} to leave)",
            self.mode_keys.leave_keysym
        );

        let started = self.clock.now_ms();
        let mut ctx = RemapContext::new(
            self.keymap.clone(),
            KeyTracker::new(self.debounce_ms),
            Resolver::new(self.curve),
        );
        let mut counters = OutputCounters::default();

        let result = match self.mouse_mode_loop(&mut ctx, &mut counters).await {
            Ok(ExitReason::LeaveKey) => Ok(ExitReason::LeaveKey),
            Ok(exit) => self.release_held_buttons(&mut counters).map(|()| exit),
            Err(e) => Err(e),
        };

        let ungrab = self.grab.ungrab_keyboard();
        if let Err(e) = &ungrab {
            warn!("Failed to ungrab keyboard: {}", e);
        }
        let restore = self.grab.enable_trigger(&trigger);
        let exit = result?;
        ungrab?;
        restore?;

        let summary = SessionSummary {
            events_processed: ctx.events_processed(),
            events_ignored: ctx.events_ignored(),
            pointer_moves: counters.pointer_moves,
            button_events: counters.button_events,
            output_errors: counters.output_errors,
            duration_ms: elapsed_ms(self.clock.now_ms(), started),
            exit,
        };

        info!(
            exit = ?summary.exit,
            events = summary.events_processed,
            ignored = summary.events_ignored,
            moves = summary.pointer_moves,
            buttons = summary.button_events,
            duration_ms = summary.duration_ms,
            "Left mouse mode"
        );

        Ok(summary)
    }

    async fn mouse_mode_loop(
        &mut self,
        ctx: &mut RemapContext,
        counters: &mut OutputCounters,
    ) -> Result<ExitReason> {
        loop {
            let mut exit = None;

            if ctx.any_motion_key_down() {
                tokio::time::sleep(self.tick_interval).await;
            } else {
                match self.wait_for_input().await {
                    Wakeup::Event(event) => {
                        if self.apply_event(ctx, event) {
                            exit = Some(ExitReason::LeaveKey);
                        }
                    }
                    Wakeup::IdleTimeout => {
                        info!(
                            "No input for {} ms, leaving mouse mode",
                            self.idle_timeout.map(duration_to_millis).unwrap_or_default()
                        );
                        return Ok(ExitReason::IdleTimeout);
                    }
                    Wakeup::Closed => return Ok(ExitReason::SourceClosed),
                }
            }

            if exit.is_none() {
                exit = self.drain_queued(ctx)?;
            }

            let output = ctx.tick(self.clock.now_ms());
            self.emit(&output, counters)?;

            if let Some(reason) = exit {
                return Ok(reason);
            }
        }
    }

    async fn wait_for_input(&mut self) -> Wakeup {
        let next = match self.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.source.next_event()).await {
                Ok(next) => next,
                Err(_) => return Wakeup::IdleTimeout,
            },
            None => self.source.next_event().await,
        };

        match next {
            Some(event) => Wakeup::Event(event),
            None => Wakeup::Closed,
        }
    }

    /// Apply queued events; stops at the leave key so later keys reach normal mode
    fn drain_queued(&mut self, ctx: &mut RemapContext) -> Result<Option<ExitReason>> {
        loop {
            match self.source.poll_event() {
                Ok(Some(event)) => {
                    if self.apply_event(ctx, event) {
                        return Ok(Some(ExitReason::LeaveKey));
                    }
                }
                Ok(None) => return Ok(None),
                Err(InputError::SourceClosed) => return Ok(Some(ExitReason::SourceClosed)),
                Err(e) => return Err(e),
            }
        }
    }

    /// Feed one event to the context; true if it was the leave key's release
    fn apply_event(&self, ctx: &mut RemapContext, event: RawKeyEvent) -> bool {
        let timestamp = event.time.unwrap_or_else(|| self.clock.now_ms());
        ctx.handle_key(event.keycode, event.kind, timestamp);
        event.kind == KeyEventKind::Release && event.keycode == self.mode_keys.leave_keycode
    }

    fn emit(&mut self, output: &TickOutput, counters: &mut OutputCounters) -> Result<()> {
        for (button, action) in output.clicks.actions() {
            let result = match action {
                ButtonAction::Press => self.sink.press_button(button),
                ButtonAction::Release => self.sink.release_button(button),
                ButtonAction::None => continue,
            };

            match result {
                Ok(()) => {
                    debug!("{:?} button {:?}", button, action);
                    counters.button_events += 1;
                    counters.held[button.index()] = action == ButtonAction::Press;
                }
                Err(e) => Self::recover(e, counters)?,
            }
        }

        let motion = output.motion;
        if !motion.is_zero() {
            match self.sink.move_relative(motion.dx, motion.dy) {
                Ok(()) => {
                    trace!(dx = motion.dx, dy = motion.dy, "Pointer moved");
                    counters.pointer_moves += 1;
                }
                Err(e) => Self::recover(e, counters)?,
            }
        }

        Ok(())
    }

    /// Release buttons still held when the session ends without the leave key
    fn release_held_buttons(&mut self, counters: &mut OutputCounters) -> Result<()> {
        let held: Vec<ClickButton> = counters.held_buttons().collect();
        for button in held {
            match self.sink.release_button(button) {
                Ok(()) => {
                    debug!("{:?} button released on exit", button);
                    counters.button_events += 1;
                }
                Err(e) => Self::recover(e, counters)?,
            }
            counters.held[button.index()] = false;
        }
        Ok(())
    }

    fn recover(error: InputError, counters: &mut OutputCounters) -> Result<()> {
        if error.is_recoverable() {
            warn!("Pointer output failed: {}", error);
            counters.output_errors += 1;
            Ok(())
        } else {
            Err(error)
        }
    }
}
