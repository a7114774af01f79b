//! Trace replay
//!
//! Drives the mode loop from a recorded key trace instead of a display
//! server. A trace is JSON:
//!
//! ```json
//! { "events": [
//!     { "at_ms": 0,    "key": "Alt_L", "kind": "release" },
//!     { "at_ms": 100,  "key": "k",     "kind": "press" },
//!     { "at_ms": 1100, "key": "k",     "kind": "release" },
//!     { "at_ms": 1200, "key": "Escape","kind": "release" }
//! ] }
//! ```
//!
//! Events are delivered at their offset from the start of the replay. Pointer
//! output and grab calls are recorded with the time they happened, which
//! makes the replay deterministic under a paused tokio clock.

use crate::config::Config;
use crate::input::{
    ClickButton, InputError, KeyEventKind, KeyResolver, Millis, MonotonicClock, Result,
};
use crate::session::backend::{ChannelSource, KeyboardGrab, PointerSink, RawKeyEvent};
use crate::session::driver::{ModeDriver, SessionSummary};
use crate::session::trigger::TriggerCombination;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// One recorded key transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Offset from the start of the trace
    pub at_ms: Millis,
    /// Keysym name
    pub key: String,
    /// Press or release
    pub kind: KeyEventKind,
}

/// A recorded key trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Events in delivery order
    pub events: Vec<TraceEvent>,
}

impl Trace {
    /// Parse and validate a JSON trace
    pub fn from_json(json: &str) -> Result<Self> {
        let trace: Trace = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    /// Load and validate a trace file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Offsets must not decrease
    pub fn validate(&self) -> Result<()> {
        for (index, pair) in self.events.windows(2).enumerate() {
            if pair[1].at_ms < pair[0].at_ms {
                return Err(InputError::InvalidTrace(format!(
                    "event {} at {} ms comes before event {} at {} ms",
                    index + 1,
                    pair[1].at_ms,
                    index,
                    pair[0].at_ms
                )));
            }
        }
        Ok(())
    }

    /// Offset of the last event
    pub fn duration_ms(&self) -> Millis {
        self.events.last().map_or(0, |event| event.at_ms)
    }

    fn resolve(&self, resolver: &dyn KeyResolver) -> Result<Vec<(Millis, RawKeyEvent)>> {
        self.events
            .iter()
            .map(|event| {
                let keycode = resolver
                    .keycode_for(&event.key)
                    .ok_or_else(|| InputError::UnknownKeysym(event.key.clone()))?;
                Ok((
                    event.at_ms,
                    RawKeyEvent {
                        keycode,
                        kind: event.kind,
                        time: Some(event.at_ms),
                    },
                ))
            })
            .collect()
    }
}

/// Feeds a trace into a [`ChannelSource`] from a background task
pub struct ReplaySource;

impl ReplaySource {
    /// Resolve the trace and start delivering it relative to `clock`
    ///
    /// The source closes after the last event.
    pub fn spawn(
        trace: &Trace,
        resolver: &dyn KeyResolver,
        clock: MonotonicClock,
    ) -> Result<(ChannelSource, JoinHandle<()>)> {
        let events = trace.resolve(resolver)?;
        let (tx, source) = ChannelSource::channel(events.len().max(1));

        let handle = tokio::spawn(async move {
            for (at_ms, event) in events {
                tokio::time::sleep_until(clock.instant_at(at_ms)).await;
                if tx.send(event).await.is_err() {
                    debug!("Replay receiver dropped at {} ms", at_ms);
                    break;
                }
            }
        });

        Ok((source, handle))
    }
}

/// Recorded pointer output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerActionKind {
    /// Relative motion
    Move {
        /// Horizontal delta
        dx: i32,
        /// Vertical delta (down is positive)
        dy: i32,
    },
    /// Button pressed
    Press {
        /// Button
        button: ClickButton,
    },
    /// Button released
    Release {
        /// Button
        button: ClickButton,
    },
}

/// Pointer output with its time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerAction {
    /// Time since the replay started
    pub at_ms: Millis,
    /// What happened
    #[serde(flatten)]
    pub kind: PointerActionKind,
}

/// Pointer sink that records instead of moving anything
#[derive(Debug, Clone)]
pub struct RecordingSink {
    clock: MonotonicClock,
    actions: Vec<PointerAction>,
}

impl RecordingSink {
    /// Record against `clock`
    pub fn new(clock: MonotonicClock) -> Self {
        Self {
            clock,
            actions: Vec::new(),
        }
    }

    /// Everything recorded so far
    pub fn actions(&self) -> &[PointerAction] {
        &self.actions
    }

    fn record(&mut self, kind: PointerActionKind) {
        self.actions.push(PointerAction {
            at_ms: self.clock.now_ms(),
            kind,
        });
    }
}

impl PointerSink for RecordingSink {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()> {
        self.record(PointerActionKind::Move { dx, dy });
        Ok(())
    }

    fn press_button(&mut self, button: ClickButton) -> Result<()> {
        self.record(PointerActionKind::Press { button });
        Ok(())
    }

    fn release_button(&mut self, button: ClickButton) -> Result<()> {
        self.record(PointerActionKind::Release { button });
        Ok(())
    }
}

/// Grab calls seen by [`RecordingGrab`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrabEvent {
    /// Trigger grab installed
    TriggerEnabled,
    /// Trigger grab removed
    TriggerDisabled,
    /// Keyboard grabbed
    KeyboardGrabbed,
    /// Keyboard released
    KeyboardUngrabbed,
}

/// Keyboard grab that records its calls
#[derive(Debug, Clone, Default)]
pub struct RecordingGrab {
    history: Vec<GrabEvent>,
    keyboard_grabbed: bool,
    trigger_enabled: bool,
    refuse_grab: bool,
}

impl RecordingGrab {
    /// Grab that always succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Grab whose keyboard grab fails, as if another client held it
    pub fn refusing() -> Self {
        Self {
            refuse_grab: true,
            ..Self::default()
        }
    }

    /// Calls in order
    pub fn history(&self) -> &[GrabEvent] {
        &self.history
    }

    /// True while the keyboard is grabbed
    pub fn is_keyboard_grabbed(&self) -> bool {
        self.keyboard_grabbed
    }

    /// True while the trigger grab is installed
    pub fn is_trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }
}

impl KeyboardGrab for RecordingGrab {
    fn enable_trigger(&mut self, _trigger: &TriggerCombination) -> Result<()> {
        self.trigger_enabled = true;
        self.history.push(GrabEvent::TriggerEnabled);
        Ok(())
    }

    fn disable_trigger(&mut self, _trigger: &TriggerCombination) -> Result<()> {
        self.trigger_enabled = false;
        self.history.push(GrabEvent::TriggerDisabled);
        Ok(())
    }

    fn grab_keyboard(&mut self) -> Result<()> {
        if self.refuse_grab {
            return Err(InputError::GrabFailed("AlreadyGrabbed".to_string()));
        }
        self.keyboard_grabbed = true;
        self.history.push(GrabEvent::KeyboardGrabbed);
        Ok(())
    }

    fn ungrab_keyboard(&mut self) -> Result<()> {
        self.keyboard_grabbed = false;
        self.history.push(GrabEvent::KeyboardUngrabbed);
        Ok(())
    }
}

/// Result of a replay
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// One summary per mouse-mode session
    pub sessions: Vec<SessionSummary>,
    /// Pointer output in order
    pub actions: Vec<PointerAction>,
    /// Grab calls in order
    pub grabs: Vec<GrabEvent>,
}

impl ReplayReport {
    /// Sum of all recorded motion
    pub fn total_motion(&self) -> (i64, i64) {
        self.actions
            .iter()
            .fold((0, 0), |(x, y), action| match action.kind {
                PointerActionKind::Move { dx, dy } => (x + i64::from(dx), y + i64::from(dy)),
                _ => (x, y),
            })
    }
}

/// Run the mode driver over `trace` with recording backends
pub async fn run_replay(
    config: &Config,
    resolver: &dyn KeyResolver,
    trace: &Trace,
) -> Result<ReplayReport> {
    run_replay_with_grab(config, resolver, trace, RecordingGrab::new()).await
}

/// Like [`run_replay`] with a caller-provided grab
pub async fn run_replay_with_grab(
    config: &Config,
    resolver: &dyn KeyResolver,
    trace: &Trace,
    grab: RecordingGrab,
) -> Result<ReplayReport> {
    let clock = MonotonicClock::new();
    let (source, feeder) = ReplaySource::spawn(trace, resolver, clock)?;
    let sink = RecordingSink::new(clock);

    let mut driver = ModeDriver::new(config, resolver, source, sink, grab)?.with_clock(clock);
    info!(
        "Replaying {} events over {} ms",
        trace.events.len(),
        trace.duration_ms()
    );

    let result = driver.run().await;
    feeder.abort();
    let sessions = result?;

    let (_, sink, grab) = driver.into_parts();
    Ok(ReplayReport {
        sessions,
        actions: sink.actions,
        grabs: grab.history,
    })
}
