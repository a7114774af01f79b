//! Platform seams
//!
//! The driver talks to the display server through three traits: a source of
//! raw key events, a pointer sink that moves the pointer and presses buttons,
//! and a keyboard grab that switches between the passive trigger grab and the
//! full grab of mouse mode.

use crate::input::{ClickButton, InputError, KeyEventKind, Millis, Result};
use crate::session::trigger::TriggerCombination;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// A key transition as delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Platform key code
    pub keycode: u32,
    /// Press or release
    pub kind: KeyEventKind,
    /// When the transition happened, on the driver's clock
    ///
    /// `None` stamps the event when the driver reads it.
    pub time: Option<Millis>,
}

impl RawKeyEvent {
    /// Key press
    pub fn press(keycode: u32) -> Self {
        Self {
            keycode,
            kind: KeyEventKind::Press,
            time: None,
        }
    }

    /// Key release
    pub fn release(keycode: u32) -> Self {
        Self {
            keycode,
            kind: KeyEventKind::Release,
            time: None,
        }
    }

    /// Same event with a platform timestamp
    pub fn at(mut self, time: Millis) -> Self {
        self.time = Some(time);
        self
    }
}

/// Source of raw key events
#[async_trait]
pub trait KeyEventSource: Send {
    /// Wait for the next event; `None` once the source is closed
    async fn next_event(&mut self) -> Option<RawKeyEvent>;

    /// Take an already queued event without waiting
    ///
    /// Returns `Ok(None)` when nothing is queued and
    /// [`InputError::SourceClosed`] once the source is closed and drained.
    fn poll_event(&mut self) -> Result<Option<RawKeyEvent>>;
}

/// Pointer output
#[cfg_attr(test, mockall::automock)]
pub trait PointerSink: Send {
    /// Move the pointer relative to its current position
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<()>;

    /// Press a pointer button
    fn press_button(&mut self, button: ClickButton) -> Result<()>;

    /// Release a pointer button
    fn release_button(&mut self, button: ClickButton) -> Result<()>;
}

/// Keyboard grabs
#[cfg_attr(test, mockall::automock)]
pub trait KeyboardGrab: Send {
    /// Passively grab the trigger combination
    fn enable_trigger(&mut self, trigger: &TriggerCombination) -> Result<()>;

    /// Drop the passive trigger grab
    fn disable_trigger(&mut self, trigger: &TriggerCombination) -> Result<()>;

    /// Grab the whole keyboard
    fn grab_keyboard(&mut self) -> Result<()>;

    /// Release the keyboard grab
    fn ungrab_keyboard(&mut self) -> Result<()>;
}

/// Key event source fed through a tokio channel
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<RawKeyEvent>,
}

impl ChannelSource {
    /// Wrap an existing receiver
    pub fn new(rx: mpsc::Receiver<RawKeyEvent>) -> Self {
        Self { rx }
    }

    /// Create a bounded channel and its source
    pub fn channel(capacity: usize) -> (mpsc::Sender<RawKeyEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl KeyEventSource for ChannelSource {
    async fn next_event(&mut self) -> Option<RawKeyEvent> {
        self.rx.recv().await
    }

    fn poll_event(&mut self) -> Result<Option<RawKeyEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(InputError::SourceClosed),
        }
    }
}
