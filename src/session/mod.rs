//! Mode switching and the mouse-mode loop
//!
//! # Overview
//!
//! The [`input`](crate::input) module is a pure state machine. This module
//! wires it to a platform through three seams:
//!
//! - [`KeyEventSource`] delivers raw key transitions
//! - [`PointerSink`] moves the pointer and presses buttons
//! - [`KeyboardGrab`] switches between the passive trigger grab and a full
//!   keyboard grab
//!
//! [`ModeDriver`] owns one of each and alternates between normal mode and
//! mouse mode. The [`replay`] backends record instead of touching a display,
//! which is how the whole loop is tested.
//!
//! # Usage
//!
//! ```rust,no_run
//! use keymouse::config::Config;
//! use keymouse::input::StaticKeyResolver;
//! use keymouse::session::{run_replay, Trace};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let trace = Trace::load(std::path::Path::new("trace.json"))?;
//! let report = run_replay(&Config::default(), &StaticKeyResolver::new(), &trace).await?;
//! println!("{} pointer actions", report.actions.len());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod driver;
pub mod replay;
pub mod trigger;

pub use backend::{ChannelSource, KeyEventSource, KeyboardGrab, PointerSink, RawKeyEvent};
pub use driver::{ExitReason, ModeDriver, SessionSummary};
pub use replay::{
    run_replay, run_replay_with_grab, GrabEvent, PointerAction, PointerActionKind,
    RecordingGrab, RecordingSink, ReplayReport, ReplaySource, Trace, TraceEvent,
};
pub use trigger::{KeyModifiers, ModeKeys, TriggerCombination};
