//! # keymouse
//!
//! Drive the mouse pointer from the keyboard.
//!
//! A trigger combination (Ctrl+Super+Alt_L by default) switches into mouse
//! mode. While in mouse mode the keyboard is grabbed and
//!
//! - `k`/`j`/`h`/`l` move the pointer up/down/left/right, accelerating the
//!   longer a key is held
//! - `f`/`d`/`s` hold the left/middle/right button for as long as the key is
//!   down
//! - releasing `Escape` returns to normal mode
//!
//! # Architecture
//!
//! ```text
//! keymouse
//!   ├─> input    (pure key state machine: tracker, resolver, click toggles)
//!   ├─> session  (normal/mouse mode driver over source, sink and grab traits)
//!   ├─> config   (defaults + CLI/env overrides)
//!   └─> utils    (user-facing error formatting)
//! ```
//!
//! # Data Flow
//!
//! **Key Path:** Source → ModeDriver → RemapContext → KeyTracker
//!
//! **Pointer Path:** tick → Resolver → clicks, then motion → PointerSink

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration
pub mod config;

/// Key state machine and pointer resolution
pub mod input;

/// Mode switching, the mouse-mode loop and trace replay
pub mod session;

/// Utility functions
pub mod utils;
