//! Keyboard-to-pointer state machine
//!
//! This module turns raw key transitions into pointer motion and button
//! events. It knows nothing about the display server: the platform layer
//! translates key codes through a [`KeyMap`] and applies the results of each
//! tick.
//!
//! # Architecture
//!
//! ```text
//! raw (keycode, press|release)
//!       ↓
//! ┌─────────────────────────┐
//! │  RemapContext           │ ← one per mouse-mode session
//! │  - KeyMap lookup        │
//! └─────────────────────────┘
//!       ↓
//! ┌─────────────────────────┐
//! │  KeyTracker             │ ← 4 direction keys, 3 click keys
//! │  - debounced motion     │
//! │  - click toggles        │
//! └─────────────────────────┘
//!       ↓  once per tick
//! ┌─────────────────────────┐
//! │  Resolver               │
//! │  - resolve_clicks       │ → (button, press|release)
//! │  - compute_motion       │ → (dx, dy)
//! └─────────────────────────┘
//! ```
//!
//! # Timing
//!
//! - X reports a held key as release/press pairs. A press less than
//!   10 ms after the same key's release continues the hold.
//! - A held direction key starts moving after 200 ms, then every tick,
//!   with speed `min(32, 1 + floor(0.2 * e^(0.005 * (held - 200))))`.
//! - A click key's press or release is delivered exactly once, on the next
//!   tick. A press and release landing between the same two ticks cancel.
//!
//! # Example
//!
//! ```rust
//! use keymouse::input::{
//!     KeyBindings, KeyEventKind, KeyMap, KeyTracker, RemapContext, Resolver,
//!     StaticKeyResolver, keycodes,
//! };
//!
//! let keymap = KeyMap::resolve(&KeyBindings::default(), &StaticKeyResolver::new()).unwrap();
//! let mut ctx = RemapContext::new(keymap, KeyTracker::default(), Resolver::default());
//!
//! ctx.handle_key(keycodes::KEY_K, KeyEventKind::Press, 0);
//! assert!(ctx.tick(0).motion.is_zero());
//! assert_eq!(ctx.tick(1000).motion.dy, -11);
//! ```

pub mod clicks;
pub mod context;
pub mod error;
pub mod key_state;
pub mod keys;
pub mod mapper;
pub mod motion;
pub mod timing;
pub mod tracker;

pub use clicks::{resolve_clicks, ClickReport};
pub use context::{RemapContext, TickOutput};
pub use error::{classify_error, ErrorType, InputError, Result};
pub use key_state::KeyState;
pub use keys::{
    ButtonAction, ClickButton, Direction, KeyEventKind, KeyId, PendingAction, Position,
};
pub use mapper::{keycodes, KeyBindings, KeyMap, KeyResolver, StaticKeyResolver};
pub use motion::{AccelerationCurve, PointerDelta, Resolver};
pub use timing::{Millis, MonotonicClock};
pub use tracker::{KeyTracker, DEFAULT_DEBOUNCE_MS};
