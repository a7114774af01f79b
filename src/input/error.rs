//! Input Handling Error Types
//!
//! Errors raised while wiring the key state machine to the platform layer.
//! The state machine itself never fails: toggle invariant violations are
//! logged and repaired in place (see [`crate::input::key_state`]).

use thiserror::Error;

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Input module error types
#[derive(Error, Debug)]
pub enum InputError {
    /// Keysym name the resolver does not know
    #[error("Unknown keysym: {0}")]
    UnknownKeysym(String),

    /// Two logical keys resolved to the same key code
    #[error("Keysyms {first} and {second} both map to key code {keycode}")]
    DuplicateBinding {
        /// Key code shared by both bindings
        keycode: u32,
        /// First binding that claimed the code
        first: String,
        /// Second binding that claimed the code
        second: String,
    },

    /// Modifier name that is not shift/ctrl/alt/super
    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    /// Exclusive keyboard grab could not be established or released
    #[error("Keyboard grab failed: {0}")]
    GrabFailed(String),

    /// Pointer output sink rejected an action
    #[error("Pointer sink error: {0}")]
    PointerSink(String),

    /// Raw event source is gone
    #[error("Event source closed")]
    SourceClosed,

    /// Malformed replay trace
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    /// Trace (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error classification for recovery strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Key mapping errors, raised once at setup
    Mapping,
    /// Grab errors, fatal for the session
    Grab,
    /// Output errors, the tick continues
    Output,
    /// Event source errors
    Source,
    /// Trace and file errors
    Data,
}

/// Classify error for recovery strategy selection
pub fn classify_error(error: &InputError) -> ErrorType {
    match error {
        InputError::UnknownKeysym(_)
        | InputError::DuplicateBinding { .. }
        | InputError::InvalidModifier(_) => ErrorType::Mapping,

        InputError::GrabFailed(_) => ErrorType::Grab,

        InputError::PointerSink(_) => ErrorType::Output,

        InputError::SourceClosed => ErrorType::Source,

        InputError::InvalidTrace(_) | InputError::Json(_) | InputError::Io(_) => ErrorType::Data,
    }
}

impl InputError {
    /// Whether the driver may log this error and keep the session alive
    pub fn is_recoverable(&self) -> bool {
        classify_error(self) == ErrorType::Output
    }
}
