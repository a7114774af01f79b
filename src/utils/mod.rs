//! Utility Functions
//!
//! ## Error Formatting
//!
//! The [`errors`] module provides user-friendly error messages:
//!
//! ```rust,no_run
//! use keymouse::utils::format_user_error;
//!
//! # fn operation() -> anyhow::Result<()> { Ok(()) }
//! if let Err(e) = operation() {
//!     eprintln!("{}", format_user_error(&e));
//! }
//! ```
//!
//! Error categories with context-aware help:
//! - Grab errors → another client holds the keyboard or the trigger
//! - Mapping errors → unknown keysyms, duplicate bindings, layout
//! - Trace errors → expected JSON shape
//! - Config errors → value ranges and modifier names

pub mod errors;

pub use errors::format_user_error;
