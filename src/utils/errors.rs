//! User-Friendly Error Formatting
//!
//! Turns errors that reach `main` into a boxed message with hints for the
//! common failure scenarios.

use crate::input::{classify_error, ErrorType, InputError};
use std::fmt::Write;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Format error for user consumption
///
/// Known [`InputError`]s anywhere in the chain pick the hint section;
/// otherwise the message text is inspected.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    let error_msg = error.to_string();

    match input_error_type(error) {
        Some(ErrorType::Grab) => format_grab_error(&mut output),
        Some(ErrorType::Mapping) => format_mapping_error(&mut output, &error_msg),
        Some(ErrorType::Data) => format_trace_error(&mut output),
        _ if error_msg.contains("config") || error_msg.contains("Invalid") => {
            format_config_error(&mut output, &error_msg)
        }
        _ => format_generic_error(&mut output, &error_msg),
    }

    writeln!(&mut output).ok();
    writeln!(&mut output, "{}", RULE).ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    writeln!(&mut output, "{}", RULE).ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: keymouse -vv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Show the effective settings: keymouse config"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn input_error_type(error: &anyhow::Error) -> Option<ErrorType> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<InputError>())
        .map(classify_error)
}

fn format_grab_error(output: &mut String) {
    writeln!(output, "Keyboard Grab Error").ok();
    writeln!(output).ok();
    writeln!(output, "Could not take exclusive control of the keyboard.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Another client already holds the grab").ok();
    writeln!(
        output,
        "     → Close menus, screen lockers or other key remappers"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. The trigger combination is taken").ok();
    writeln!(
        output,
        "     → Pick another trigger: --trigger-key <KEYSYM>"
    )
    .ok();
}

fn format_mapping_error(output: &mut String, error: &str) {
    writeln!(output, "Key Mapping Error").ok();
    writeln!(output).ok();
    writeln!(output, "A configured key could not be used:").ok();
    writeln!(output, "  {}", error).ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Misspelled keysym name").ok();
    writeln!(
        output,
        "     → Use X keysym names such as 'k', 'Escape', 'Alt_L', 'Up'"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. Two bindings on the same physical key").ok();
    writeln!(
        output,
        "     → Every mouse-mode key and the leave key must differ"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  3. Wrong keyboard layout").ok();
    writeln!(output, "     → Set --layout us|de|fr").ok();
}

fn format_trace_error(output: &mut String) {
    writeln!(output, "Trace Error").ok();
    writeln!(output).ok();
    writeln!(output, "The key trace could not be read.").ok();
    writeln!(output).ok();
    writeln!(output, "Expected format:").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "  {{\"events\": [{{\"at_ms\": 0, \"key\": \"Alt_L\", \"kind\": \"release\"}}]}}"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  - at_ms must not decrease from one event to the next").ok();
    writeln!(output, "  - kind is \"press\" or \"release\"").ok();
}

fn format_config_error(output: &mut String, error: &str) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "{}", error).ok();
    writeln!(output).ok();
    writeln!(output, "Check the command line and KEYMOUSE_* variables:").ok();
    writeln!(output, "  - max speed and tick interval must be at least 1").ok();
    writeln!(output, "  - modifiers are shift, ctrl, alt or super").ok();
    writeln!(output, "  - the trigger key and the leave key must differ").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "{}", error).ok();
}
