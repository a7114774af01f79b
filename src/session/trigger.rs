//! Mode switching keys
//!
//! The trigger combination (modifiers plus a key) is grabbed passively while
//! in normal mode; releasing its key enters mouse mode. Releasing the leave
//! key ends mouse mode.

use crate::config::TriggerConfig;
use crate::input::{InputError, KeyResolver, Result};
use std::fmt;

/// Keyboard modifiers of a key combination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    /// Shift held
    pub shift: bool,
    /// Ctrl held
    pub ctrl: bool,
    /// Alt held
    pub alt: bool,
    /// Super/Meta/Windows held
    pub meta: bool,
}

impl KeyModifiers {
    /// Parse modifier names ("shift", "ctrl", "alt", "super")
    ///
    /// Names are case-insensitive; "control", "meta" and "mod4" are accepted
    /// as aliases.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut modifiers = Self::default();

        for name in names {
            let name = name.as_ref();
            match name.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "mod1" => modifiers.alt = true,
                "super" | "meta" | "mod4" => modifiers.meta = true,
                _ => return Err(InputError::InvalidModifier(name.to_string())),
            }
        }

        Ok(modifiers)
    }

    /// True if no modifier is set
    pub fn is_empty(&self) -> bool {
        !(self.shift || self.ctrl || self.alt || self.meta)
    }
}

impl fmt::Display for KeyModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.ctrl, "Ctrl"),
            (self.shift, "Shift"),
            (self.alt, "Alt"),
            (self.meta, "Super"),
        ];

        let mut first = true;
        for (_, name) in names.iter().filter(|(set, _)| *set) {
            if !first {
                f.write_str("+")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}

/// A modifier set plus the key that completes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerCombination {
    /// Key name, for logs
    pub keysym: String,
    /// Platform key code of the key
    pub keycode: u32,
    /// Modifiers that must be held
    pub modifiers: KeyModifiers,
}

impl fmt::Display for TriggerCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.keysym)
        } else {
            write!(f, "{}+{}", self.modifiers, self.keysym)
        }
    }
}

/// Resolved trigger and leave keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeKeys {
    /// Combination that enters mouse mode on release of its key
    pub trigger: TriggerCombination,
    /// Key name of the leave key
    pub leave_keysym: String,
    /// Key code whose release leaves mouse mode
    pub leave_keycode: u32,
}

impl ModeKeys {
    /// Resolve the configured keys through `resolver`
    pub fn resolve(config: &TriggerConfig, resolver: &dyn KeyResolver) -> Result<Self> {
        let keycode = resolver
            .keycode_for(&config.key)
            .ok_or_else(|| InputError::UnknownKeysym(config.key.clone()))?;
        let leave_keycode = resolver
            .keycode_for(&config.leave_key)
            .ok_or_else(|| InputError::UnknownKeysym(config.leave_key.clone()))?;

        if keycode == leave_keycode {
            return Err(InputError::DuplicateBinding {
                keycode,
                first: config.key.clone(),
                second: config.leave_key.clone(),
            });
        }

        Ok(Self {
            trigger: TriggerCombination {
                keysym: config.key.clone(),
                keycode,
                modifiers: KeyModifiers::parse(&config.modifiers)?,
            },
            leave_keysym: config.leave_key.clone(),
            leave_keycode,
        })
    }
}
