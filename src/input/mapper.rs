//! Key Mapping Tables
//!
//! Resolves the seven logical keys to platform key codes once, before a
//! session starts, and turns raw codes back into [`KeyId`]s with a single
//! table lookup.
//!
//! The built-in [`StaticKeyResolver`] maps X keysym names to Linux evdev
//! keycodes. A real platform layer supplies its own [`KeyResolver`] that
//! asks the display server instead.

use crate::input::error::{InputError, Result};
use crate::input::keys::{ClickButton, Direction, KeyId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Linux evdev keycodes, named as in `linux/input-event-codes.h`
#[allow(missing_docs)]
pub mod keycodes {
    pub const KEY_ESC: u32 = 1;
    pub const KEY_1: u32 = 2;
    pub const KEY_2: u32 = 3;
    pub const KEY_3: u32 = 4;
    pub const KEY_4: u32 = 5;
    pub const KEY_5: u32 = 6;
    pub const KEY_6: u32 = 7;
    pub const KEY_7: u32 = 8;
    pub const KEY_8: u32 = 9;
    pub const KEY_9: u32 = 10;
    pub const KEY_0: u32 = 11;
    pub const KEY_BACKSPACE: u32 = 14;
    pub const KEY_TAB: u32 = 15;
    pub const KEY_Q: u32 = 16;
    pub const KEY_W: u32 = 17;
    pub const KEY_E: u32 = 18;
    pub const KEY_R: u32 = 19;
    pub const KEY_T: u32 = 20;
    pub const KEY_Y: u32 = 21;
    pub const KEY_U: u32 = 22;
    pub const KEY_I: u32 = 23;
    pub const KEY_O: u32 = 24;
    pub const KEY_P: u32 = 25;
    pub const KEY_ENTER: u32 = 28;
    pub const KEY_LEFTCTRL: u32 = 29;
    pub const KEY_A: u32 = 30;
    pub const KEY_S: u32 = 31;
    pub const KEY_D: u32 = 32;
    pub const KEY_F: u32 = 33;
    pub const KEY_G: u32 = 34;
    pub const KEY_H: u32 = 35;
    pub const KEY_J: u32 = 36;
    pub const KEY_K: u32 = 37;
    pub const KEY_L: u32 = 38;
    pub const KEY_SEMICOLON: u32 = 39;
    pub const KEY_LEFTSHIFT: u32 = 42;
    pub const KEY_Z: u32 = 44;
    pub const KEY_X: u32 = 45;
    pub const KEY_C: u32 = 46;
    pub const KEY_V: u32 = 47;
    pub const KEY_B: u32 = 48;
    pub const KEY_N: u32 = 49;
    pub const KEY_M: u32 = 50;
    pub const KEY_COMMA: u32 = 51;
    pub const KEY_DOT: u32 = 52;
    pub const KEY_SLASH: u32 = 53;
    pub const KEY_RIGHTSHIFT: u32 = 54;
    pub const KEY_LEFTALT: u32 = 56;
    pub const KEY_SPACE: u32 = 57;
    pub const KEY_CAPSLOCK: u32 = 58;

    pub const KEY_F1: u32 = 59;
    pub const KEY_F2: u32 = 60;
    pub const KEY_F3: u32 = 61;
    pub const KEY_F4: u32 = 62;
    pub const KEY_F5: u32 = 63;
    pub const KEY_F6: u32 = 64;
    pub const KEY_F7: u32 = 65;
    pub const KEY_F8: u32 = 66;
    pub const KEY_F9: u32 = 67;
    pub const KEY_F10: u32 = 68;
    pub const KEY_F11: u32 = 87;
    pub const KEY_F12: u32 = 88;

    pub const KEY_RIGHTCTRL: u32 = 97;
    pub const KEY_RIGHTALT: u32 = 100;
    pub const KEY_HOME: u32 = 102;
    pub const KEY_UP: u32 = 103;
    pub const KEY_PAGEUP: u32 = 104;
    pub const KEY_LEFT: u32 = 105;
    pub const KEY_RIGHT: u32 = 106;
    pub const KEY_END: u32 = 107;
    pub const KEY_DOWN: u32 = 108;
    pub const KEY_PAGEDOWN: u32 = 109;
    pub const KEY_INSERT: u32 = 110;
    pub const KEY_DELETE: u32 = 111;
    pub const KEY_LEFTMETA: u32 = 125;
    pub const KEY_RIGHTMETA: u32 = 126;
}

use keycodes::*;

/// Resolves a keysym name to a platform key code under the current layout
pub trait KeyResolver {
    /// Key code producing `keysym`, or `None` if no key does
    fn keycode_for(&self, keysym: &str) -> Option<u32>;
}

/// Built-in keysym → evdev keycode table with a few layout overrides
#[derive(Debug, Clone)]
pub struct StaticKeyResolver {
    /// Keysym names (letters stored lowercase)
    keysyms: HashMap<String, u32>,

    /// Layout-specific overrides, keyed by layout then keysym
    layout_overrides: HashMap<String, HashMap<String, u32>>,

    /// Current keyboard layout
    current_layout: String,
}

impl StaticKeyResolver {
    /// Create a resolver for the US layout
    pub fn new() -> Self {
        let mut resolver = Self {
            keysyms: HashMap::new(),
            layout_overrides: HashMap::new(),
            current_layout: "us".to_string(),
        };

        resolver.initialize_keysyms();
        resolver.load_layout_overrides();
        resolver
    }

    /// Create a resolver for the given layout
    pub fn with_layout(layout: &str) -> Self {
        let mut resolver = Self::new();
        resolver.set_layout(layout);
        resolver
    }

    fn initialize_keysyms(&mut self) {
        let letters = [
            ("a", KEY_A),
            ("b", KEY_B),
            ("c", KEY_C),
            ("d", KEY_D),
            ("e", KEY_E),
            ("f", KEY_F),
            ("g", KEY_G),
            ("h", KEY_H),
            ("i", KEY_I),
            ("j", KEY_J),
            ("k", KEY_K),
            ("l", KEY_L),
            ("m", KEY_M),
            ("n", KEY_N),
            ("o", KEY_O),
            ("p", KEY_P),
            ("q", KEY_Q),
            ("r", KEY_R),
            ("s", KEY_S),
            ("t", KEY_T),
            ("u", KEY_U),
            ("v", KEY_V),
            ("w", KEY_W),
            ("x", KEY_X),
            ("y", KEY_Y),
            ("z", KEY_Z),
        ];

        let named = [
            ("0", KEY_0),
            ("1", KEY_1),
            ("2", KEY_2),
            ("3", KEY_3),
            ("4", KEY_4),
            ("5", KEY_5),
            ("6", KEY_6),
            ("7", KEY_7),
            ("8", KEY_8),
            ("9", KEY_9),
            ("Escape", KEY_ESC),
            ("BackSpace", KEY_BACKSPACE),
            ("Tab", KEY_TAB),
            ("Return", KEY_ENTER),
            ("space", KEY_SPACE),
            ("semicolon", KEY_SEMICOLON),
            ("comma", KEY_COMMA),
            ("period", KEY_DOT),
            ("slash", KEY_SLASH),
            ("Caps_Lock", KEY_CAPSLOCK),
            ("Shift_L", KEY_LEFTSHIFT),
            ("Shift_R", KEY_RIGHTSHIFT),
            ("Control_L", KEY_LEFTCTRL),
            ("Control_R", KEY_RIGHTCTRL),
            ("Alt_L", KEY_LEFTALT),
            ("Alt_R", KEY_RIGHTALT),
            ("Super_L", KEY_LEFTMETA),
            ("Super_R", KEY_RIGHTMETA),
            ("Home", KEY_HOME),
            ("End", KEY_END),
            ("Page_Up", KEY_PAGEUP),
            ("Page_Down", KEY_PAGEDOWN),
            ("Insert", KEY_INSERT),
            ("Delete", KEY_DELETE),
            ("Up", KEY_UP),
            ("Down", KEY_DOWN),
            ("Left", KEY_LEFT),
            ("Right", KEY_RIGHT),
            ("F1", KEY_F1),
            ("F2", KEY_F2),
            ("F3", KEY_F3),
            ("F4", KEY_F4),
            ("F5", KEY_F5),
            ("F6", KEY_F6),
            ("F7", KEY_F7),
            ("F8", KEY_F8),
            ("F9", KEY_F9),
            ("F10", KEY_F10),
            ("F11", KEY_F11),
            ("F12", KEY_F12),
        ];

        for (name, keycode) in letters.into_iter().chain(named) {
            self.keysyms.insert(name.to_string(), keycode);
        }
    }

    fn load_layout_overrides(&mut self) {
        // German layout (QWERTZ)
        let de: HashMap<String, u32> = [("y", KEY_Z), ("z", KEY_Y)]
            .into_iter()
            .map(|(name, code)| (name.to_string(), code))
            .collect();
        self.layout_overrides.insert("de".to_string(), de);

        // French layout (AZERTY)
        let fr: HashMap<String, u32> = [("a", KEY_Q), ("q", KEY_A), ("w", KEY_Z), ("z", KEY_W)]
            .into_iter()
            .map(|(name, code)| (name.to_string(), code))
            .collect();
        self.layout_overrides.insert("fr".to_string(), fr);
    }

    /// Set keyboard layout; unknown layouts behave like "us"
    pub fn set_layout(&mut self, layout: &str) {
        self.current_layout = layout.to_string();
    }

    /// Get current keyboard layout
    pub fn layout(&self) -> &str {
        &self.current_layout
    }

    /// Number of keysym names known
    pub fn known_keysym_count(&self) -> usize {
        self.keysyms.len()
    }
}

/// Single letters are case-insensitive, every other name is exact
fn normalize_keysym(keysym: &str) -> String {
    let mut chars = keysym.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_lowercase().to_string(),
        _ => keysym.to_string(),
    }
}

impl KeyResolver for StaticKeyResolver {
    fn keycode_for(&self, keysym: &str) -> Option<u32> {
        let name = normalize_keysym(keysym);

        if let Some(overrides) = self.layout_overrides.get(&self.current_layout) {
            if let Some(keycode) = overrides.get(&name) {
                return Some(*keycode);
            }
        }

        self.keysyms.get(&name).copied()
    }
}

impl Default for StaticKeyResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Keysym names for the seven tracked keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    /// Move up
    pub up: String,
    /// Move down
    pub down: String,
    /// Move left
    pub left: String,
    /// Move right
    pub right: String,
    /// Left button
    pub left_click: String,
    /// Middle button
    pub middle_click: String,
    /// Right button
    pub right_click: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: "k".to_string(),
            down: "j".to_string(),
            left: "h".to_string(),
            right: "l".to_string(),
            left_click: "f".to_string(),
            middle_click: "d".to_string(),
            right_click: "s".to_string(),
        }
    }
}

impl KeyBindings {
    /// Keysym bound to a logical key
    pub fn keysym(&self, key: KeyId) -> &str {
        match key {
            KeyId::Motion(Direction::Up) => &self.up,
            KeyId::Motion(Direction::Down) => &self.down,
            KeyId::Motion(Direction::Left) => &self.left,
            KeyId::Motion(Direction::Right) => &self.right,
            KeyId::Click(ClickButton::Left) => &self.left_click,
            KeyId::Click(ClickButton::Middle) => &self.middle_click,
            KeyId::Click(ClickButton::Right) => &self.right_click,
        }
    }
}

/// Platform key code → logical key table, built once per session setup
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    by_code: HashMap<u32, KeyId>,
}

impl KeyMap {
    /// Resolve all seven bindings.
    ///
    /// Fails if a keysym is unknown or two bindings land on one key code.
    pub fn resolve(bindings: &KeyBindings, resolver: &dyn KeyResolver) -> Result<Self> {
        let mut by_code = HashMap::with_capacity(KeyId::ALL.len());

        for key in KeyId::ALL {
            let keysym = bindings.keysym(key);
            let keycode = resolver
                .keycode_for(keysym)
                .ok_or_else(|| InputError::UnknownKeysym(keysym.to_string()))?;

            if let Some(previous) = by_code.insert(keycode, key) {
                return Err(InputError::DuplicateBinding {
                    keycode,
                    first: bindings.keysym(previous).to_string(),
                    second: keysym.to_string(),
                });
            }

            debug!(%key, keysym, keycode, "Key bound");
        }

        Ok(Self { by_code })
    }

    /// Logical key for a raw code, `None` for keys the session does not track
    pub fn lookup(&self, keycode: u32) -> Option<KeyId> {
        self.by_code.get(&keycode).copied()
    }

    /// Raw code bound to a logical key
    pub fn keycode(&self, key: KeyId) -> Option<u32> {
        self.by_code
            .iter()
            .find_map(|(&code, &bound)| (bound == key).then_some(code))
    }

    /// Number of bound keys
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// True if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
