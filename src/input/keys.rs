//! Logical key identities and the small enums shared by the tracker and resolver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a motion key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Pointer moves toward the top of the screen
    Up,
    /// Pointer moves toward the bottom of the screen
    Down,
    /// Pointer moves left
    Left,
    /// Pointer moves right
    Right,
}

impl Direction {
    /// All directions, in tracker slot order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector in screen coordinates (y grows downward)
    pub fn unit_vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

/// Pointer button driven by a click key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickButton {
    /// Primary button
    Left,
    /// Middle button
    Middle,
    /// Secondary button
    Right,
}

impl ClickButton {
    /// All buttons, in tracker slot order
    pub const ALL: [ClickButton; 3] = [ClickButton::Left, ClickButton::Middle, ClickButton::Right];

    /// X11 core button number
    pub fn x11_button(self) -> u8 {
        match self {
            ClickButton::Left => 1,
            ClickButton::Middle => 2,
            ClickButton::Right => 3,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            ClickButton::Left => 0,
            ClickButton::Middle => 1,
            ClickButton::Right => 2,
        }
    }
}

/// One of the seven tracked keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyId {
    /// Direction key
    Motion(Direction),
    /// Click key
    Click(ClickButton),
}

impl KeyId {
    /// All tracked keys
    pub const ALL: [KeyId; 7] = [
        KeyId::Motion(Direction::Up),
        KeyId::Motion(Direction::Down),
        KeyId::Motion(Direction::Left),
        KeyId::Motion(Direction::Right),
        KeyId::Click(ClickButton::Left),
        KeyId::Click(ClickButton::Middle),
        KeyId::Click(ClickButton::Right),
    ];
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Motion(Direction::Up) => write!(f, "up"),
            KeyId::Motion(Direction::Down) => write!(f, "down"),
            KeyId::Motion(Direction::Left) => write!(f, "left"),
            KeyId::Motion(Direction::Right) => write!(f, "right"),
            KeyId::Click(ClickButton::Left) => write!(f, "lclick"),
            KeyId::Click(ClickButton::Middle) => write!(f, "mclick"),
            KeyId::Click(ClickButton::Right) => write!(f, "rclick"),
        }
    }
}

/// Raw key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    /// Key went down (also sent by X on auto-repeat)
    Press,
    /// Key went up (also sent by X on auto-repeat)
    Release,
}

/// Physical key position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Not held
    #[default]
    Up,
    /// Held
    Down,
}

/// Click action recorded by the tracker but not yet delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingAction {
    /// Nothing to deliver
    #[default]
    None,
    /// Button press to deliver
    Press,
    /// Button release to deliver
    Release,
}

/// Button action reported by the resolver for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// No change this tick
    #[default]
    None,
    /// Press the button
    Press,
    /// Release the button
    Release,
}

impl From<PendingAction> for ButtonAction {
    fn from(pending: PendingAction) -> Self {
        match pending {
            PendingAction::None => ButtonAction::None,
            PendingAction::Press => ButtonAction::Press,
            PendingAction::Release => ButtonAction::Release,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_vectors() {
        assert_eq!(Direction::Up.unit_vector(), (0, -1));
        assert_eq!(Direction::Down.unit_vector(), (0, 1));
        assert_eq!(Direction::Left.unit_vector(), (-1, 0));
        assert_eq!(Direction::Right.unit_vector(), (1, 0));
    }

    #[test]
    fn test_slot_indices_are_distinct() {
        let dirs: Vec<usize> = Direction::ALL.iter().map(|d| d.index()).collect();
        assert_eq!(dirs, vec![0, 1, 2, 3]);

        let buttons: Vec<usize> = ClickButton::ALL.iter().map(|b| b.index()).collect();
        assert_eq!(buttons, vec![0, 1, 2]);
    }

    #[test]
    fn test_x11_buttons() {
        assert_eq!(ClickButton::Left.x11_button(), 1);
        assert_eq!(ClickButton::Middle.x11_button(), 2);
        assert_eq!(ClickButton::Right.x11_button(), 3);
    }

    #[test]
    fn test_key_event_kind_serde() {
        let kind: KeyEventKind = serde_json::from_str("\"release\"").unwrap();
        assert_eq!(kind, KeyEventKind::Release);
        assert_eq!(serde_json::to_string(&KeyEventKind::Press).unwrap(), "\"press\"");
    }

    #[test]
    fn test_pending_to_button_action() {
        assert_eq!(ButtonAction::from(PendingAction::None), ButtonAction::None);
        assert_eq!(ButtonAction::from(PendingAction::Press), ButtonAction::Press);
        assert_eq!(ButtonAction::from(PendingAction::Release), ButtonAction::Release);
    }
}
