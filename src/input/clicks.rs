//! Motion/Click Resolver: one-shot click resolution

use crate::input::keys::{ButtonAction, ClickButton};
use crate::input::tracker::KeyTracker;
use serde::{Deserialize, Serialize};

/// Button actions for one tick; at most one of press/release per button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickReport {
    /// Left button action
    pub left: ButtonAction,
    /// Middle button action
    pub middle: ButtonAction,
    /// Right button action
    pub right: ButtonAction,
}

impl ClickReport {
    /// Action for one button
    pub fn action(&self, button: ClickButton) -> ButtonAction {
        match button {
            ClickButton::Left => self.left,
            ClickButton::Middle => self.middle,
            ClickButton::Right => self.right,
        }
    }

    /// True if no button changes this tick
    pub fn is_empty(&self) -> bool {
        ClickButton::ALL
            .iter()
            .all(|&button| self.action(button) == ButtonAction::None)
    }

    /// Buttons with an action this tick, in left/middle/right order
    pub fn actions(&self) -> impl Iterator<Item = (ClickButton, ButtonAction)> + '_ {
        ClickButton::ALL
            .into_iter()
            .map(move |button| (button, self.action(button)))
            .filter(|(_, action)| *action != ButtonAction::None)
    }
}

/// Report and clear every click key's pending action.
///
/// A second call without an intervening update reports nothing.
pub fn resolve_clicks(tracker: &mut KeyTracker) -> ClickReport {
    let mut take = |button: ClickButton| ButtonAction::from(tracker.click_mut(button).take_pending());

    ClickReport {
        left: take(ClickButton::Left),
        middle: take(ClickButton::Middle),
        right: take(ClickButton::Right),
    }
}
