use serde::{Deserialize, Serialize};

use crate::bodies::ViewMode;
use crate::config::BodyId;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

/// Friendly names for the keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Left,
    Right,
    Escape,
    Space,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// High-level command produced from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Select(BodyId),
    SelectNext,
    SelectPrevious,
    EngageCapture,
    /// Escape: release capture when engaged, otherwise close the viewer.
    ReleaseOrQuit,
}

/// Maps a pressed key to an action for the given view mode.
pub fn action_for_key(key: KeyCode, mode: ViewMode) -> Option<Action> {
    match (key, mode) {
        (KeyCode::Named(NamedKey::Escape), _) => Some(Action::ReleaseOrQuit),
        (KeyCode::Digit(digit @ 1..=9), ViewMode::Gallery) => {
            Some(Action::Select(BodyId::new(usize::from(digit - 1))))
        }
        (KeyCode::Named(NamedKey::Right) | KeyCode::Named(NamedKey::Space), ViewMode::Gallery) => {
            Some(Action::SelectNext)
        }
        (KeyCode::Named(NamedKey::Left), ViewMode::Gallery) => Some(Action::SelectPrevious),
        (KeyCode::Character('N'), ViewMode::Gallery) => Some(Action::SelectNext),
        (KeyCode::Character('P'), ViewMode::Gallery) => Some(Action::SelectPrevious),
        _ => None,
    }
}

/// Maps a pressed mouse button to an action for the given view mode.
pub fn action_for_mouse(button: MouseButton, mode: ViewMode) -> Option<Action> {
    match mode {
        ViewMode::Single if button == MouseButton::LEFT => Some(Action::EngageCapture),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_bodies_in_gallery() {
        assert_eq!(
            action_for_key(KeyCode::Digit(1), ViewMode::Gallery),
            Some(Action::Select(BodyId::new(0)))
        );
        assert_eq!(
            action_for_key(KeyCode::Digit(9), ViewMode::Gallery),
            Some(Action::Select(BodyId::new(8)))
        );
        assert_eq!(action_for_key(KeyCode::Digit(0), ViewMode::Gallery), None);
        assert_eq!(action_for_key(KeyCode::Digit(3), ViewMode::Single), None);
    }

    #[test]
    fn arrows_cycle_bodies() {
        assert_eq!(
            action_for_key(KeyCode::Named(NamedKey::Right), ViewMode::Gallery),
            Some(Action::SelectNext)
        );
        assert_eq!(
            action_for_key(KeyCode::Named(NamedKey::Left), ViewMode::Gallery),
            Some(Action::SelectPrevious)
        );
    }

    #[test]
    fn escape_works_in_every_mode() {
        for mode in [ViewMode::Gallery, ViewMode::Single] {
            assert_eq!(
                action_for_key(KeyCode::Named(NamedKey::Escape), mode),
                Some(Action::ReleaseOrQuit)
            );
        }
    }

    #[test]
    fn left_click_engages_capture_only_in_single_mode() {
        assert_eq!(
            action_for_mouse(MouseButton::LEFT, ViewMode::Single),
            Some(Action::EngageCapture)
        );
        assert_eq!(action_for_mouse(MouseButton::LEFT, ViewMode::Gallery), None);
        assert_eq!(action_for_mouse(MouseButton::new(1), ViewMode::Single), None);
    }
}
