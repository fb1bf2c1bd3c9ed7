use std::collections::HashMap;

pub use winit::keyboard::KeyCode;

/// Mouse buttons tracked by the session, indexed 0/1/2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left = 0,
    Middle = 1,
    Right = 2,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

    /// Map a polling index (0 = left, 1 = middle, 2 = right) to a button
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Transition reported to key and mouse-button callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Release,
    Press,
    /// Key held long enough for the platform to auto-repeat
    Repeat,
}

bitflags::bitflags! {
    /// Modifier keys held at dispatch time
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// Pollable input state for one window.
///
/// Only the event translator mutates it; the host reads it between polls.
/// Keys appear in the table once touched, absence means released.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashMap<KeyCode, bool>,
    mouse_buttons: [bool; 3],
    cursor: (f64, f64),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if key is currently down
    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.keys.get(&code).copied().unwrap_or(false)
    }

    /// Check if mouse button is currently down
    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons[button.index()]
    }

    /// Last known cursor position in client coordinates
    pub fn cursor_position(&self) -> (f64, f64) {
        self.cursor
    }

    /// Modifier mask computed from the current key table
    pub fn modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::empty();
        if self.is_key_down(KeyCode::ShiftLeft) || self.is_key_down(KeyCode::ShiftRight) {
            mods |= Modifiers::SHIFT;
        }
        if self.is_key_down(KeyCode::ControlLeft) || self.is_key_down(KeyCode::ControlRight) {
            mods |= Modifiers::CONTROL;
        }
        if self.is_key_down(KeyCode::AltLeft) || self.is_key_down(KeyCode::AltRight) {
            mods |= Modifiers::ALT;
        }
        mods
    }

    /// Copy of the current state, for press/release edge detection across polls
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            keys: self
                .keys
                .iter()
                .filter(|(_, &down)| down)
                .map(|(&code, _)| code)
                .collect(),
            mouse_buttons: self.mouse_buttons,
        }
    }

    pub(crate) fn set_key(&mut self, code: KeyCode, down: bool) {
        self.keys.insert(code, down);
    }

    pub(crate) fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        self.mouse_buttons[button.index()] = down;
    }

    pub(crate) fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }
}

/// Frozen copy of the pressed keys and buttons at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    keys: std::collections::HashSet<KeyCode>,
    mouse_buttons: [bool; 3],
}

impl InputSnapshot {
    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons[button.index()]
    }

    /// Key went down between `earlier` and this snapshot
    pub fn pressed_since(&self, earlier: &InputSnapshot, code: KeyCode) -> bool {
        self.is_key_down(code) && !earlier.is_key_down(code)
    }

    /// Key went up between `earlier` and this snapshot
    pub fn released_since(&self, earlier: &InputSnapshot, code: KeyCode) -> bool {
        !self.is_key_down(code) && earlier.is_key_down(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_empty() {
        let input = InputState::new();
        assert!(!input.is_key_down(KeyCode::KeyW));
        assert!(!input.is_mouse_down(MouseButton::Left));
        assert_eq!(input.cursor_position(), (0.0, 0.0));
        assert_eq!(input.modifiers(), Modifiers::empty());
    }

    #[test]
    fn test_key_stays_down_until_released() {
        let mut input = InputState::new();
        input.set_key(KeyCode::Space, true);
        assert!(input.is_key_down(KeyCode::Space));
        assert!(input.is_key_down(KeyCode::Space));

        input.set_key(KeyCode::Space, false);
        assert!(!input.is_key_down(KeyCode::Space));
    }

    #[test]
    fn test_mouse_button_index_mapping() {
        assert_eq!(MouseButton::from_index(0), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_index(1), Some(MouseButton::Middle));
        assert_eq!(MouseButton::from_index(2), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_index(3), None);
        assert_eq!(MouseButton::Right.index(), 2);
    }

    #[test]
    fn test_modifiers_from_either_side() {
        let mut input = InputState::new();
        input.set_key(KeyCode::ShiftRight, true);
        input.set_key(KeyCode::AltLeft, true);
        assert_eq!(input.modifiers(), Modifiers::SHIFT | Modifiers::ALT);
        assert_eq!(input.modifiers().bits(), 0b101);

        input.set_key(KeyCode::ShiftRight, false);
        input.set_key(KeyCode::ControlLeft, true);
        assert_eq!(input.modifiers(), Modifiers::CONTROL | Modifiers::ALT);
    }

    #[test]
    fn test_snapshot_edges() {
        let mut input = InputState::new();
        let before = input.snapshot();

        input.set_key(KeyCode::KeyA, true);
        let after = input.snapshot();
        assert!(after.pressed_since(&before, KeyCode::KeyA));
        assert!(!after.pressed_since(&after, KeyCode::KeyA));

        input.set_key(KeyCode::KeyA, false);
        let released = input.snapshot();
        assert!(released.released_since(&after, KeyCode::KeyA));
        assert!(!released.is_key_down(KeyCode::KeyA));
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut input = InputState::new();
        input.set_mouse_button(MouseButton::Middle, true);
        let snap = input.snapshot();

        input.set_mouse_button(MouseButton::Middle, false);
        assert!(snap.is_mouse_down(MouseButton::Middle));
        assert!(!input.is_mouse_down(MouseButton::Middle));
    }
}
