use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Digit(u8),
}

/// Friendly names for the keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Escape,
    Left,
    Right,
    Up,
    Down,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Thread-safe input snapshot shared between the window event callbacks and
/// the frame loop.
///
/// Event callbacks mutate, the frame loop drains; the locks keep the two
/// access points from racing when the windowing backend delivers events off
/// the render thread.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    mouse_buttons: RwLock<HashSet<MouseButton>>,
    cursor: RwLock<Option<Vec2>>,
    drag_delta: RwLock<Vec2>,
    scroll_delta: RwLock<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn set_mouse_button_down(&self, button: MouseButton) {
        self.mouse_buttons.write().insert(button);
    }

    pub fn set_mouse_button_up(&self, button: MouseButton) {
        self.mouse_buttons.write().remove(&button);
    }

    /// Records a cursor position, accumulating the delta from the previous
    /// position into the pending drag while the left button is held.
    pub fn cursor_moved(&self, position: Vec2) {
        let previous = self.cursor.write().replace(position);
        if !self.is_mouse_button_down(MouseButton::LEFT) {
            return;
        }
        if let Some(previous) = previous {
            *self.drag_delta.write() += position - previous;
        }
    }

    /// Adds a scroll step to the pending zoom delta.
    pub fn push_scroll(&self, delta: f32) {
        *self.scroll_delta.write() += delta;
    }

    /// Returns and clears the drag accumulated since the last call.
    pub fn take_drag_delta(&self) -> Vec2 {
        std::mem::take(&mut *self.drag_delta.write())
    }

    /// Returns and clears the scroll accumulated since the last call.
    pub fn take_scroll_delta(&self) -> f32 {
        std::mem::take(&mut *self.scroll_delta.write())
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.read().contains(&button)
    }

    pub fn cursor_position(&self) -> Option<Vec2> {
        *self.cursor.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_state_tracks_keys() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Space));
        assert!(state.is_key_down(KeyCode::Named(NamedKey::Space)));
        state.set_key_up(KeyCode::Named(NamedKey::Space));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::Space)));
    }

    #[test]
    fn drag_accumulates_only_while_left_button_held() {
        let state = InputState::new();
        state.cursor_moved(Vec2::new(10.0, 10.0));
        state.cursor_moved(Vec2::new(30.0, 10.0));
        assert_eq!(state.take_drag_delta(), Vec2::ZERO);

        state.set_mouse_button_down(MouseButton::LEFT);
        state.cursor_moved(Vec2::new(50.0, 25.0));
        state.cursor_moved(Vec2::new(55.0, 20.0));
        assert_eq!(state.take_drag_delta(), Vec2::new(25.0, 10.0));
        assert_eq!(state.take_drag_delta(), Vec2::ZERO);
    }

    #[test]
    fn scroll_drains_to_zero() {
        let state = InputState::new();
        state.push_scroll(1.5);
        state.push_scroll(-0.5);
        assert_eq!(state.take_scroll_delta(), 1.0);
        assert_eq!(state.take_scroll_delta(), 0.0);
    }
}
