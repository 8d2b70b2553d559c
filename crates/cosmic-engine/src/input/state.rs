use std::collections::HashSet;

use crate::event::{Event, EventKind};

use super::codes::{Key, MouseButton};

/// Current input state for a single window.
///
/// Fed from the window's event stream before the event reaches any layer, so
/// a handler that polls sees the state including the event it is handling.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Cursor position in physical pixels.
    pub cursor: Option<(f32, f32)>,

    keys_down: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
}

impl InputState {
    pub fn apply_event(&mut self, event: &Event) {
        match *event.kind() {
            EventKind::KeyPressed { key, .. } => {
                self.keys_down.insert(key);
            }
            EventKind::KeyReleased { key } => {
                self.keys_down.remove(&key);
            }
            EventKind::MouseButtonPressed { button } => {
                self.buttons_down.insert(button);
            }
            EventKind::MouseButtonReleased { button } => {
                self.buttons_down.remove(&button);
            }
            EventKind::MouseMoved { x, y } => {
                self.cursor = Some((x, y));
            }
            EventKind::WindowFocus => {
                self.focused = true;
            }
            EventKind::WindowLostFocus => {
                // Releases are not delivered while unfocused; drop everything held.
                self.focused = false;
                self.keys_down.clear();
                self.buttons_down.clear();
            }
            _ => {}
        }
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}
