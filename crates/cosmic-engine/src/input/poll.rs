use crate::window::NativeWindow;

use super::codes::{Key, MouseButton};

/// Whether `key` is currently held in `window`.
pub fn is_key_pressed(key: Key, window: &NativeWindow) -> bool {
    window.input().is_key_down(key)
}

/// Whether `button` is currently held in `window`.
pub fn is_mouse_button_pressed(button: MouseButton, window: &NativeWindow) -> bool {
    window.input().is_button_down(button)
}

/// Last cursor position reported for `window`, in physical pixels.
pub fn mouse_position(window: &NativeWindow) -> Option<(f32, f32)> {
    window.input().cursor
}
