use winit::event::MouseButton as WinitMouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

use super::codes::{Key, MouseButton};

/// Both directions of the key translation read this table.
const KEY_TABLE: &[(KeyCode, Key)] = &[
    (KeyCode::Escape, Key::Escape),
    (KeyCode::Enter, Key::Enter),
    (KeyCode::Tab, Key::Tab),
    (KeyCode::Backspace, Key::Backspace),
    (KeyCode::Space, Key::Space),
    (KeyCode::Insert, Key::Insert),
    (KeyCode::Delete, Key::Delete),
    (KeyCode::Home, Key::Home),
    (KeyCode::End, Key::End),
    (KeyCode::PageUp, Key::PageUp),
    (KeyCode::PageDown, Key::PageDown),
    (KeyCode::ArrowUp, Key::ArrowUp),
    (KeyCode::ArrowDown, Key::ArrowDown),
    (KeyCode::ArrowLeft, Key::ArrowLeft),
    (KeyCode::ArrowRight, Key::ArrowRight),
    (KeyCode::ShiftLeft, Key::LeftShift),
    (KeyCode::ShiftRight, Key::RightShift),
    (KeyCode::ControlLeft, Key::LeftControl),
    (KeyCode::ControlRight, Key::RightControl),
    (KeyCode::AltLeft, Key::LeftAlt),
    (KeyCode::AltRight, Key::RightAlt),
    (KeyCode::SuperLeft, Key::LeftSuper),
    (KeyCode::SuperRight, Key::RightSuper),
    (KeyCode::KeyA, Key::A),
    (KeyCode::KeyB, Key::B),
    (KeyCode::KeyC, Key::C),
    (KeyCode::KeyD, Key::D),
    (KeyCode::KeyE, Key::E),
    (KeyCode::KeyF, Key::F),
    (KeyCode::KeyG, Key::G),
    (KeyCode::KeyH, Key::H),
    (KeyCode::KeyI, Key::I),
    (KeyCode::KeyJ, Key::J),
    (KeyCode::KeyK, Key::K),
    (KeyCode::KeyL, Key::L),
    (KeyCode::KeyM, Key::M),
    (KeyCode::KeyN, Key::N),
    (KeyCode::KeyO, Key::O),
    (KeyCode::KeyP, Key::P),
    (KeyCode::KeyQ, Key::Q),
    (KeyCode::KeyR, Key::R),
    (KeyCode::KeyS, Key::S),
    (KeyCode::KeyT, Key::T),
    (KeyCode::KeyU, Key::U),
    (KeyCode::KeyV, Key::V),
    (KeyCode::KeyW, Key::W),
    (KeyCode::KeyX, Key::X),
    (KeyCode::KeyY, Key::Y),
    (KeyCode::KeyZ, Key::Z),
    (KeyCode::Digit0, Key::Digit0),
    (KeyCode::Digit1, Key::Digit1),
    (KeyCode::Digit2, Key::Digit2),
    (KeyCode::Digit3, Key::Digit3),
    (KeyCode::Digit4, Key::Digit4),
    (KeyCode::Digit5, Key::Digit5),
    (KeyCode::Digit6, Key::Digit6),
    (KeyCode::Digit7, Key::Digit7),
    (KeyCode::Digit8, Key::Digit8),
    (KeyCode::Digit9, Key::Digit9),
    (KeyCode::F1, Key::F1),
    (KeyCode::F2, Key::F2),
    (KeyCode::F3, Key::F3),
    (KeyCode::F4, Key::F4),
    (KeyCode::F5, Key::F5),
    (KeyCode::F6, Key::F6),
    (KeyCode::F7, Key::F7),
    (KeyCode::F8, Key::F8),
    (KeyCode::F9, Key::F9),
    (KeyCode::F10, Key::F10),
    (KeyCode::F11, Key::F11),
    (KeyCode::F12, Key::F12),
    (KeyCode::Minus, Key::Minus),
    (KeyCode::Equal, Key::Equal),
    (KeyCode::Comma, Key::Comma),
    (KeyCode::Period, Key::Period),
    (KeyCode::Slash, Key::Slash),
    (KeyCode::Semicolon, Key::Semicolon),
    (KeyCode::Quote, Key::Quote),
    (KeyCode::Backquote, Key::Backquote),
    (KeyCode::Backslash, Key::Backslash),
    (KeyCode::BracketLeft, Key::BracketLeft),
    (KeyCode::BracketRight, Key::BracketRight),
];

/// Translates a winit physical key into an engine key.
pub fn from_winit_key(pk: PhysicalKey) -> Key {
    match pk {
        PhysicalKey::Code(code) => KEY_TABLE
            .iter()
            .find(|(winit_code, _)| *winit_code == code)
            .map(|(_, key)| *key)
            .unwrap_or(Key::Unknown(code as u32)),

        // winit 0.30 uses NativeKeyCode; no stable numeric is guaranteed here.
        PhysicalKey::Unidentified(_) => Key::Unknown(0),
    }
}

/// Translates an engine key back to the winit code, when the engine names it.
pub fn to_winit_key(key: Key) -> Option<KeyCode> {
    KEY_TABLE
        .iter()
        .find(|(_, engine_key)| *engine_key == key)
        .map(|(code, _)| *code)
}

pub fn from_winit_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn named_keys_translate_both_ways() {
        assert_eq!(from_winit_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert_eq!(to_winit_key(Key::W), Some(KeyCode::KeyW));
        assert_eq!(to_winit_key(Key::LeftShift), Some(KeyCode::ShiftLeft));
    }

    #[test]
    fn every_table_entry_is_unique() {
        for (i, (code, key)) in KEY_TABLE.iter().enumerate() {
            for (other_code, other_key) in &KEY_TABLE[i + 1..] {
                assert_ne!(code, other_code);
                assert_ne!(key, other_key);
            }
        }
    }

    #[test]
    fn unnamed_keys_keep_the_raw_code() {
        let key = from_winit_key(PhysicalKey::Code(KeyCode::NumLock));
        assert_eq!(key, Key::Unknown(KeyCode::NumLock as u32));
        assert_eq!(to_winit_key(key), None);
    }

    #[test]
    fn unidentified_keys_are_unknown_zero() {
        let key = from_winit_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified));
        assert_eq!(key, Key::Unknown(0));
    }

    #[test]
    fn mouse_buttons_map_directly() {
        assert_eq!(from_winit_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(from_winit_mouse_button(WinitMouseButton::Other(7)), MouseButton::Other(7));
    }
}
