use std::fmt;

use crate::input::{Key, MouseButton};

use super::Category;

/// Type tag of an event, without its payload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventType {
    AppTick,
    AppUpdate,
    AppRender,
    WindowClose,
    WindowResize,
    WindowFocus,
    WindowLostFocus,
    WindowMoved,
    KeyPressed,
    KeyReleased,
    KeyTyped,
    MouseButtonPressed,
    MouseButtonReleased,
    MouseMoved,
    MouseScrolled,
}

/// Event payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    AppTick,
    AppUpdate,
    AppRender,

    WindowClose,
    /// Framebuffer size in physical pixels.
    WindowResize { width: u32, height: u32 },
    WindowFocus,
    WindowLostFocus,
    /// Outer position of the window in physical pixels.
    WindowMoved { x: i32, y: i32 },

    /// `repeat_count` is 0 for the initial press and 1 for an auto-repeat.
    KeyPressed { key: Key, repeat_count: u32 },
    KeyReleased { key: Key },
    /// Committed text, one event per character.
    KeyTyped { ch: char },

    MouseButtonPressed { button: MouseButton },
    MouseButtonReleased { button: MouseButton },
    /// Cursor position in physical pixels, relative to the client area.
    MouseMoved { x: f32, y: f32 },
    MouseScrolled { offset_x: f32, offset_y: f32 },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::AppTick => EventType::AppTick,
            EventKind::AppUpdate => EventType::AppUpdate,
            EventKind::AppRender => EventType::AppRender,
            EventKind::WindowClose => EventType::WindowClose,
            EventKind::WindowResize { .. } => EventType::WindowResize,
            EventKind::WindowFocus => EventType::WindowFocus,
            EventKind::WindowLostFocus => EventType::WindowLostFocus,
            EventKind::WindowMoved { .. } => EventType::WindowMoved,
            EventKind::KeyPressed { .. } => EventType::KeyPressed,
            EventKind::KeyReleased { .. } => EventType::KeyReleased,
            EventKind::KeyTyped { .. } => EventType::KeyTyped,
            EventKind::MouseButtonPressed { .. } => EventType::MouseButtonPressed,
            EventKind::MouseButtonReleased { .. } => EventType::MouseButtonReleased,
            EventKind::MouseMoved { .. } => EventType::MouseMoved,
            EventKind::MouseScrolled { .. } => EventType::MouseScrolled,
        }
    }

    pub fn category(&self) -> Category {
        match self.event_type() {
            EventType::AppTick | EventType::AppUpdate | EventType::AppRender => {
                Category::APPLICATION
            }
            EventType::WindowClose
            | EventType::WindowResize
            | EventType::WindowFocus
            | EventType::WindowLostFocus
            | EventType::WindowMoved => Category::WINDOW,
            EventType::KeyPressed | EventType::KeyReleased | EventType::KeyTyped => {
                Category::INPUT | Category::KEYBOARD
            }
            EventType::MouseMoved | EventType::MouseScrolled => Category::INPUT | Category::MOUSE,
            EventType::MouseButtonPressed | EventType::MouseButtonReleased => {
                Category::INPUT | Category::MOUSE | Category::MOUSE_BUTTON
            }
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::AppTick => f.write_str("AppTickEvent"),
            EventKind::AppUpdate => f.write_str("AppUpdateEvent"),
            EventKind::AppRender => f.write_str("AppRenderEvent"),
            EventKind::WindowClose => f.write_str("WindowCloseEvent"),
            EventKind::WindowResize { width, height } => {
                write!(f, "WindowResizeEvent [width={width}, height={height}]")
            }
            EventKind::WindowFocus => f.write_str("WindowFocusEvent"),
            EventKind::WindowLostFocus => f.write_str("WindowLostFocusEvent"),
            EventKind::WindowMoved { x, y } => write!(f, "WindowMovedEvent [x={x}, y={y}]"),
            EventKind::KeyPressed { key, repeat_count } => {
                write!(f, "KeyPressedEvent [key={key}, repeatCount={repeat_count}]")
            }
            EventKind::KeyReleased { key } => write!(f, "KeyReleasedEvent [key={key}]"),
            EventKind::KeyTyped { ch } => write!(f, "KeyTypedEvent [char={ch:?}]"),
            EventKind::MouseButtonPressed { button } => {
                write!(f, "MouseButtonPressedEvent [button={button}]")
            }
            EventKind::MouseButtonReleased { button } => {
                write!(f, "MouseButtonReleasedEvent [button={button}]")
            }
            EventKind::MouseMoved { x, y } => write!(f, "MouseMovedEvent [x={x:.2}, y={y:.2}]"),
            EventKind::MouseScrolled { offset_x, offset_y } => write!(
                f,
                "MouseScrolledEvent [offsetX={offset_x:.2}, offsetY={offset_y:.2}]"
            ),
        }
    }
}

/// A dispatched event.
///
/// The handled flag starts cleared and is a one-way latch: once a handler
/// marks the event, nothing can clear it again.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    kind: EventKind,
    handled: bool,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            handled: false,
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn is_in_category(&self, mask: Category) -> bool {
        self.category().matches(mask)
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn set_handled(&mut self) {
        self.handled = true;
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Event::new(kind)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> Vec<EventKind> {
        vec![
            EventKind::AppTick,
            EventKind::AppUpdate,
            EventKind::AppRender,
            EventKind::WindowClose,
            EventKind::WindowResize { width: 800, height: 600 },
            EventKind::WindowFocus,
            EventKind::WindowLostFocus,
            EventKind::WindowMoved { x: -4, y: 20 },
            EventKind::KeyPressed { key: Key::A, repeat_count: 0 },
            EventKind::KeyReleased { key: Key::A },
            EventKind::KeyTyped { ch: 'a' },
            EventKind::MouseButtonPressed { button: MouseButton::Left },
            EventKind::MouseButtonReleased { button: MouseButton::Left },
            EventKind::MouseMoved { x: 1.0, y: 2.0 },
            EventKind::MouseScrolled { offset_x: 0.0, offset_y: -1.0 },
        ]
    }

    fn all_masks() -> Vec<Category> {
        (0..=u8::MAX).map(Category::from_bits_truncate).collect()
    }

    // ── categories ────────────────────────────────────────────────────────

    #[test]
    fn is_in_category_is_a_bit_intersection() {
        for kind in all_kinds() {
            let event = Event::new(kind);
            for mask in all_masks() {
                let expected = (event.category().bits() & mask.bits()) != 0;
                assert_eq!(event.is_in_category(mask), expected, "{event} / {mask:?}");
            }
        }
    }

    #[test]
    fn no_event_matches_the_empty_mask() {
        for kind in all_kinds() {
            assert!(!Event::new(kind).is_in_category(Category::empty()));
        }
    }

    #[test]
    fn device_events_are_input() {
        for kind in all_kinds() {
            let event = Event::new(kind);
            let device = event.is_in_category(Category::KEYBOARD | Category::MOUSE);
            assert_eq!(device, event.is_in_category(Category::INPUT), "{event}");
        }
    }

    #[test]
    fn mouse_buttons_are_also_mouse_events() {
        let event = Event::new(EventKind::MouseButtonPressed { button: MouseButton::Right });
        assert_eq!(
            event.category(),
            Category::INPUT | Category::MOUSE | Category::MOUSE_BUTTON
        );
    }

    // ── handled latch ─────────────────────────────────────────────────────

    #[test]
    fn handled_starts_false_and_latches() {
        let mut event = Event::new(EventKind::KeyTyped { ch: 'x' });
        assert!(!event.is_handled());
        event.set_handled();
        assert!(event.is_handled());
        event.set_handled();
        assert!(event.is_handled());
    }

    // ── descriptions ──────────────────────────────────────────────────────

    #[test]
    fn descriptions_name_the_payload() {
        let resize = Event::new(EventKind::WindowResize { width: 1280, height: 720 });
        assert_eq!(resize.to_string(), "WindowResizeEvent [width=1280, height=720]");

        let key = Event::new(EventKind::KeyPressed { key: Key::Space, repeat_count: 1 });
        assert_eq!(key.to_string(), "KeyPressedEvent [key=Space, repeatCount=1]");

        assert_eq!(Event::new(EventKind::AppTick).to_string(), "AppTickEvent");
    }

    #[test]
    fn event_type_matches_kind() {
        let event = Event::new(EventKind::WindowMoved { x: 0, y: 0 });
        assert_eq!(event.event_type(), EventType::WindowMoved);
    }
}
