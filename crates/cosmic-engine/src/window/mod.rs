//! Platform window abstraction.
//!
//! The application only sees the `Window` trait. `WinitWindow` is the one
//! implementation: it owns the winit event loop, the OS window and the
//! graphics context bound to it.

mod winit_window;

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use anyhow::{bail, Result};

use crate::event::Event;
use crate::graphics::GraphicsConfig;
use crate::input::InputState;

pub use winit_window::WinitWindow;

/// Receives every event a window produces, synchronously from `on_update`.
pub type EventCallback = Box<dyn FnMut(&mut Event)>;

/// Windowing backend selector.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WindowApi {
    Winit,
    /// No windowing backend; `create_window` rejects it.
    None,
}

/// Window creation properties.
#[derive(Debug, Clone)]
pub struct WindowProps {
    pub title: String,
    /// Logical size of the client area.
    pub width: u32,
    pub height: u32,
    pub api: WindowApi,
    pub graphics: GraphicsConfig,
}

impl Default for WindowProps {
    fn default() -> Self {
        Self {
            title: "Cosmic Engine".to_string(),
            width: 1280,
            height: 720,
            api: WindowApi::Winit,
            graphics: GraphicsConfig::default(),
        }
    }
}

pub trait Window {
    /// Pumps pending platform events (invoking the callback for each), then
    /// renders and presents one frame.
    fn on_update(&mut self);

    /// Framebuffer width in physical pixels.
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Replaces the event callback. Only the last one set is invoked.
    fn set_event_callback(&mut self, callback: EventCallback);

    fn set_vsync(&mut self, enabled: bool);

    fn is_vsync(&self) -> bool;

    /// Releases the graphics context and closes the OS window. Idempotent.
    fn terminate(&mut self);

    /// Handle for input polling queries.
    fn native_window(&self) -> NativeWindow;
}

/// Opaque handle to a window's input state and OS window.
///
/// Stays valid after the window is terminated; queries then report nothing
/// held.
#[derive(Clone)]
pub struct NativeWindow {
    input: Rc<RefCell<InputState>>,
    window: Weak<winit::window::Window>,
}

impl NativeWindow {
    pub(crate) fn new(input: Rc<RefCell<InputState>>, window: Weak<winit::window::Window>) -> Self {
        Self { input, window }
    }

    /// A handle bound to no OS window.
    pub fn detached() -> Self {
        Self::new(Rc::default(), Weak::new())
    }

    pub fn input(&self) -> Ref<'_, InputState> {
        self.input.borrow()
    }

    #[cfg(test)]
    pub(crate) fn input_mut(&self) -> std::cell::RefMut<'_, InputState> {
        self.input.borrow_mut()
    }

    /// The winit window, while it is still open.
    pub fn winit_window(&self) -> Option<Rc<winit::window::Window>> {
        self.window.upgrade()
    }
}

/// Creates a window for `props.api`.
pub fn create_window(props: WindowProps) -> Result<Box<dyn Window>> {
    match props.api {
        WindowApi::Winit => Ok(Box::new(WinitWindow::new(props)?)),
        WindowApi::None => bail!("window API {:?} is not supported", props.api),
    }
}
