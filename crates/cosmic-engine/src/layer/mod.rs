//! Layers and the layer stack.
//!
//! A layer is one slice of application behavior (gameplay, debug UI, ...).
//! The stack orders them: regular layers at the bottom, overlays above, with
//! events flowing top-down and updates bottom-up.

mod stack;

pub use stack::{LayerStack, StackCursor};

use crate::event::Event;

/// Application-supplied handler living in the layer stack.
///
/// `on_attach` / `on_detach` are driven exclusively by the stack.
pub trait Layer {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "layer"
    }

    fn on_attach(&mut self) {}

    fn on_detach(&mut self) {}

    /// Called once per frame, bottom-to-top.
    fn on_update(&mut self) {}

    /// Called top-to-bottom until a layer marks the event handled.
    fn on_event(&mut self, _event: &mut Event) {}
}
