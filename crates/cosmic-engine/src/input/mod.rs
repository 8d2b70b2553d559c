//! Input identifiers, winit translation and polling.
//!
//! Event payloads carry engine-neutral `Key` / `MouseButton` values; winit
//! codes never cross into the event model. Polling queries read the state the
//! window tracks alongside its event stream.

mod codes;
mod poll;
mod state;
mod translate;

pub use codes::{Key, MouseButton};
pub use poll::{is_key_pressed, is_mouse_button_pressed, mouse_position};
pub use state::InputState;
pub use translate::{from_winit_key, from_winit_mouse_button, to_winit_key};
