//! Cosmic engine crate.
//!
//! Owns the main loop, event dispatch through the layer stack, the platform
//! window and the Vulkan frame engine that presents into it.

#[macro_use]
pub mod logging;

pub mod app;
pub mod event;
pub mod graphics;
pub mod input;
pub mod layer;
pub mod window;

#[doc(hidden)]
pub use log as __log;
