//! GPU context and frame engine.
//!
//! This module is responsible for:
//! - creating the Vulkan instance/device/queues and the window surface
//! - building and rebuilding the swapchain and its per-image resources
//! - driving the per-frame acquire/submit/present protocol
//!
//! The protocol itself (`FrameEngine`) only talks to a `FrameBackend`;
//! `vulkan::VulkanBackend` is the production backend.

mod backend;
mod config;
mod context;
mod engine;
mod error;
mod frame;
mod shaders;

pub mod vulkan;

pub use backend::{Acquired, FrameBackend, Presented, SurfaceHost};
pub use config::{Buffering, GraphicsConfig};
pub use context::GraphicsContext;
pub use engine::{ContextState, FrameEngine, FrameStatus};
pub use error::FrameError;
pub use frame::{FrameRing, ImageFences, MAX_FRAMES_IN_FLIGHT};
pub use shaders::{ShaderDir, ShaderSource};
