//! Vulkan implementation of the frame backend.

mod backend;
mod commands;
mod device;
mod instance;
mod pipeline;
mod result;
mod surface;
mod swapchain;
mod sync;

pub use backend::VulkanBackend;
pub use device::QueueFamilies;
pub use surface::{choose_extent, choose_present_mode, choose_surface_format, determine_image_count};
