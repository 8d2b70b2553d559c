use std::path::PathBuf;
use std::time::Duration;

use ash::vk;

/// Swapchain buffering policy.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Buffering {
    Double,
    Triple,
}

impl Buffering {
    /// Requested swapchain image count before surface limits are applied.
    pub fn image_count(self) -> u32 {
        match self {
            Buffering::Double => 2,
            Buffering::Triple => 3,
        }
    }
}

/// Initialization parameters for the graphics context.
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    /// Application name reported to the driver.
    pub application_name: String,

    /// Enable `VK_LAYER_KHRONOS_validation` and the debug messenger when the
    /// loader provides them. Missing support only logs a warning.
    pub validation: bool,

    /// Requested swapchain depth; clamped to what the surface allows.
    pub buffering: Buffering,

    /// Tear-free presentation.
    ///
    /// On: `low_latency_mode` when supported, else FIFO.
    /// Off: IMMEDIATE, then MAILBOX, else FIFO.
    pub vsync: bool,

    /// Preferred tear-free mode when vsync is on.
    pub low_latency_mode: vk::PresentModeKHR,

    /// RGBA clear color of the frame pass.
    pub clear_color: [f32; 4],

    /// Directory holding `vert.spv` and `frag.spv`. Without it (or without
    /// the files) the frame is a clear pass only.
    pub shader_dir: Option<PathBuf>,

    /// Upper bound for every fence wait and image acquisition in the frame
    /// loop. Exceeding it is fatal.
    pub fence_timeout: Duration,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            application_name: "cosmic".to_string(),
            validation: cfg!(debug_assertions),
            buffering: Buffering::Triple,
            vsync: true,
            low_latency_mode: vk::PresentModeKHR::MAILBOX,
            clear_color: [0.02, 0.02, 0.05, 1.0],
            shader_dir: None,
            fence_timeout: Duration::from_secs(1),
        }
    }
}

impl GraphicsConfig {
    /// Present modes in order of preference; FIFO is the universal fallback.
    pub fn present_mode_preference(&self) -> Vec<vk::PresentModeKHR> {
        if self.vsync {
            vec![self.low_latency_mode, vk::PresentModeKHR::FIFO]
        } else {
            vec![vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::MAILBOX]
        }
    }
}
