use ash::vk;
use thiserror::Error;

/// Failures of the frame loop. Every variant is fatal for the context.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error("device lost during {operation}")]
    DeviceLost { operation: &'static str },

    #[error("{operation} failed: {result:?}")]
    Vulkan {
        operation: &'static str,
        result: vk::Result,
    },

    #[error("graphics context used before initialization")]
    Uninitialized,
}

impl FrameError {
    /// Classifies a failed Vulkan result.
    pub fn from_vk(operation: &'static str, result: vk::Result) -> Self {
        match result {
            vk::Result::TIMEOUT => FrameError::Timeout { operation },
            vk::Result::ERROR_DEVICE_LOST => FrameError::DeviceLost { operation },
            result => FrameError::Vulkan { operation, result },
        }
    }
}
