use ash::{vk, Device};

use super::result::check;
use crate::graphics::{FrameError, MAX_FRAMES_IN_FLIGHT};

/// Synchronization objects of one frame ring slot.
pub(crate) struct FrameSync {
    pub image_available: vk::Semaphore,
    pub render_finished: vk::Semaphore,
    pub in_flight: vk::Fence,
}

impl FrameSync {
    fn create(device: &Device) -> Result<Self, FrameError> {
        let semaphore_info = vk::SemaphoreCreateInfo::default();
        // Signaled, so the first wait on each slot returns immediately.
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        // SAFETY: valid device; objects are owned by the returned value.
        unsafe {
            let image_available = check(
                "vkCreateSemaphore",
                device.create_semaphore(&semaphore_info, None),
            )?;
            let render_finished = match device.create_semaphore(&semaphore_info, None) {
                Ok(semaphore) => semaphore,
                Err(code) => {
                    device.destroy_semaphore(image_available, None);
                    return check("vkCreateSemaphore", Err(code));
                }
            };
            let in_flight = match device.create_fence(&fence_info, None) {
                Ok(fence) => fence,
                Err(code) => {
                    device.destroy_semaphore(image_available, None);
                    device.destroy_semaphore(render_finished, None);
                    return check("vkCreateFence", Err(code));
                }
            };

            Ok(Self {
                image_available,
                render_finished,
                in_flight,
            })
        }
    }

    /// # Safety
    /// The device must be idle.
    pub(crate) unsafe fn destroy(&self, device: &Device) {
        unsafe {
            device.destroy_semaphore(self.image_available, None);
            device.destroy_semaphore(self.render_finished, None);
            device.destroy_fence(self.in_flight, None);
        }
    }
}

/// Allocates `MAX_FRAMES_IN_FLIGHT` slots.
pub(crate) fn create_frame_ring(device: &Device) -> Result<Vec<FrameSync>, FrameError> {
    let mut frames = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
    for _ in 0..MAX_FRAMES_IN_FLIGHT {
        match FrameSync::create(device) {
            Ok(frame) => frames.push(frame),
            Err(err) => {
                for frame in &frames {
                    // SAFETY: freshly created, never used.
                    unsafe { frame.destroy(device) };
                }
                return Err(err);
            }
        }
    }
    Ok(frames)
}
