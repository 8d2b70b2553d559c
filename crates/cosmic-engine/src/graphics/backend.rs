use std::fmt::Debug;
use std::time::Duration;

use winit::dpi::PhysicalSize;

use super::FrameError;

/// Outcome of acquiring a swapchain image.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Acquired {
    /// `suboptimal` images are still presentable.
    Image { index: usize, suboptimal: bool },
    /// The swapchain no longer matches the surface; nothing was acquired.
    OutOfDate,
}

/// Outcome of queueing a present.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Presented {
    Optimal,
    Suboptimal,
    OutOfDate,
}

/// GPU operations the frame protocol is built from.
///
/// `slot` is a frame ring index in `0..MAX_FRAMES_IN_FLIGHT`; `image` is a
/// swapchain image index. Dropping the backend releases every GPU object it
/// owns; the engine idles the device first.
pub trait FrameBackend {
    type Fence: Copy + Eq + Debug;

    /// In-flight fence of a ring slot.
    fn in_flight_fence(&self, slot: usize) -> Self::Fence;

    fn wait_fence(&mut self, fence: Self::Fence, timeout: Duration) -> Result<(), FrameError>;

    fn reset_fence(&mut self, fence: Self::Fence) -> Result<(), FrameError>;

    /// Acquires the next image, signaling the slot's image-available semaphore.
    fn acquire_image(&mut self, slot: usize, timeout: Duration) -> Result<Acquired, FrameError>;

    /// Submits the image's recorded commands: waits on the slot's
    /// image-available semaphore, signals its render-complete semaphore and
    /// its in-flight fence.
    fn submit(&mut self, slot: usize, image: usize) -> Result<(), FrameError>;

    /// Presents `image` once the slot's render-complete semaphore signals.
    fn present(&mut self, slot: usize, image: usize) -> Result<Presented, FrameError>;

    /// Blocks until the device has finished all submitted work.
    fn wait_idle(&mut self) -> Result<(), FrameError>;

    /// Tears down and rebuilds the swapchain and everything derived from it.
    /// Returns the new image count.
    fn rebuild_swapchain(&mut self, size: PhysicalSize<u32>) -> Result<usize, FrameError>;

    fn image_count(&self) -> usize;
}

/// The window side of a swapchain rebuild.
pub trait SurfaceHost {
    /// Current framebuffer size in physical pixels; zero while minimized.
    fn framebuffer_size(&self) -> PhysicalSize<u32>;

    /// Blocks until at least one platform event was processed.
    fn wait_events(&mut self);

    /// True once the window is going away; a pending rebuild is abandoned.
    fn close_requested(&self) -> bool {
        false
    }
}
