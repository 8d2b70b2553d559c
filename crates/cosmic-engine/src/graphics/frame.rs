/// Number of frames the CPU may record ahead of the GPU.
pub const MAX_FRAMES_IN_FLIGHT: usize = 2;

/// Index into the ring of per-frame synchronization slots.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct FrameRing {
    current: usize,
}

impl FrameRing {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn advance(&mut self) {
        self.current = (self.current + 1) % MAX_FRAMES_IN_FLIGHT;
    }
}

/// Per-swapchain-image record of the frame fence that last rendered into it.
///
/// The swapchain may hand back an image whose previous frame is still in
/// flight under a different ring slot; waiting on the recorded fence keeps
/// two frames from writing the same image.
#[derive(Debug, Clone)]
pub struct ImageFences<F> {
    slots: Vec<Option<F>>,
}

impl<F: Copy> ImageFences<F> {
    pub fn new(image_count: usize) -> Self {
        Self {
            slots: vec![None; image_count],
        }
    }

    /// Forgets every recorded fence and resizes to `image_count`.
    pub fn reset(&mut self, image_count: usize) {
        self.slots.clear();
        self.slots.resize(image_count, None);
    }

    /// Records `fence` for `image`, returning the previously recorded one.
    pub fn replace(&mut self, image: usize, fence: F) -> Option<F> {
        self.slots.get_mut(image).and_then(|slot| slot.replace(fence))
    }

    pub fn get(&self, image: usize) -> Option<F> {
        self.slots.get(image).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_wraps_after_max_frames() {
        let mut ring = FrameRing::default();
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            ring.advance();
        }
        assert_eq!(ring.current(), 0);
    }

    #[test]
    fn image_fences_start_empty_and_record() {
        let mut fences = ImageFences::<u32>::new(3);
        assert_eq!(fences.get(1), None);
        assert_eq!(fences.replace(1, 7), None);
        assert_eq!(fences.replace(1, 8), Some(7));
        assert_eq!(fences.get(1), Some(8));
    }

    #[test]
    fn reset_clears_and_resizes() {
        let mut fences = ImageFences::<u32>::new(2);
        fences.replace(0, 1);
        fences.reset(4);
        assert_eq!(fences.len(), 4);
        assert!((0..4).all(|i| fences.get(i).is_none()));
    }

    #[test]
    fn out_of_range_images_are_ignored() {
        let mut fences = ImageFences::<u32>::new(1);
        assert_eq!(fences.replace(5, 1), None);
        assert_eq!(fences.get(5), None);
    }
}
