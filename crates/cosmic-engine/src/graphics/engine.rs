use std::time::Duration;

use super::backend::{Acquired, FrameBackend, Presented, SurfaceHost};
use super::frame::{FrameRing, ImageFences};
use super::FrameError;

/// Lifecycle of a graphics context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ContextState {
    Uninitialized,
    Initializing,
    Ready,
    /// The swapchain is stale; it is rebuilt at the start of the next frame.
    Recreating,
    Terminated,
}

/// What a call to `FrameEngine::render` achieved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// Submitted and presented; the swapchain is current.
    Presented,
    /// Submitted and presented; the swapchain is rebuilt before the next frame.
    Stale,
    /// Nothing was submitted.
    Skipped,
}

/// Per-frame acquire/submit/present protocol over a `FrameBackend`.
///
/// Up to `MAX_FRAMES_IN_FLIGHT` frames are in flight; each ring slot is only
/// reused after its fence signaled, and each swapchain image only after the
/// fence of the frame that last used it signaled.
pub struct FrameEngine<B: FrameBackend> {
    backend: Option<B>,
    state: ContextState,
    ring: FrameRing,
    image_fences: ImageFences<B::Fence>,
    framebuffer_resized: bool,
    timeout: Duration,
}

impl<B: FrameBackend> FrameEngine<B> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            backend: None,
            state: ContextState::Uninitialized,
            ring: FrameRing::default(),
            image_fences: ImageFences::new(0),
            framebuffer_resized: false,
            timeout,
        }
    }

    /// Runs `init` to acquire the backend. On failure the engine stays
    /// uninitialized and the error is returned untouched.
    pub fn initialize<E>(&mut self, init: impl FnOnce() -> Result<B, E>) -> Result<(), E> {
        if self.state != ContextState::Uninitialized {
            core_warn!("graphics context initialized twice; ignoring ({:?})", self.state);
            return Ok(());
        }

        self.state = ContextState::Initializing;
        match init() {
            Ok(backend) => {
                self.image_fences = ImageFences::new(backend.image_count());
                self.backend = Some(backend);
                self.state = ContextState::Ready;
                Ok(())
            }
            Err(err) => {
                self.state = ContextState::Uninitialized;
                Err(err)
            }
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// Ring slot the next frame will use.
    pub fn current_frame(&self) -> usize {
        self.ring.current()
    }

    /// Marks the swapchain stale after a framebuffer size change.
    pub fn signal_framebuffer_resized(&mut self) {
        self.framebuffer_resized = true;
    }

    /// Renders and presents one frame.
    pub fn render(&mut self, host: &mut dyn SurfaceHost) -> Result<FrameStatus, FrameError> {
        match self.state {
            ContextState::Ready | ContextState::Recreating => {}
            _ => return Ok(FrameStatus::Skipped),
        }

        if self.framebuffer_resized || self.state == ContextState::Recreating {
            self.recreate(host)?;
            if self.state != ContextState::Ready {
                return Ok(FrameStatus::Skipped);
            }
        }

        let timeout = self.timeout;
        let slot = self.ring.current();
        let backend = self.backend.as_mut().ok_or(FrameError::Uninitialized)?;

        let fence = backend.in_flight_fence(slot);
        backend.wait_fence(fence, timeout)?;

        let acquired = backend.acquire_image(slot, timeout);
        self.ring.advance();

        let image = match acquired? {
            Acquired::OutOfDate => {
                self.state = ContextState::Recreating;
                return Ok(FrameStatus::Skipped);
            }
            Acquired::Image { index, .. } => index,
        };

        if let Some(previous) = self.image_fences.replace(image, fence) {
            if previous != fence {
                backend.wait_fence(previous, timeout)?;
            }
        }

        // The fence is only reset once a submission that signals it is certain.
        backend.reset_fence(fence)?;
        backend.submit(slot, image)?;

        let stale = match backend.present(slot, image)? {
            Presented::Optimal => self.framebuffer_resized,
            Presented::Suboptimal | Presented::OutOfDate => true,
        };

        if stale {
            self.state = ContextState::Recreating;
            Ok(FrameStatus::Stale)
        } else {
            Ok(FrameStatus::Presented)
        }
    }

    /// Rebuilds the swapchain for the host's current framebuffer size.
    ///
    /// Blocks on platform events while the framebuffer has zero area. If the
    /// host starts closing meanwhile, the rebuild is abandoned and the state
    /// stays `Recreating`.
    pub fn recreate(&mut self, host: &mut dyn SurfaceHost) -> Result<(), FrameError> {
        let backend = self.backend.as_mut().ok_or(FrameError::Uninitialized)?;
        self.state = ContextState::Recreating;

        let mut size = host.framebuffer_size();
        while size.width == 0 || size.height == 0 {
            if host.close_requested() {
                return Ok(());
            }
            host.wait_events();
            size = host.framebuffer_size();
        }

        backend.wait_idle()?;
        let image_count = backend.rebuild_swapchain(size)?;
        self.image_fences.reset(image_count);
        self.framebuffer_resized = false;
        self.state = ContextState::Ready;

        core_debug!(
            "swapchain rebuilt: {}x{}, {} images",
            size.width,
            size.height,
            image_count
        );
        Ok(())
    }

    /// Idles the device and releases the backend. Idempotent.
    pub fn terminate(&mut self) {
        if self.state == ContextState::Terminated {
            return;
        }

        if let Some(mut backend) = self.backend.take() {
            if let Err(err) = backend.wait_idle() {
                core_error!("device idle before teardown failed: {err}");
            }
            drop(backend);
            core_info!("graphics context terminated");
        }

        self.state = ContextState::Terminated;
    }
}

impl<B: FrameBackend> Drop for FrameEngine<B> {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use winit::dpi::PhysicalSize;

    use super::*;
    use crate::graphics::MAX_FRAMES_IN_FLIGHT;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Wait(usize),
        Reset(usize),
        Acquire(usize),
        Submit { slot: usize, image: usize },
        Present { slot: usize, image: usize },
        WaitIdle,
        Rebuild(u32, u32),
        Dropped,
    }

    type CallLog = Rc<RefCell<Vec<Call>>>;

    /// GPU stand-in: submitted work completes instantly, so waiting on an
    /// unsignaled fence can only mean the protocol reset a fence it never
    /// submitted. That is reported as a timeout.
    struct MockBackend {
        calls: CallLog,
        image_count: usize,
        next_image: usize,
        signaled: [bool; MAX_FRAMES_IN_FLIGHT],
        acquire_script: VecDeque<Result<Acquired, FrameError>>,
        present_script: VecDeque<Presented>,
        /// Image counts reported by successive rebuilds.
        rebuild_counts: VecDeque<usize>,
    }

    impl MockBackend {
        fn new(calls: &CallLog, image_count: usize) -> Self {
            Self {
                calls: Rc::clone(calls),
                image_count,
                next_image: 0,
                signaled: [true; MAX_FRAMES_IN_FLIGHT],
                acquire_script: VecDeque::new(),
                present_script: VecDeque::new(),
                rebuild_counts: VecDeque::new(),
            }
        }

        fn log(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl FrameBackend for MockBackend {
        type Fence = usize;

        fn in_flight_fence(&self, slot: usize) -> usize {
            slot
        }

        fn wait_fence(&mut self, fence: usize, _timeout: Duration) -> Result<(), FrameError> {
            self.log(Call::Wait(fence));
            if self.signaled[fence] {
                Ok(())
            } else {
                Err(FrameError::Timeout { operation: "vkWaitForFences" })
            }
        }

        fn reset_fence(&mut self, fence: usize) -> Result<(), FrameError> {
            self.log(Call::Reset(fence));
            self.signaled[fence] = false;
            Ok(())
        }

        fn acquire_image(&mut self, slot: usize, _timeout: Duration) -> Result<Acquired, FrameError> {
            self.log(Call::Acquire(slot));
            if let Some(scripted) = self.acquire_script.pop_front() {
                return scripted;
            }
            let index = self.next_image;
            self.next_image = (self.next_image + 1) % self.image_count;
            Ok(Acquired::Image { index, suboptimal: false })
        }

        fn submit(&mut self, slot: usize, image: usize) -> Result<(), FrameError> {
            self.log(Call::Submit { slot, image });
            self.signaled[slot] = true;
            Ok(())
        }

        fn present(&mut self, slot: usize, image: usize) -> Result<Presented, FrameError> {
            self.log(Call::Present { slot, image });
            Ok(self.present_script.pop_front().unwrap_or(Presented::Optimal))
        }

        fn wait_idle(&mut self) -> Result<(), FrameError> {
            self.log(Call::WaitIdle);
            Ok(())
        }

        fn rebuild_swapchain(&mut self, size: PhysicalSize<u32>) -> Result<usize, FrameError> {
            self.log(Call::Rebuild(size.width, size.height));
            self.next_image = 0;
            if let Some(count) = self.rebuild_counts.pop_front() {
                self.image_count = count;
            }
            Ok(self.image_count)
        }

        fn image_count(&self) -> usize {
            self.image_count
        }
    }

    impl Drop for MockBackend {
        fn drop(&mut self) {
            self.log(Call::Dropped);
        }
    }

    struct MockHost {
        size: PhysicalSize<u32>,
        /// Sizes reported after each successive `wait_events`.
        pending: VecDeque<PhysicalSize<u32>>,
        waits: usize,
        closing: bool,
    }

    impl MockHost {
        fn sized(width: u32, height: u32) -> Self {
            Self {
                size: PhysicalSize::new(width, height),
                pending: VecDeque::new(),
                waits: 0,
                closing: false,
            }
        }
    }

    impl SurfaceHost for MockHost {
        fn framebuffer_size(&self) -> PhysicalSize<u32> {
            self.size
        }

        fn wait_events(&mut self) {
            self.waits += 1;
            if let Some(next) = self.pending.pop_front() {
                self.size = next;
            } else {
                self.closing = true;
            }
        }

        fn close_requested(&self) -> bool {
            self.closing
        }
    }

    fn engine(calls: &CallLog, image_count: usize) -> FrameEngine<MockBackend> {
        let mut engine = FrameEngine::new(Duration::from_secs(1));
        engine
            .initialize(|| Ok::<_, FrameError>(MockBackend::new(calls, image_count)))
            .unwrap();
        calls.borrow_mut().clear();
        engine
    }

    fn submitted(calls: &CallLog) -> Vec<(usize, usize)> {
        calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Submit { slot, image } => Some((*slot, *image)),
                _ => None,
            })
            .collect()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn uninitialized_engine_skips_frames() {
        let mut engine = FrameEngine::<MockBackend>::new(Duration::from_secs(1));
        let mut host = MockHost::sized(800, 600);
        assert_eq!(engine.state(), ContextState::Uninitialized);
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Skipped);
    }

    #[test]
    fn failed_initialization_leaves_engine_uninitialized() {
        let mut engine = FrameEngine::<MockBackend>::new(Duration::from_secs(1));
        let result = engine.initialize(|| Err("no device"));
        assert_eq!(result.err(), Some("no device"));
        assert_eq!(engine.state(), ContextState::Uninitialized);
    }

    #[test]
    fn initialization_reaches_ready() {
        let calls = CallLog::default();
        let engine = engine(&calls, 3);
        assert_eq!(engine.state(), ContextState::Ready);
        assert_eq!(engine.current_frame(), 0);
    }

    #[test]
    fn terminate_is_idempotent_and_idles_first() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        engine.terminate();
        engine.terminate();
        assert_eq!(engine.state(), ContextState::Terminated);
        assert_eq!(*calls.borrow(), [Call::WaitIdle, Call::Dropped]);

        let mut host = MockHost::sized(800, 600);
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Skipped);
        drop(engine);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn dropping_the_engine_terminates() {
        let calls = CallLog::default();
        drop(engine(&calls, 2));
        assert_eq!(*calls.borrow(), [Call::WaitIdle, Call::Dropped]);
    }

    // ── frame protocol ────────────────────────────────────────────────────

    #[test]
    fn frame_follows_wait_acquire_reset_submit_present() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);

        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);
        assert_eq!(
            *calls.borrow(),
            [
                Call::Wait(0),
                Call::Acquire(0),
                Call::Reset(0),
                Call::Submit { slot: 0, image: 0 },
                Call::Present { slot: 0, image: 0 },
            ]
        );
    }

    #[test]
    fn ring_cycles_without_deadlock() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);

        for frame in 0..2 * MAX_FRAMES_IN_FLIGHT {
            assert_eq!(engine.current_frame(), frame % MAX_FRAMES_IN_FLIGHT);
            assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);
        }
        assert_eq!(engine.current_frame(), 0);

        let slots: Vec<usize> = submitted(&calls).iter().map(|(slot, _)| *slot).collect();
        assert_eq!(slots, [0, 1, 0, 1]);
    }

    #[test]
    fn reused_image_waits_for_its_previous_fence() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);

        // Images 0, 1, 2 under slots 0, 1, 0. The fourth frame runs in slot 1
        // but gets image 0 back, last rendered under slot 0.
        for _ in 0..3 {
            engine.render(&mut host).unwrap();
        }
        calls.borrow_mut().clear();
        engine.render(&mut host).unwrap();

        assert_eq!(
            *calls.borrow(),
            [
                Call::Wait(1),
                Call::Acquire(1),
                Call::Wait(0),
                Call::Reset(1),
                Call::Submit { slot: 1, image: 0 },
                Call::Present { slot: 1, image: 0 },
            ]
        );
    }

    #[test]
    fn out_of_date_acquire_skips_submission_and_rebuilds_next_frame() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(1024, 768);
        engine
            .backend_mut()
            .unwrap()
            .acquire_script
            .push_back(Ok(Acquired::OutOfDate));

        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Skipped);
        assert_eq!(engine.state(), ContextState::Recreating);
        assert!(submitted(&calls).is_empty());
        // The slot advances even though the frame was dropped.
        assert_eq!(engine.current_frame(), 1);

        calls.borrow_mut().clear();
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);
        assert_eq!(engine.state(), ContextState::Ready);
        assert_eq!(calls.borrow()[..2], [Call::WaitIdle, Call::Rebuild(1024, 768)]);
        assert_eq!(submitted(&calls), [(1, 0)]);
    }

    #[test]
    fn skipped_frames_never_leave_a_fence_reset() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 2);
        let mut host = MockHost::sized(640, 480);
        {
            let backend = engine.backend_mut().unwrap();
            backend.acquire_script.push_back(Ok(Acquired::OutOfDate));
            backend.acquire_script.push_back(Ok(Acquired::OutOfDate));
        }

        for _ in 0..2 * MAX_FRAMES_IN_FLIGHT {
            engine.render(&mut host).unwrap();
        }
        assert_eq!(engine.state(), ContextState::Ready);
    }

    #[test]
    fn suboptimal_present_marks_the_swapchain_stale() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);
        engine
            .backend_mut()
            .unwrap()
            .present_script
            .push_back(Presented::Suboptimal);

        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Stale);
        assert_eq!(engine.state(), ContextState::Recreating);

        engine.render(&mut host).unwrap();
        assert!(calls.borrow().contains(&Call::Rebuild(800, 600)));
    }

    #[test]
    fn resize_signal_rebuilds_with_the_new_size() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);
        engine.render(&mut host).unwrap();

        host.size = PhysicalSize::new(1920, 1080);
        engine.signal_framebuffer_resized();
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);
        assert!(calls.borrow().contains(&Call::Rebuild(1920, 1080)));
    }

    #[test]
    fn rebuild_with_fewer_images_keeps_frames_flowing() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);
        for _ in 0..3 {
            engine.render(&mut host).unwrap();
        }

        engine.backend_mut().unwrap().rebuild_counts.push_back(2);
        engine.signal_framebuffer_resized();
        calls.borrow_mut().clear();

        for _ in 0..2 * MAX_FRAMES_IN_FLIGHT {
            assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);
        }
        assert_eq!(engine.state(), ContextState::Ready);
        assert_eq!(engine.backend().unwrap().image_count(), 2);

        // Ring position carried over from the three frames before the rebuild.
        let frames = submitted(&calls);
        assert_eq!(frames, [(1, 0), (0, 1), (1, 0), (0, 1)]);
        assert_eq!(engine.current_frame(), 1);
    }

    #[test]
    fn resize_flag_is_consumed_by_one_rebuild() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);

        engine.signal_framebuffer_resized();
        engine.signal_framebuffer_resized();
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);

        let rebuilds = calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Rebuild(..)))
            .count();
        assert_eq!(rebuilds, 1);
    }

    #[test]
    fn minimized_window_blocks_on_events_until_visible() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(0, 0);
        host.pending.push_back(PhysicalSize::new(0, 0));
        host.pending.push_back(PhysicalSize::new(300, 200));

        engine.signal_framebuffer_resized();
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Presented);
        assert_eq!(host.waits, 2);
        assert!(calls.borrow().contains(&Call::Rebuild(300, 200)));
    }

    #[test]
    fn closing_while_minimized_abandons_the_rebuild() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(0, 0);

        engine.signal_framebuffer_resized();
        assert_eq!(engine.render(&mut host).unwrap(), FrameStatus::Skipped);
        assert_eq!(engine.state(), ContextState::Recreating);
        assert!(calls.borrow().is_empty());
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn acquire_failure_is_returned() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);
        engine
            .backend_mut()
            .unwrap()
            .acquire_script
            .push_back(Err(FrameError::DeviceLost { operation: "vkAcquireNextImageKHR" }));

        let err = engine.render(&mut host).unwrap_err();
        assert!(matches!(err, FrameError::DeviceLost { .. }));
    }

    #[test]
    fn fence_timeout_is_returned() {
        let calls = CallLog::default();
        let mut engine = engine(&calls, 3);
        let mut host = MockHost::sized(800, 600);
        engine.backend_mut().unwrap().signaled[0] = false;

        let err = engine.render(&mut host).unwrap_err();
        assert!(matches!(err, FrameError::Timeout { .. }));
    }
}
