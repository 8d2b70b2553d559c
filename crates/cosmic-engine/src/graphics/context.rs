use anyhow::Result;
use winit::window::Window;

use super::vulkan::VulkanBackend;
use super::{ContextState, FrameEngine, FrameError, FrameStatus, GraphicsConfig, ShaderDir, SurfaceHost};

/// Graphics context of one window: the Vulkan backend driven by the frame
/// engine.
pub struct GraphicsContext {
    engine: FrameEngine<VulkanBackend>,
    vsync: bool,
}

impl GraphicsContext {
    /// Creates every GPU object for `window`.
    ///
    /// Triangle shaders are read from `config.shader_dir` when set; without
    /// them frames are cleared only.
    pub fn new(window: &Window, config: GraphicsConfig) -> Result<Self> {
        let vsync = config.vsync;
        let mut engine = FrameEngine::new(config.fence_timeout);

        engine.initialize(|| {
            let size = window.inner_size();
            match config.shader_dir.clone() {
                Some(dir) => VulkanBackend::new(window, size, config, &ShaderDir::new(dir)),
                None => VulkanBackend::new(window, size, config, &()),
            }
        })?;

        Ok(Self { engine, vsync })
    }

    pub fn state(&self) -> ContextState {
        self.engine.state()
    }

    pub fn backend(&self) -> Option<&VulkanBackend> {
        self.engine.backend()
    }

    pub fn render(&mut self, host: &mut dyn SurfaceHost) -> Result<FrameStatus, FrameError> {
        self.engine.render(host)
    }

    pub fn signal_framebuffer_resized(&mut self) {
        self.engine.signal_framebuffer_resized();
    }

    pub fn is_vsync(&self) -> bool {
        self.vsync
    }

    /// Switches the present mode policy; the swapchain is rebuilt before the
    /// next frame.
    pub fn set_vsync(&mut self, enabled: bool) {
        if self.vsync == enabled {
            return;
        }
        self.vsync = enabled;
        if let Some(backend) = self.engine.backend_mut() {
            backend.set_vsync(enabled);
            self.engine.signal_framebuffer_resized();
        }
        core_info!("vsync {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn terminate(&mut self) {
        self.engine.terminate();
    }
}
