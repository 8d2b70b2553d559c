use std::time::Duration;

use anyhow::{Context, Result};
use ash::khr::{surface, swapchain};
use ash::prelude::VkResult;
use ash::vk::Handle;
use ash::{vk, Device, Entry, Instance};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use super::commands::{self, FramePass};
use super::device::{self, PhysicalDevice};
use super::instance::{self, DebugMessenger};
use super::pipeline::{self, Pipeline};
use super::result::{check, release_on_err, warn_partial};
use super::swapchain::{SwapchainBundle, SwapchainTarget};
use super::sync::{self, FrameSync};
use crate::graphics::{Acquired, FrameBackend, FrameError, GraphicsConfig, Presented, ShaderSource};

/// Loader, instance and surface. Destroyed last.
struct InstanceCore {
    _entry: Entry,
    instance: Instance,
    debug: Option<DebugMessenger>,
    surface_loader: surface::Instance,
    surface: vk::SurfaceKHR,
}

impl Drop for InstanceCore {
    fn drop(&mut self) {
        // SAFETY: every device-level object was destroyed before this runs.
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
            if let Some(debug) = &self.debug {
                debug.destroy();
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Logical device and its queues.
struct DeviceCore {
    device: Device,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
}

impl Drop for DeviceCore {
    fn drop(&mut self) {
        // SAFETY: the owning backend destroyed its children and idled the device.
        unsafe { self.device.destroy_device(None) };
    }
}

struct ShaderPair {
    vertex: Vec<u32>,
    fragment: Vec<u32>,
}

/// Everything rebuilt together with the swapchain.
#[derive(Default)]
struct SwapchainResources {
    bundle: Option<SwapchainBundle>,
    render_pass: vk::RenderPass,
    pipeline: Option<Pipeline>,
    framebuffers: Vec<vk::Framebuffer>,
    command_buffers: Vec<vk::CommandBuffer>,
}

/// Device-level objects owned directly by the backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Stage {
    CommandPool,
    /// Swapchain, image views, render pass, pipeline, framebuffers and
    /// recorded command buffers.
    SwapchainResources,
    /// Semaphore pairs and in-flight fences.
    FrameRing,
}

const CREATION_ORDER: [Stage; 3] = [Stage::CommandPool, Stage::SwapchainResources, Stage::FrameRing];

fn teardown_order() -> impl Iterator<Item = Stage> {
    CREATION_ORDER.into_iter().rev()
}

/// Vulkan renderer for one window surface.
///
/// Owns the full object graph from instance down to per-frame semaphores.
/// Frames clear to `GraphicsConfig::clear_color` and, when SPIR-V shaders
/// were supplied, draw a single triangle on top.
pub struct VulkanBackend {
    config: GraphicsConfig,
    shaders: Option<ShaderPair>,
    frames: Vec<FrameSync>,
    command_pool: vk::CommandPool,
    resources: SwapchainResources,
    swapchain_loader: swapchain::Device,
    physical: PhysicalDevice,
    // Field order is drop order: device before instance.
    device: DeviceCore,
    core: InstanceCore,
}

impl VulkanBackend {
    pub fn new<W>(
        window: &W,
        size: PhysicalSize<u32>,
        config: GraphicsConfig,
        shader_source: &dyn ShaderSource,
    ) -> Result<Self>
    where
        W: HasDisplayHandle + HasWindowHandle,
    {
        let display = window
            .display_handle()
            .context("window has no display handle")?
            .as_raw();
        let window_handle = window
            .window_handle()
            .context("window has no window handle")?
            .as_raw();

        // SAFETY: the loader library stays alive as long as `entry`.
        let entry = unsafe { Entry::load() }.context("failed to load the Vulkan loader")?;
        let (instance, debug) = instance::create_instance(&entry, display, &config)?;
        let surface_loader = surface::Instance::new(&entry, &instance);

        // SAFETY: the handles come from a live window that outlives the surface.
        let created = unsafe {
            ash_window::create_surface(&entry, &instance, display, window_handle, None)
        };
        // SAFETY: nothing else was created from the instance.
        let surface = release_on_err(created, || unsafe {
            if let Some(debug) = &debug {
                debug.destroy();
            }
            instance.destroy_instance(None);
        })
        .context("vkCreateSurfaceKHR failed")?;

        let core = InstanceCore {
            _entry: entry,
            instance,
            debug,
            surface_loader,
            surface,
        };

        let physical =
            device::pick_physical_device(&core.instance, &core.surface_loader, core.surface)?;
        let (logical, graphics_queue, present_queue) =
            device::create_logical_device(&core.instance, &physical)?;
        let device = DeviceCore {
            device: logical,
            graphics_queue,
            present_queue,
        };
        let swapchain_loader = swapchain::Device::new(&core.instance, &device.device);

        let shaders = match (shader_source.load("vert"), shader_source.load("frag")) {
            (Some(vertex), Some(fragment)) => Some(ShaderPair { vertex, fragment }),
            _ => {
                core_warn!("no triangle shaders available; frames will only be cleared");
                None
            }
        };

        let mut backend = Self {
            config,
            shaders,
            frames: Vec::new(),
            command_pool: vk::CommandPool::null(),
            resources: SwapchainResources::default(),
            swapchain_loader,
            physical,
            device,
            core,
        };

        for stage in CREATION_ORDER {
            backend.create_stage(stage, size)?;
        }

        core_info!("Vulkan backend ready on {}", backend.physical.name());
        Ok(backend)
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    pub fn device_name(&self) -> String {
        self.physical.name()
    }

    pub fn present_mode(&self) -> Option<vk::PresentModeKHR> {
        self.resources.bundle.as_ref().map(|bundle| bundle.present_mode)
    }

    /// Takes effect at the next swapchain rebuild.
    pub fn set_vsync(&mut self, enabled: bool) {
        self.config.vsync = enabled;
    }

    fn create_stage(&mut self, stage: Stage, size: PhysicalSize<u32>) -> Result<(), FrameError> {
        match stage {
            Stage::CommandPool => {
                self.command_pool = commands::create_command_pool(
                    &self.device.device,
                    self.physical.families.graphics,
                )?;
            }
            Stage::SwapchainResources => self.build_swapchain_resources(size)?,
            Stage::FrameRing => self.frames = sync::create_frame_ring(&self.device.device)?,
        }
        Ok(())
    }

    /// Tolerates a stage that was never created.
    ///
    /// # Safety
    /// The device must be idle.
    unsafe fn destroy_stage(&mut self, stage: Stage) {
        let device = &self.device.device;
        match stage {
            Stage::CommandPool => {
                unsafe { device.destroy_command_pool(self.command_pool, None) };
                self.command_pool = vk::CommandPool::null();
            }
            Stage::SwapchainResources => unsafe { self.destroy_swapchain_resources() },
            Stage::FrameRing => {
                for frame in self.frames.drain(..) {
                    unsafe { frame.destroy(device) };
                }
            }
        }
    }

    fn build_swapchain_resources(&mut self, size: PhysicalSize<u32>) -> Result<(), FrameError> {
        let device = &self.device.device;
        let target = SwapchainTarget {
            surface_loader: &self.core.surface_loader,
            swapchain_loader: &self.swapchain_loader,
            device,
            physical: self.physical.handle,
            surface: self.core.surface,
            families: self.physical.families,
        };

        let bundle = SwapchainBundle::create(&target, &self.config, size)?;
        let format = bundle.format.format;
        let extent = bundle.extent;
        let views = bundle.image_views.clone();
        self.resources.bundle = Some(bundle);

        let res = &mut self.resources;
        res.render_pass = pipeline::create_render_pass(device, format)?;
        res.pipeline = match &self.shaders {
            Some(shaders) => Some(Pipeline::create(
                device,
                res.render_pass,
                extent,
                &shaders.vertex,
                &shaders.fragment,
            )?),
            None => None,
        };
        res.framebuffers = commands::create_framebuffers(device, res.render_pass, &views, extent)?;

        let pass = FramePass {
            render_pass: res.render_pass,
            extent,
            pipeline: res.pipeline.as_ref(),
            clear_color: self.config.clear_color,
        };
        res.command_buffers =
            commands::record_command_buffers(device, self.command_pool, &res.framebuffers, &pass)?;
        Ok(())
    }

    /// Reverse of `build_swapchain_resources`. Tolerates partially built state.
    ///
    /// # Safety
    /// The device must be idle.
    unsafe fn destroy_swapchain_resources(&mut self) {
        let device = &self.device.device;
        let res = &mut self.resources;
        unsafe {
            if !res.command_buffers.is_empty() {
                device.free_command_buffers(self.command_pool, &res.command_buffers);
                res.command_buffers.clear();
            }
            commands::destroy_framebuffers(device, &mut res.framebuffers);
            if let Some(pipeline) = res.pipeline.take() {
                pipeline.destroy(device);
            }
            device.destroy_render_pass(res.render_pass, None);
            res.render_pass = vk::RenderPass::null();
            if let Some(mut bundle) = res.bundle.take() {
                bundle.destroy(device, &self.swapchain_loader);
            }
        }
    }

    fn swapchain(&self) -> Result<vk::SwapchainKHR, FrameError> {
        self.resources
            .bundle
            .as_ref()
            .map(|bundle| bundle.swapchain)
            .ok_or(FrameError::Uninitialized)
    }
}

fn timeout_nanos(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX)
}

fn acquire_outcome(result: VkResult<(u32, bool)>) -> Result<Acquired, FrameError> {
    match result {
        Ok((index, suboptimal)) => {
            if suboptimal {
                warn_partial("vkAcquireNextImageKHR", vk::Result::SUBOPTIMAL_KHR);
            }
            Ok(Acquired::Image {
                index: index as usize,
                suboptimal,
            })
        }
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(Acquired::OutOfDate),
        Err(code) => check("vkAcquireNextImageKHR", Err(code)),
    }
}

fn present_outcome(result: VkResult<bool>) -> Result<Presented, FrameError> {
    match result {
        Ok(false) => Ok(Presented::Optimal),
        Ok(true) => {
            warn_partial("vkQueuePresentKHR", vk::Result::SUBOPTIMAL_KHR);
            Ok(Presented::Suboptimal)
        }
        Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(Presented::OutOfDate),
        Err(code) => check("vkQueuePresentKHR", Err(code)),
    }
}

impl FrameBackend for VulkanBackend {
    type Fence = vk::Fence;

    fn in_flight_fence(&self, slot: usize) -> vk::Fence {
        self.frames[slot].in_flight
    }

    fn wait_fence(&mut self, fence: vk::Fence, timeout: Duration) -> Result<(), FrameError> {
        // SAFETY: `fence` belongs to this device.
        check("vkWaitForFences", unsafe {
            self.device
                .device
                .wait_for_fences(&[fence], true, timeout_nanos(timeout))
        })
    }

    fn reset_fence(&mut self, fence: vk::Fence) -> Result<(), FrameError> {
        // SAFETY: the fence is signaled and not part of a pending submission.
        check("vkResetFences", unsafe {
            self.device.device.reset_fences(&[fence])
        })
    }

    fn acquire_image(&mut self, slot: usize, timeout: Duration) -> Result<Acquired, FrameError> {
        let swapchain = self.swapchain()?;
        let semaphore = self.frames[slot].image_available;

        // SAFETY: the semaphore is unsignaled; the slot's previous submission completed.
        let result = unsafe {
            self.swapchain_loader.acquire_next_image(
                swapchain,
                timeout_nanos(timeout),
                semaphore,
                vk::Fence::null(),
            )
        };

        acquire_outcome(result)
    }

    fn submit(&mut self, slot: usize, image: usize) -> Result<(), FrameError> {
        let frame = &self.frames[slot];
        let wait_semaphores = [frame.image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [self.resources.command_buffers[image]];
        let signal_semaphores = [frame.render_finished];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        // SAFETY: the command buffer was recorded for this image and is not pending.
        check("vkQueueSubmit", unsafe {
            self.device
                .device
                .queue_submit(self.device.graphics_queue, &[submit_info], frame.in_flight)
        })
    }

    fn present(&mut self, slot: usize, image: usize) -> Result<Presented, FrameError> {
        let wait_semaphores = [self.frames[slot].render_finished];
        let swapchains = [self.swapchain()?];
        let image_indices = [image as u32];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        // SAFETY: `image` was acquired from this swapchain and submitted.
        let result = unsafe {
            self.swapchain_loader
                .queue_present(self.device.present_queue, &present_info)
        };

        present_outcome(result)
    }

    fn wait_idle(&mut self) -> Result<(), FrameError> {
        // SAFETY: valid device.
        check("vkDeviceWaitIdle", unsafe {
            self.device.device.device_wait_idle()
        })
    }

    fn rebuild_swapchain(&mut self, size: PhysicalSize<u32>) -> Result<usize, FrameError> {
        // SAFETY: the engine idles the device before rebuilding.
        unsafe { self.destroy_swapchain_resources() };
        self.build_swapchain_resources(size)?;
        Ok(self.image_count())
    }

    fn image_count(&self) -> usize {
        self.resources
            .bundle
            .as_ref()
            .map_or(0, |bundle| bundle.images.len())
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        // SAFETY: valid device.
        if let Err(code) = unsafe { self.device.device.device_wait_idle() } {
            core_error!("vkDeviceWaitIdle failed during teardown: {code:?}");
        }
        for stage in teardown_order() {
            // SAFETY: idle, see above.
            unsafe { self.destroy_stage(stage) };
        }
        core_debug!("Vulkan backend released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── object lifetime ───────────────────────────────────────────────────

    #[test]
    fn frame_ring_is_created_after_swapchain_resources() {
        assert_eq!(
            CREATION_ORDER,
            [Stage::CommandPool, Stage::SwapchainResources, Stage::FrameRing]
        );
    }

    #[test]
    fn teardown_reverses_creation() {
        let teardown: Vec<Stage> = teardown_order().collect();
        assert_eq!(
            teardown,
            [Stage::FrameRing, Stage::SwapchainResources, Stage::CommandPool]
        );
    }

    // ── acquire / present results ─────────────────────────────────────────

    #[test]
    fn suboptimal_acquire_still_yields_the_image() {
        assert!(matches!(
            acquire_outcome(Ok((1, true))),
            Ok(Acquired::Image {
                index: 1,
                suboptimal: true
            })
        ));
        assert!(matches!(
            acquire_outcome(Ok((0, false))),
            Ok(Acquired::Image {
                index: 0,
                suboptimal: false
            })
        ));
    }

    #[test]
    fn out_of_date_acquire_is_not_an_error() {
        assert!(matches!(
            acquire_outcome(Err(vk::Result::ERROR_OUT_OF_DATE_KHR)),
            Ok(Acquired::OutOfDate)
        ));
    }

    #[test]
    fn acquire_timeout_is_fatal() {
        assert!(matches!(
            acquire_outcome(Err(vk::Result::TIMEOUT)),
            Err(FrameError::Timeout {
                operation: "vkAcquireNextImageKHR"
            })
        ));
    }

    #[test]
    fn present_results_map_to_outcomes() {
        assert!(matches!(present_outcome(Ok(false)), Ok(Presented::Optimal)));
        assert!(matches!(present_outcome(Ok(true)), Ok(Presented::Suboptimal)));
        assert!(matches!(
            present_outcome(Err(vk::Result::ERROR_OUT_OF_DATE_KHR)),
            Ok(Presented::OutOfDate)
        ));
        assert!(matches!(
            present_outcome(Err(vk::Result::ERROR_DEVICE_LOST)),
            Err(FrameError::DeviceLost {
                operation: "vkQueuePresentKHR"
            })
        ));
    }
}
