use ash::{vk, Device};

use super::pipeline::Pipeline;
use super::result::check;
use crate::graphics::FrameError;

pub(crate) fn create_command_pool(
    device: &Device,
    graphics_family: u32,
) -> Result<vk::CommandPool, FrameError> {
    let create_info = vk::CommandPoolCreateInfo::default().queue_family_index(graphics_family);
    // SAFETY: valid device and queue family.
    check("vkCreateCommandPool", unsafe {
        device.create_command_pool(&create_info, None)
    })
}

/// One framebuffer per swapchain image view.
pub(crate) fn create_framebuffers(
    device: &Device,
    render_pass: vk::RenderPass,
    image_views: &[vk::ImageView],
    extent: vk::Extent2D,
) -> Result<Vec<vk::Framebuffer>, FrameError> {
    let mut framebuffers = Vec::with_capacity(image_views.len());
    for view in image_views {
        let attachments = [*view];
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        // SAFETY: the view and render pass share the swapchain format.
        match unsafe { device.create_framebuffer(&create_info, None) } {
            Ok(framebuffer) => framebuffers.push(framebuffer),
            Err(code) => {
                destroy_framebuffers(device, &mut framebuffers);
                return check("vkCreateFramebuffer", Err(code));
            }
        }
    }
    Ok(framebuffers)
}

pub(crate) fn destroy_framebuffers(device: &Device, framebuffers: &mut Vec<vk::Framebuffer>) {
    for framebuffer in framebuffers.drain(..) {
        // SAFETY: callers idle the device before tearing down framebuffers.
        unsafe { device.destroy_framebuffer(framebuffer, None) };
    }
}

/// What every pre-recorded command buffer draws.
pub(crate) struct FramePass<'a> {
    pub render_pass: vk::RenderPass,
    pub extent: vk::Extent2D,
    pub pipeline: Option<&'a Pipeline>,
    pub clear_color: [f32; 4],
}

/// Allocates one command buffer per framebuffer and records the static frame
/// into each: clear, then the triangle when a pipeline exists.
pub(crate) fn record_command_buffers(
    device: &Device,
    pool: vk::CommandPool,
    framebuffers: &[vk::Framebuffer],
    pass: &FramePass<'_>,
) -> Result<Vec<vk::CommandBuffer>, FrameError> {
    let alloc_info = vk::CommandBufferAllocateInfo::default()
        .command_pool(pool)
        .level(vk::CommandBufferLevel::PRIMARY)
        .command_buffer_count(framebuffers.len() as u32);

    // SAFETY: valid pool on this device.
    let buffers = check("vkAllocateCommandBuffers", unsafe {
        device.allocate_command_buffers(&alloc_info)
    })?;

    let clear_values = [vk::ClearValue {
        color: vk::ClearColorValue {
            float32: pass.clear_color,
        },
    }];

    for (&buffer, &framebuffer) in buffers.iter().zip(framebuffers) {
        let recorded = record_one(device, buffer, framebuffer, pass, &clear_values);
        if let Err(err) = recorded {
            // SAFETY: none of these buffers were submitted.
            unsafe { device.free_command_buffers(pool, &buffers) };
            return Err(err);
        }
    }

    Ok(buffers)
}

fn record_one(
    device: &Device,
    buffer: vk::CommandBuffer,
    framebuffer: vk::Framebuffer,
    pass: &FramePass<'_>,
    clear_values: &[vk::ClearValue],
) -> Result<(), FrameError> {
    let begin_info = vk::CommandBufferBeginInfo::default();
    let render_pass_info = vk::RenderPassBeginInfo::default()
        .render_pass(pass.render_pass)
        .framebuffer(framebuffer)
        .render_area(vk::Rect2D::default().extent(pass.extent))
        .clear_values(clear_values);

    // SAFETY: `buffer` is freshly allocated and in the initial state.
    unsafe {
        check("vkBeginCommandBuffer", device.begin_command_buffer(buffer, &begin_info))?;
        device.cmd_begin_render_pass(buffer, &render_pass_info, vk::SubpassContents::INLINE);
        if let Some(pipeline) = pass.pipeline {
            device.cmd_bind_pipeline(buffer, vk::PipelineBindPoint::GRAPHICS, pipeline.pipeline);
            device.cmd_draw(buffer, 3, 1, 0, 0);
        }
        device.cmd_end_render_pass(buffer);
        check("vkEndCommandBuffer", device.end_command_buffer(buffer))
    }
}
