use ash::vk::Handle;
use ash::{vk, Device};

use super::result::check;
use crate::graphics::FrameError;

/// Single color attachment, cleared on load and handed to presentation.
pub(crate) fn create_render_pass(
    device: &Device,
    format: vk::Format,
) -> Result<vk::RenderPass, FrameError> {
    let color_attachment = vk::AttachmentDescription::default()
        .format(format)
        .samples(vk::SampleCountFlags::TYPE_1)
        .load_op(vk::AttachmentLoadOp::CLEAR)
        .store_op(vk::AttachmentStoreOp::STORE)
        .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
        .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
        .initial_layout(vk::ImageLayout::UNDEFINED)
        .final_layout(vk::ImageLayout::PRESENT_SRC_KHR);

    let color_ref = vk::AttachmentReference::default()
        .attachment(0)
        .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    let subpass = vk::SubpassDescription::default()
        .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
        .color_attachments(std::slice::from_ref(&color_ref));

    // The image-available semaphore is waited at COLOR_ATTACHMENT_OUTPUT; the
    // layout transition must not start before that point.
    let dependency = vk::SubpassDependency::default()
        .src_subpass(vk::SUBPASS_EXTERNAL)
        .dst_subpass(0)
        .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .src_access_mask(vk::AccessFlags::empty())
        .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

    let attachments = [color_attachment];
    let subpasses = [subpass];
    let dependencies = [dependency];
    let create_info = vk::RenderPassCreateInfo::default()
        .attachments(&attachments)
        .subpasses(&subpasses)
        .dependencies(&dependencies);

    // SAFETY: valid device; create info references locals.
    check("vkCreateRenderPass", unsafe {
        device.create_render_pass(&create_info, None)
    })
}

/// Fixed triangle pipeline. Vertices come from the vertex shader itself, so
/// there is no vertex input state.
pub(crate) struct Pipeline {
    pub layout: vk::PipelineLayout,
    pub pipeline: vk::Pipeline,
}

impl Pipeline {
    pub(crate) fn create(
        device: &Device,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
        vertex: &[u32],
        fragment: &[u32],
    ) -> Result<Self, FrameError> {
        let vert_module = create_shader_module(device, vertex)?;
        let frag_module = match create_shader_module(device, fragment) {
            Ok(module) => module,
            Err(err) => {
                // SAFETY: the module is not referenced by anything yet.
                unsafe { device.destroy_shader_module(vert_module, None) };
                return Err(err);
            }
        };

        let result = Self::build(device, render_pass, extent, vert_module, frag_module);

        // SAFETY: modules are only needed during pipeline creation.
        unsafe {
            device.destroy_shader_module(vert_module, None);
            device.destroy_shader_module(frag_module, None);
        }
        result
    }

    fn build(
        device: &Device,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
        vert_module: vk::ShaderModule,
        frag_module: vk::ShaderModule,
    ) -> Result<Self, FrameError> {
        let entry_point = c"main";
        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vert_module)
                .name(entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(frag_module)
                .name(entry_point),
        ];

        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        let viewport = vk::Viewport::default()
            .width(extent.width as f32)
            .height(extent.height as f32)
            .min_depth(0.0)
            .max_depth(1.0);
        let scissor = vk::Rect2D::default().extent(extent);
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(std::slice::from_ref(&viewport))
            .scissors(std::slice::from_ref(&scissor));

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::CLOCKWISE);

        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let blend_attachment = vk::PipelineColorBlendAttachmentState::default()
            .color_write_mask(vk::ColorComponentFlags::RGBA)
            .blend_enable(false);
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(std::slice::from_ref(&blend_attachment));

        let layout_info = vk::PipelineLayoutCreateInfo::default();
        // SAFETY: empty layout on a valid device.
        let layout = check("vkCreatePipelineLayout", unsafe {
            device.create_pipeline_layout(&layout_info, None)
        })?;

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .color_blend_state(&color_blend)
            .layout(layout)
            .render_pass(render_pass)
            .subpass(0);

        // SAFETY: every referenced state object lives until the call returns.
        let created = unsafe {
            device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
        };

        match created {
            Ok(pipelines) => Ok(Self {
                layout,
                pipeline: pipelines[0],
            }),
            Err((_, code)) => {
                // SAFETY: the layout is not referenced by any pipeline.
                unsafe { device.destroy_pipeline_layout(layout, None) };
                check("vkCreateGraphicsPipelines", Err(code))
            }
        }
    }

    /// # Safety
    /// No command buffer referencing the pipeline may be pending.
    pub(crate) unsafe fn destroy(&self, device: &Device) {
        unsafe {
            device.destroy_pipeline(self.pipeline, None);
            device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

fn create_shader_module(device: &Device, code: &[u32]) -> Result<vk::ShaderModule, FrameError> {
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    // SAFETY: `code` is validated SPIR-V (magic checked at load).
    check("vkCreateShaderModule", unsafe {
        device.create_shader_module(&create_info, None)
    })
}
