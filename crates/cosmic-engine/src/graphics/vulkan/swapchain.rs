use ash::khr::{surface, swapchain};
use ash::vk::Handle;
use ash::{vk, Device};
use winit::dpi::PhysicalSize;

use super::device::QueueFamilies;
use super::result::check;
use super::surface::{choose_extent, choose_present_mode, choose_surface_format, determine_image_count};
use crate::graphics::{FrameError, GraphicsConfig};

/// Swapchain handle plus the per-image views derived from it.
pub(crate) struct SwapchainBundle {
    pub swapchain: vk::SwapchainKHR,
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
}

pub(crate) struct SwapchainTarget<'a> {
    pub surface_loader: &'a surface::Instance,
    pub swapchain_loader: &'a swapchain::Device,
    pub device: &'a Device,
    pub physical: vk::PhysicalDevice,
    pub surface: vk::SurfaceKHR,
    pub families: QueueFamilies,
}

impl SwapchainBundle {
    pub(crate) fn create(
        target: &SwapchainTarget<'_>,
        config: &GraphicsConfig,
        framebuffer: PhysicalSize<u32>,
    ) -> Result<Self, FrameError> {
        let physical = target.physical;
        let surface = target.surface;

        // SAFETY: surface and physical device belong to the same instance.
        let caps = check("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", unsafe {
            target
                .surface_loader
                .get_physical_device_surface_capabilities(physical, surface)
        })?;
        let formats = check("vkGetPhysicalDeviceSurfaceFormatsKHR", unsafe {
            target
                .surface_loader
                .get_physical_device_surface_formats(physical, surface)
        })?;
        let modes = check("vkGetPhysicalDeviceSurfacePresentModesKHR", unsafe {
            target
                .surface_loader
                .get_physical_device_surface_present_modes(physical, surface)
        })?;

        let format = choose_surface_format(&formats).ok_or(FrameError::Vulkan {
            operation: "vkGetPhysicalDeviceSurfaceFormatsKHR",
            result: vk::Result::ERROR_FORMAT_NOT_SUPPORTED,
        })?;
        let present_mode = choose_present_mode(&modes, &config.present_mode_preference());
        let image_count = determine_image_count(&caps, config.buffering.image_count());
        let extent = choose_extent(&caps, framebuffer);

        let pre_transform = if caps
            .supported_transforms
            .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
        {
            vk::SurfaceTransformFlagsKHR::IDENTITY
        } else {
            caps.current_transform
        };

        let family_indices = target.families.unique();
        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(image_count)
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .pre_transform(pre_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true);

        create_info = if target.families.is_shared() {
            create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
        } else {
            create_info
                .image_sharing_mode(vk::SharingMode::CONCURRENT)
                .queue_family_indices(&family_indices)
        };

        // SAFETY: create info references locals that outlive the call.
        let swapchain = check("vkCreateSwapchainKHR", unsafe {
            target.swapchain_loader.create_swapchain(&create_info, None)
        })?;

        let images = check("vkGetSwapchainImagesKHR", unsafe {
            target.swapchain_loader.get_swapchain_images(swapchain)
        })?;

        let mut bundle = Self {
            swapchain,
            format,
            present_mode,
            extent,
            images,
            image_views: Vec::new(),
        };

        for image in bundle.images.clone() {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format.format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            // SAFETY: `image` belongs to the swapchain created above.
            match unsafe { target.device.create_image_view(&view_info, None) } {
                Ok(view) => bundle.image_views.push(view),
                Err(code) => {
                    // SAFETY: nothing references the partial bundle yet.
                    unsafe { bundle.destroy(target.device, target.swapchain_loader) };
                    return check("vkCreateImageView", Err(code));
                }
            }
        }

        core_info!(
            "swapchain: {:?}/{:?}, {:?}, {}x{}, {} images",
            format.format,
            format.color_space,
            present_mode,
            extent.width,
            extent.height,
            bundle.images.len()
        );
        Ok(bundle)
    }

    /// Destroys the image views, then the swapchain.
    ///
    /// # Safety
    /// The device must be idle with respect to every image of this swapchain.
    pub(crate) unsafe fn destroy(&mut self, device: &Device, loader: &swapchain::Device) {
        unsafe {
            for view in self.image_views.drain(..) {
                device.destroy_image_view(view, None);
            }
            loader.destroy_swapchain(self.swapchain, None);
        }
        self.swapchain = vk::SwapchainKHR::null();
        self.images.clear();
    }
}
