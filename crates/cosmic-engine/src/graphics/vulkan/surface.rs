use ash::vk;
use winit::dpi::PhysicalSize;

const PREFERRED_FORMAT: vk::Format = vk::Format::B8G8R8A8_SRGB;
const PREFERRED_COLOR_SPACE: vk::ColorSpaceKHR = vk::ColorSpaceKHR::SRGB_NONLINEAR;

/// Picks the swapchain surface format.
///
/// Prefers `B8G8R8A8_SRGB` with the sRGB nonlinear color space, otherwise the
/// first reported format. A lone `UNDEFINED` entry means the surface accepts
/// anything, which resolves to the preferred format.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    let preferred = vk::SurfaceFormatKHR {
        format: PREFERRED_FORMAT,
        color_space: PREFERRED_COLOR_SPACE,
    };

    match formats {
        [] => None,
        [only] if only.format == vk::Format::UNDEFINED => Some(preferred),
        _ => Some(
            formats
                .iter()
                .copied()
                .find(|f| f.format == PREFERRED_FORMAT && f.color_space == PREFERRED_COLOR_SPACE)
                .unwrap_or(formats[0]),
        ),
    }
}

/// First mode of `preference` the surface supports, else FIFO (always available).
pub fn choose_present_mode(
    available: &[vk::PresentModeKHR],
    preference: &[vk::PresentModeKHR],
) -> vk::PresentModeKHR {
    preference
        .iter()
        .copied()
        .find(|mode| available.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// Clamps the requested image count to `[min_image_count + 1, max_image_count]`.
///
/// A `max_image_count` of zero means the surface sets no upper bound. If the
/// surface maximum is below `min + 1`, the maximum wins.
pub fn determine_image_count(caps: &vk::SurfaceCapabilitiesKHR, requested: u32) -> u32 {
    let upper = match caps.max_image_count {
        0 => u32::MAX,
        max => max,
    };
    let lower = caps.min_image_count.saturating_add(1).min(upper);
    let count = requested.clamp(lower, upper);

    if count != requested {
        core_warn!(
            "requested {requested} swapchain images; surface allows min {} max {}, using {count}",
            caps.min_image_count,
            caps.max_image_count
        );
    }
    count
}

/// Swapchain extent: the surface's current extent, or the framebuffer size
/// clamped to the surface limits when the surface leaves it to the swapchain.
pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, framebuffer: PhysicalSize<u32>) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }

    vk::Extent2D {
        width: framebuffer
            .width
            .clamp(caps.min_image_extent.width, caps.max_image_extent.width),
        height: framebuffer
            .height
            .clamp(caps.min_image_extent.height, caps.max_image_extent.height),
    }
}
