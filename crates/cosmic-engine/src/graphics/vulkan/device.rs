use std::ffi::{c_char, CStr};

use anyhow::{anyhow, Context, Result};
use ash::khr::{surface, swapchain};
use ash::{vk, Device, Instance};

const DEVICE_EXTENSIONS: [&CStr; 1] = [swapchain::NAME];

/// Queue family indices used by the context. Graphics and present may share
/// one family or live in two.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    /// Picks a graphics family and a present family.
    ///
    /// A family that does both is preferred; otherwise the first graphics
    /// family is paired with the first present-capable family.
    pub fn select(
        properties: &[vk::QueueFamilyProperties],
        mut supports_present: impl FnMut(u32) -> bool,
    ) -> Option<Self> {
        let mut graphics = None;
        let mut present = None;

        for (index, family) in (0u32..).zip(properties) {
            let has_graphics = family.queue_count > 0
                && family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let has_present = family.queue_count > 0 && supports_present(index);

            if has_graphics && has_present {
                return Some(Self {
                    graphics: index,
                    present: index,
                });
            }
            if has_graphics && graphics.is_none() {
                graphics = Some(index);
            }
            if has_present && present.is_none() {
                present = Some(index);
            }
        }

        Some(Self {
            graphics: graphics?,
            present: present?,
        })
    }

    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Distinct family indices, graphics first.
    pub fn unique(&self) -> Vec<u32> {
        if self.is_shared() {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }
}

/// Selected physical device with the data cached at selection time.
pub(crate) struct PhysicalDevice {
    pub handle: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub features: vk::PhysicalDeviceFeatures,
    pub families: QueueFamilies,
}

impl PhysicalDevice {
    pub fn name(&self) -> String {
        // SAFETY: the driver NUL-terminates `device_name`.
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Selects the first device that can render to and present on `surface`.
pub(crate) fn pick_physical_device(
    instance: &Instance,
    surface_loader: &surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<PhysicalDevice> {
    // SAFETY: valid instance.
    let candidates = unsafe { instance.enumerate_physical_devices() }
        .context("vkEnumeratePhysicalDevices failed")?;
    if candidates.is_empty() {
        return Err(anyhow!("no GPU with Vulkan support found"));
    }

    for handle in candidates {
        // SAFETY: `handle` was just enumerated from `instance`.
        let properties = unsafe { instance.get_physical_device_properties(handle) };
        let name = unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy();

        match check_suitability(instance, surface_loader, surface, handle) {
            Ok(families) => {
                let device = PhysicalDevice {
                    handle,
                    properties,
                    // SAFETY: as above.
                    memory_properties: unsafe {
                        instance.get_physical_device_memory_properties(handle)
                    },
                    features: unsafe { instance.get_physical_device_features(handle) },
                    families,
                };
                log_device(&device);
                return Ok(device);
            }
            Err(reason) => core_debug!("skipping physical device `{name}`: {reason}"),
        }
    }

    Err(anyhow!("no suitable physical device found"))
}

fn check_suitability(
    instance: &Instance,
    surface_loader: &surface::Instance,
    surface: vk::SurfaceKHR,
    handle: vk::PhysicalDevice,
) -> Result<QueueFamilies> {
    // SAFETY: `handle` belongs to `instance`; `surface` to the same instance.
    let queue_properties = unsafe { instance.get_physical_device_queue_family_properties(handle) };
    let families = QueueFamilies::select(&queue_properties, |index| unsafe {
        surface_loader
            .get_physical_device_surface_support(handle, index, surface)
            .unwrap_or(false)
    })
    .ok_or_else(|| anyhow!("missing graphics or present queue family"))?;

    let available = unsafe { instance.enumerate_device_extension_properties(handle) }
        .context("vkEnumerateDeviceExtensionProperties failed")?;
    for required in DEVICE_EXTENSIONS {
        let found = available
            .iter()
            .any(|e| unsafe { CStr::from_ptr(e.extension_name.as_ptr()) } == required);
        if !found {
            return Err(anyhow!("missing device extension {}", required.to_string_lossy()));
        }
    }

    let formats = unsafe { surface_loader.get_physical_device_surface_formats(handle, surface) }
        .context("vkGetPhysicalDeviceSurfaceFormatsKHR failed")?;
    let modes = unsafe { surface_loader.get_physical_device_surface_present_modes(handle, surface) }
        .context("vkGetPhysicalDeviceSurfacePresentModesKHR failed")?;
    if formats.is_empty() || modes.is_empty() {
        return Err(anyhow!("surface reports no formats or present modes"));
    }

    Ok(families)
}

fn log_device(device: &PhysicalDevice) {
    let p = &device.properties;
    core_info!("selected physical device `{}` ({:?})", device.name(), p.device_type);
    core_debug!(
        "  api {}.{}.{}, driver {:#x}, vendor {:#06x}, device {:#06x}",
        vk::api_version_major(p.api_version),
        vk::api_version_minor(p.api_version),
        vk::api_version_patch(p.api_version),
        p.driver_version,
        p.vendor_id,
        p.device_id
    );
    core_debug!(
        "  queue families: graphics {}, present {}",
        device.families.graphics,
        device.families.present
    );
    core_debug!(
        "  {} memory heaps, {} memory types, geometry shader: {}",
        device.memory_properties.memory_heap_count,
        device.memory_properties.memory_type_count,
        device.features.geometry_shader == vk::TRUE
    );
}

/// Creates the logical device with one queue per distinct family and fetches
/// the graphics and present queues.
pub(crate) fn create_logical_device(
    instance: &Instance,
    physical: &PhysicalDevice,
) -> Result<(Device, vk::Queue, vk::Queue)> {
    let priorities = [1.0f32];
    let queue_infos: Vec<vk::DeviceQueueCreateInfo> = physical
        .families
        .unique()
        .into_iter()
        .map(|family| {
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(family)
                .queue_priorities(&priorities)
        })
        .collect();

    let extensions: Vec<*const c_char> = DEVICE_EXTENSIONS.iter().map(|e| e.as_ptr()).collect();
    let features = vk::PhysicalDeviceFeatures::default();

    let create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_infos)
        .enabled_extension_names(&extensions)
        .enabled_features(&features);

    // SAFETY: `physical` was selected from `instance`; pointers outlive the call.
    let device = unsafe { instance.create_device(physical.handle, &create_info, None) }
        .context("vkCreateDevice failed")?;

    // SAFETY: both families were requested with one queue each.
    let graphics = unsafe { device.get_device_queue(physical.families.graphics, 0) };
    let present = unsafe { device.get_device_queue(physical.families.present, 0) };

    Ok((device, graphics, present))
}
