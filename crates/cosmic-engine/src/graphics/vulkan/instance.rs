use std::ffi::{c_char, c_void, CStr, CString};

use anyhow::{bail, Context, Result};
use ash::ext::debug_utils;
use ash::{vk, Entry, Instance};
use raw_window_handle::RawDisplayHandle;

use super::result::release_on_err;
use crate::graphics::GraphicsConfig;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";
const ENGINE_NAME: &CStr = c"cosmic";

/// Debug-utils messenger routing validation output into the core log channel.
pub(crate) struct DebugMessenger {
    loader: debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    /// # Safety
    /// Must run before the owning instance is destroyed, and only once.
    pub(crate) unsafe fn destroy(&self) {
        unsafe { self.loader.destroy_debug_utils_messenger(self.messenger, None) };
    }
}

/// Creates the instance (and the debug messenger when validation is on and
/// available).
///
/// Validation and debug utils are optional: when the loader lacks them a
/// warning is logged and the instance is created without. Surface extensions
/// required by the window are mandatory.
pub(crate) fn create_instance(
    entry: &Entry,
    display: RawDisplayHandle,
    config: &GraphicsConfig,
) -> Result<(Instance, Option<DebugMessenger>)> {
    let app_name = CString::new(config.application_name.as_str())
        .context("application name contains a NUL byte")?;

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, 0, 1, 0))
        .engine_name(ENGINE_NAME)
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(vk::API_VERSION_1_1);

    // SAFETY: enumeration has no preconditions; names are NUL-terminated by the loader.
    let layers = unsafe { entry.enumerate_instance_layer_properties() }
        .context("vkEnumerateInstanceLayerProperties failed")?;
    let extensions = unsafe { entry.enumerate_instance_extension_properties(None) }
        .context("vkEnumerateInstanceExtensionProperties failed")?;

    let has_layer = |name: &CStr| {
        layers
            .iter()
            .any(|l| unsafe { CStr::from_ptr(l.layer_name.as_ptr()) } == name)
    };
    let has_extension = |name: &CStr| {
        extensions
            .iter()
            .any(|e| unsafe { CStr::from_ptr(e.extension_name.as_ptr()) } == name)
    };

    let mut enabled_extensions: Vec<*const c_char> = Vec::new();
    for &required in ash_window::enumerate_required_extensions(display)
        .context("window system has no Vulkan surface support")?
    {
        // SAFETY: ash-window returns static NUL-terminated names.
        let name = unsafe { CStr::from_ptr(required) };
        if !has_extension(name) {
            bail!("required instance extension {} is missing", name.to_string_lossy());
        }
        enabled_extensions.push(required);
    }

    let mut enabled_layers: Vec<*const c_char> = Vec::new();
    let mut debug_enabled = false;
    if config.validation {
        if has_layer(VALIDATION_LAYER) {
            enabled_layers.push(VALIDATION_LAYER.as_ptr());
        } else {
            core_warn!("validation layer {VALIDATION_LAYER:?} not available; continuing without");
        }

        if has_extension(debug_utils::NAME) {
            enabled_extensions.push(debug_utils::NAME.as_ptr());
            debug_enabled = true;
        } else {
            core_warn!("{:?} not available; validation output is not logged", debug_utils::NAME);
        }
    }

    let mut debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    let mut create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_layer_names(&enabled_layers)
        .enabled_extension_names(&enabled_extensions);

    // Chained so instance creation and destruction are covered as well.
    if debug_enabled {
        create_info = create_info.push_next(&mut debug_info);
    }

    // SAFETY: every pointer in `create_info` outlives this call.
    let instance = unsafe { entry.create_instance(&create_info, None) }
        .context("vkCreateInstance failed")?;

    let debug = if debug_enabled {
        let loader = debug_utils::Instance::new(entry, &instance);
        // SAFETY: the instance was created with the debug utils extension enabled.
        let created = unsafe { loader.create_debug_utils_messenger(&debug_info, None) };
        // SAFETY: nothing else was created from the instance yet.
        let messenger = release_on_err(created, || unsafe { instance.destroy_instance(None) })
            .context("vkCreateDebugUtilsMessengerEXT failed")?;
        Some(DebugMessenger { loader, messenger })
    } else {
        None
    };

    core_info!(
        "Vulkan instance created ({} layers, {} extensions)",
        enabled_layers.len(),
        enabled_extensions.len()
    );
    Ok((instance, debug))
}

unsafe extern "system" fn debug_callback(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    kind: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user: *mut c_void,
) -> vk::Bool32 {
    // SAFETY: the loader passes either null or a valid callback payload.
    let message = unsafe {
        match data.as_ref() {
            Some(data) if !data.p_message.is_null() => {
                CStr::from_ptr(data.p_message).to_string_lossy()
            }
            _ => return vk::FALSE,
        }
    };

    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        core_error!("[vulkan {kind:?}] {message}");
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        core_warn!("[vulkan {kind:?}] {message}");
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        core_info!("[vulkan {kind:?}] {message}");
    } else {
        core_debug!("[vulkan {kind:?}] {message}");
    }

    vk::FALSE
}
