use ash::prelude::VkResult;
use ash::vk;

use crate::graphics::FrameError;

/// Checks a Vulkan call. Failures are logged with the operation name and
/// classified into a `FrameError`.
pub(crate) fn check<T>(operation: &'static str, result: VkResult<T>) -> Result<T, FrameError> {
    result.map_err(|code| {
        core_error!("{operation} failed: {code:?}");
        FrameError::from_vk(operation, code)
    })
}

/// Logs a successful call that returned a positive status other than SUCCESS.
pub(crate) fn warn_partial(operation: &'static str, code: vk::Result) {
    if code != vk::Result::SUCCESS {
        core_warn!("{operation} partially successful: {code:?}");
    }
}

/// Runs `release` when `result` is an error, for objects created earlier in
/// a fallible sequence that would otherwise leak on the early return.
pub(crate) fn release_on_err<T, E>(result: Result<T, E>, release: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        release();
    }
    result
}
