use log::{debug, error, info, warn};
use std::ffi::CStr;

use ash::extensions::ext::DebugUtils;
use ash::prelude::VkResult;
use ash::vk;

// called on validation layer message
unsafe extern "system" fn vulkan_debug_callback(
  message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
  message_type: vk::DebugUtilsMessageTypeFlagsEXT,
  p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
  _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
  if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
    return vk::FALSE;
  }
  let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();
  let message_str = format!("[VK_dbg_callback, {:?}]: {}", message_type, message);

  match message_severity {
    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => error!("{}", message_str),
    vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => warn!("{}", message_str),
    vk::DebugUtilsMessageSeverityFlagsEXT::INFO => info!("{}", message_str),
    _ => debug!("{}", message_str),
  }

  vk::FALSE
}

/// Same info is chained into `vk::InstanceCreateInfo`, so that
/// instance creation and destruction are also reported.
pub fn debug_messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
  vk::DebugUtilsMessengerCreateInfoEXT::builder()
    .message_severity(
      vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
        | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
      // | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE // will cause spam about extensions
    )
    .message_type(
      vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
        | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
        | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
    )
    .pfn_user_callback(Some(vulkan_debug_callback))
    .build()
}

/// Validation messages routed into `log`. Has to be destroyed before the instance.
pub struct DebugMessenger {
  pub loader: DebugUtils,
  pub messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
  pub fn new(entry: &ash::Entry, instance: &ash::Instance) -> VkResult<Self> {
    let debug_info = debug_messenger_create_info();
    let loader = DebugUtils::new(entry, instance);
    let messenger = unsafe { loader.create_debug_utils_messenger(&debug_info, None)? };
    Ok(Self { loader, messenger })
  }

  pub unsafe fn destroy(&self) {
    self
      .loader
      .destroy_debug_utils_messenger(self.messenger, None);
  }
}
