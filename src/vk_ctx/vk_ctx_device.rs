use ash::vk;

/// Logical device and the queues we got from it.
/// Destroyed by `VkCtx`, after everything created from it.
pub struct VkCtxDevice {
  pub phys_device: vk::PhysicalDevice,
  pub graphics_family: u32,
  pub present_family: u32,
  pub device: ash::Device,
  pub graphics_queue: vk::Queue,
  /// Might be the same object as `graphics_queue`
  pub present_queue: vk::Queue,
  pub max_sampler_anisotropy: f32,
}
