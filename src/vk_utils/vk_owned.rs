use ash::extensions::khr::Swapchain;
use ash::vk;

/// Raw Vulkan handle that knows how to destroy itself.
pub trait VkDestroy: Copy {
  unsafe fn destroy_with(self, device: &ash::Device);
}

macro_rules! impl_vk_destroy {
  ($handle:ty, $destroy_fn:ident) => {
    impl VkDestroy for $handle {
      unsafe fn destroy_with(self, device: &ash::Device) {
        device.$destroy_fn(self, None);
      }
    }
  };
}

impl_vk_destroy!(vk::ImageView, destroy_image_view);
impl_vk_destroy!(vk::Framebuffer, destroy_framebuffer);
impl_vk_destroy!(vk::RenderPass, destroy_render_pass);
impl_vk_destroy!(vk::Pipeline, destroy_pipeline);
impl_vk_destroy!(vk::PipelineLayout, destroy_pipeline_layout);
impl_vk_destroy!(vk::Semaphore, destroy_semaphore);
impl_vk_destroy!(vk::Fence, destroy_fence);
impl_vk_destroy!(vk::Sampler, destroy_sampler);
impl_vk_destroy!(vk::DescriptorPool, destroy_descriptor_pool);
impl_vk_destroy!(vk::DescriptorSetLayout, destroy_descriptor_set_layout);
impl_vk_destroy!(vk::ShaderModule, destroy_shader_module);

/// Destroys the handle when dropped. Structs that own several of these
/// are torn down in field declaration order.
///
/// `ash::Device` is only a function table, the logical device itself has
/// to outlive every `VkOwned`.
pub struct VkOwned<T: VkDestroy> {
  device: ash::Device,
  handle: T,
}

impl<T: VkDestroy> VkOwned<T> {
  pub fn new(device: &ash::Device, handle: T) -> Self {
    Self {
      device: device.clone(),
      handle,
    }
  }

  pub fn handle(&self) -> T {
    self.handle
  }
}

impl<T: VkDestroy> Drop for VkOwned<T> {
  fn drop(&mut self) {
    unsafe { self.handle.destroy_with(&self.device) }
  }
}

/// Swapchain is destroyed through its extension loader, not the device.
/// Swapchain images are owned by the swapchain and go away with it.
pub struct OwnedSwapchain {
  pub loader: Swapchain,
  handle: vk::SwapchainKHR,
}

impl OwnedSwapchain {
  pub fn new(loader: Swapchain, handle: vk::SwapchainKHR) -> Self {
    Self { loader, handle }
  }

  pub fn handle(&self) -> vk::SwapchainKHR {
    self.handle
  }
}

impl Drop for OwnedSwapchain {
  fn drop(&mut self) {
    unsafe { self.loader.destroy_swapchain(self.handle, None) }
  }
}
