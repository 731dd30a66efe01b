use log::info;

use ash::extensions::khr::Swapchain;
use ash::vk;

use super::VkCtx;
use crate::error::{VkQuadError, VkQuadResult};
use crate::vk_utils::surface_support::{
  choose_extent, choose_image_count, choose_present_mode, choose_surface_format,
};
use crate::vk_utils::{
  create_framebuffer, create_swapchain_images, create_swapchain_khr, OwnedSwapchain,
  SwapchainSettings, VkOwned,
};

/// Displayable images + their views (+ framebuffers once render pass is known).
/// Never modified after creation, on invalidation the whole thing is dropped
/// and created anew.
///
/// Field order is teardown order: framebuffers, views, swapchain.
pub struct VkCtxSwapchain {
  /// One per swapchain image, empty until `create_framebuffers`
  pub framebuffers: Vec<VkOwned<vk::Framebuffer>>,
  pub image_views: Vec<VkOwned<vk::ImageView>>,
  /// Owned by the swapchain, never destroyed by hand
  pub images: Vec<vk::Image>,
  pub swapchain: OwnedSwapchain,

  pub size: vk::Extent2D,
  pub surface_format: vk::SurfaceFormatKHR,
  pub present_mode: vk::PresentModeKHR,
}

impl VkCtxSwapchain {
  pub fn new(vk_ctx: &VkCtx, window_size: vk::Extent2D) -> VkQuadResult<Self> {
    let support = vk_ctx.swapchain_support()?;
    let surface_format =
      choose_surface_format(&support.formats).ok_or(VkQuadError::NoSuitableAdapter)?;
    let settings = SwapchainSettings {
      surface_format,
      present_mode: choose_present_mode(&support.present_modes, vk_ctx.enable_diagnostics),
      image_count: choose_image_count(&support.capabilities),
      extent: choose_extent(&support.capabilities, window_size),
      pre_transform: support.capabilities.current_transform,
    };

    let device = vk_ctx.vk_device();
    let swapchain_loader = Swapchain::new(&vk_ctx.instance, device);
    let swapchain_khr = create_swapchain_khr(
      &swapchain_loader,
      vk_ctx.surface_khr,
      &settings,
      vk_ctx.device.graphics_family,
      vk_ctx.device.present_family,
    )?;
    let swapchain = OwnedSwapchain::new(swapchain_loader, swapchain_khr);

    let (images, image_views) = create_swapchain_images(
      &swapchain.loader,
      swapchain.handle(),
      device,
      surface_format.format,
    )?;
    info!(
      "Swapchain: {} images {}x{}, {:?}, {:?}",
      images.len(),
      settings.extent.width,
      settings.extent.height,
      surface_format.format,
      settings.present_mode
    );

    Ok(Self {
      framebuffers: Vec::new(),
      image_views,
      images,
      swapchain,
      size: settings.extent,
      surface_format,
      present_mode: settings.present_mode,
    })
  }

  pub fn create_framebuffers(
    &mut self,
    device: &ash::Device,
    render_pass: vk::RenderPass,
  ) -> VkQuadResult<()> {
    let framebuffers = self
      .image_views
      .iter()
      .map(|iv| {
        create_framebuffer(device, render_pass, &[iv.handle()], &self.size)
          .map(|fbo| VkOwned::new(device, fbo))
      })
      .collect::<Result<Vec<_>, vk::Result>>()?;
    self.framebuffers = framebuffers;
    Ok(())
  }

  /// Actual count, may differ from what was requested
  pub fn image_count(&self) -> usize {
    self.images.len()
  }

  pub fn aspect_ratio(&self) -> f32 {
    self.size.width as f32 / self.size.height.max(1) as f32
  }

  pub fn loader(&self) -> &Swapchain {
    &self.swapchain.loader
  }

  pub fn handle(&self) -> vk::SwapchainKHR {
    self.swapchain.handle()
  }
}
