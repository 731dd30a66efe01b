use log::trace;

use ash::extensions::khr::Swapchain;
use ash::prelude::VkResult;
use ash::vk;

use super::surface_support::choose_sharing_mode;
use super::{create_image_view, VkOwned};

/// Everything negotiated from `SwapchainSupportDetails` that goes into swapchain creation.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainSettings {
  pub surface_format: vk::SurfaceFormatKHR,
  pub present_mode: vk::PresentModeKHR,
  pub image_count: u32,
  pub extent: vk::Extent2D,
  pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

pub fn create_swapchain_khr(
  swapchain_loader: &Swapchain,
  surface_khr: vk::SurfaceKHR,
  settings: &SwapchainSettings,
  graphics_family: u32,
  present_family: u32,
) -> VkResult<vk::SwapchainKHR> {
  let (sharing_mode, queue_family_indices) = choose_sharing_mode(graphics_family, present_family);

  let create_info = vk::SwapchainCreateInfoKHR::builder()
    .surface(surface_khr)
    .min_image_count(settings.image_count)
    .image_format(settings.surface_format.format)
    .image_color_space(settings.surface_format.color_space)
    .image_extent(settings.extent)
    .image_array_layers(1)
    .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
    .image_sharing_mode(sharing_mode)
    .queue_family_indices(&queue_family_indices)
    .present_mode(settings.present_mode)
    .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
    .pre_transform(settings.pre_transform)
    .clipped(true)
    .build();

  let swapchain = unsafe { swapchain_loader.create_swapchain(&create_info, None)? };
  trace!("Swapchain created");
  Ok(swapchain)
}

/// Images are owned by the swapchain, only views are ours.
/// Image count is whatever the driver actually created, not what we asked for.
pub fn create_swapchain_images(
  swapchain_loader: &Swapchain,
  swapchain: vk::SwapchainKHR,
  device: &ash::Device,
  image_format: vk::Format,
) -> VkResult<(Vec<vk::Image>, Vec<VkOwned<vk::ImageView>>)> {
  let swapchain_images = unsafe { swapchain_loader.get_swapchain_images(swapchain)? };
  trace!("Will create {} swapchain image views", swapchain_images.len());

  let swapchain_image_views = swapchain_images
    .iter()
    .map(|&image| {
      create_image_view(device, image, image_format, vk::ImageAspectFlags::COLOR)
        .map(|view| VkOwned::new(device, view))
    })
    .collect::<VkResult<Vec<_>>>()?;

  Ok((swapchain_images, swapchain_image_views))
}
