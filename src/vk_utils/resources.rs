use ash::prelude::VkResult;
use ash::vk;

// https://github.com/zeux/niagara/blob/master/src/resources.cpp

pub fn create_image_view(
  device: &ash::Device,
  image: vk::Image,
  image_format: vk::Format,
  aspect_mask_flags: vk::ImageAspectFlags,
) -> VkResult<vk::ImageView> {
  let subresource_range = vk::ImageSubresourceRange::builder()
    .aspect_mask(aspect_mask_flags)
    .base_array_layer(0)
    .layer_count(1)
    .base_mip_level(0)
    .level_count(1)
    .build();

  let create_info = vk::ImageViewCreateInfo::builder()
    .image(image)
    .view_type(vk::ImageViewType::TYPE_2D)
    .format(image_format)
    .subresource_range(subresource_range)
    .build();

  unsafe { device.create_image_view(&create_info, None) }
}

pub fn create_framebuffer(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  image_views: &[vk::ImageView],
  size: &vk::Extent2D,
) -> VkResult<vk::Framebuffer> {
  let create_info = vk::FramebufferCreateInfo::builder()
    .render_pass(render_pass)
    .attachments(image_views)
    .width(size.width)
    .height(size.height)
    .layers(1)
    .build();
  unsafe { device.create_framebuffer(&create_info, None) }
}

/// Linear filtering, repeat on all axes, anisotropy at device limit.
pub fn create_sampler(device: &ash::Device, max_anisotropy: f32) -> VkResult<vk::Sampler> {
  let create_info = vk::SamplerCreateInfo::builder()
    .mag_filter(vk::Filter::LINEAR)
    .min_filter(vk::Filter::LINEAR)
    .address_mode_u(vk::SamplerAddressMode::REPEAT)
    .address_mode_v(vk::SamplerAddressMode::REPEAT)
    .address_mode_w(vk::SamplerAddressMode::REPEAT)
    .anisotropy_enable(true)
    .max_anisotropy(max_anisotropy)
    .compare_enable(false)
    .compare_op(vk::CompareOp::ALWAYS)
    .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
    .unnormalized_coordinates(false) // address with [0, 1) instead of [0, tex_width)
    // mipmaps:
    .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
    .mip_lod_bias(0f32)
    .min_lod(0f32)
    .max_lod(0f32)
    .build();

  unsafe { device.create_sampler(&create_info, None) }
}

/// Viewport covering whole `size`. Y is NOT flipped here,
/// projection matrix takes care of that.
pub fn create_viewport(size: &vk::Extent2D) -> vk::Viewport {
  vk::Viewport {
    x: 0f32,
    y: 0f32,
    width: size.width as f32,
    height: size.height as f32,
    min_depth: 0f32,
    max_depth: 1.0f32,
  }
}

pub fn size_to_rect_vk(size: &vk::Extent2D) -> vk::Rect2D {
  vk::Rect2D {
    offset: vk::Offset2D { x: 0, y: 0 },
    extent: *size,
  }
}
