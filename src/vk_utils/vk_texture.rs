use jpeg_decoder::{Decoder, PixelFormat};
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use vma::Alloc;

use log::{info, trace};

use ash::vk;

use super::{
  cmd_transition_image_layout, create_image_view, determine_gpu_allocation_info, VkBuffer,
  VkMemoryPreference, VkMemoryResource, WithSetupCmdBuffer,
};
use crate::error::{ReleaseOnErr, VkQuadError, VkQuadResult};

pub struct VkTexture {
  // For debugging
  pub name: String,
  pub width: u32,
  pub height: u32,
  /// Native Vulkan image
  pub image: vk::Image,
  image_view: vk::ImageView,
  pub layout: vk::ImageLayout,
  pub allocation: vma::Allocation,
}

/// RGBA8 pixels, row by row
pub struct DecodedImage {
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<u8>,
}

impl VkTexture {
  /// Sampled color texture, sRGB encoded.
  pub const DIFFUSE_TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_SRGB;

  pub fn from_file(
    device: &ash::Device,
    allocator: &vma::Allocator,
    app_init: &impl WithSetupCmdBuffer,
    path: &Path,
    format: vk::Format,
  ) -> VkQuadResult<VkTexture> {
    info!("Loading texture from '{}'", path.to_string_lossy());
    let decoded = load_jpeg_rgba(path)?;
    let name = path.file_name().unwrap_or_else(|| OsStr::new(path));
    let name_str = name.to_string_lossy().to_string();
    VkTexture::from_pixels(device, allocator, app_init, name_str, &decoded, format)
  }

  /// Optimal tiling image, filled from staging buffer and left in SHADER_READ_ONLY_OPTIMAL.
  pub fn from_pixels(
    device: &ash::Device,
    allocator: &vma::Allocator,
    app_init: &impl WithSetupCmdBuffer,
    name: String,
    decoded: &DecodedImage,
    format: vk::Format,
  ) -> VkQuadResult<VkTexture> {
    let (width, height) = (decoded.width, decoded.height);
    let create_info = vk::ImageCreateInfo::builder()
      .image_type(vk::ImageType::TYPE_2D)
      .extent(vk::Extent3D {
        width,
        height,
        depth: 1,
      })
      .format(format)
      .tiling(vk::ImageTiling::OPTIMAL)
      .usage(vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED)
      .initial_layout(vk::ImageLayout::UNDEFINED)
      // verbose properties, but vulkan requires
      .sharing_mode(vk::SharingMode::EXCLUSIVE)
      .samples(vk::SampleCountFlags::TYPE_1)
      .mip_levels(1)
      .array_layers(1)
      .build();
    let alloc_info = determine_gpu_allocation_info(&VkMemoryPreference::GpuOnly);
    let (image, mut allocation) = unsafe { allocator.create_image(&create_info, &alloc_info)? };
    let image_view = create_image_view(device, image, format, vk::ImageAspectFlags::COLOR)
      .release_on_err(|| unsafe { allocator.destroy_image(image, &mut allocation) })?;

    let mut texture = VkTexture {
      name: create_texture_name(name, width, height),
      width,
      height,
      image,
      image_view,
      layout: vk::ImageLayout::UNDEFINED,
      allocation,
    };
    trace!("Created {}", texture.name);

    // upload
    let mut staging = VkBuffer::empty(
      allocator,
      format!("{}-staging", texture.name),
      decoded.pixels.len(),
      vk::BufferUsageFlags::TRANSFER_SRC,
      VkMemoryPreference::ScratchTransfer,
    )
    .release_on_err(|| unsafe { texture.delete(device, allocator) })?;
    staging.write_to_mapped(&decoded.pixels);

    let upload_result = app_init.with_setup_cb(|device, cmd_buf| unsafe {
      cmd_transition_image_layout(
        device,
        cmd_buf,
        image,
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
      );

      let region = vk::BufferImageCopy::builder()
        .buffer_offset(0)
        .buffer_row_length(0) // tightly packed
        .buffer_image_height(0)
        .image_subresource(vk::ImageSubresourceLayers {
          aspect_mask: vk::ImageAspectFlags::COLOR,
          mip_level: 0,
          base_array_layer: 0,
          layer_count: 1,
        })
        .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
        .image_extent(vk::Extent3D {
          width,
          height,
          depth: 1,
        })
        .build();
      device.cmd_copy_buffer_to_image(
        cmd_buf,
        staging.buffer,
        image,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        &[region],
      );

      cmd_transition_image_layout(
        device,
        cmd_buf,
        image,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
      );
    });
    unsafe { staging.delete(allocator) };
    upload_result.release_on_err(|| unsafe { texture.delete(device, allocator) })?;

    texture.layout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;
    Ok(texture)
  }

  pub fn image_view(&self) -> vk::ImageView {
    self.image_view
  }

  pub unsafe fn delete(&mut self, device: &ash::Device, allocator: &vma::Allocator) {
    device.destroy_image_view(self.image_view, None);
    allocator.destroy_image(self.image, &mut self.allocation)
  }
}

pub fn load_jpeg_rgba(path: &Path) -> VkQuadResult<DecodedImage> {
  let file = File::open(path).map_err(|err| VkQuadError::io(path, err))?;
  let mut decoder = Decoder::new(BufReader::new(file));
  let pixel_bytes = decoder
    .decode()
    .map_err(|source| VkQuadError::TextureDecode {
      path: path.to_path_buf(),
      source,
    })?;
  // `info()` is always available after successful decode
  let metadata = decoder.info().ok_or_else(|| VkQuadError::TextureDecode {
    path: path.to_path_buf(),
    source: jpeg_decoder::Error::Format("missing image metadata".to_string()),
  })?;
  trace!("File meta: {:?}", metadata);

  let pixels = convert_to_rgba(metadata.pixel_format, &pixel_bytes).ok_or_else(|| {
    VkQuadError::UnsupportedPixelFormat {
      path: path.to_path_buf(),
      format: metadata.pixel_format,
    }
  })?;

  Ok(DecodedImage {
    width: metadata.width as u32,
    height: metadata.height as u32,
    pixels,
  })
}

/// Used cause vk::Format::R8G8B8_SRGB is not widely supported.
/// `None` for formats other than RGB24 and L8.
pub fn convert_to_rgba(pixel_format: PixelFormat, data: &[u8]) -> Option<Vec<u8>> {
  match pixel_format {
    PixelFormat::RGB24 => Some(
      data
        .chunks_exact(3)
        .flat_map(|px| [px[0], px[1], px[2], 255u8])
        .collect(),
    ),
    PixelFormat::L8 => Some(data.iter().flat_map(|&l| [l, l, l, 255u8]).collect()),
    _ => None,
  }
}

fn create_texture_name(name: String, width: u32, height: u32) -> String {
  format!("VkTexture({}, {}x{})", name, width, height)
}
