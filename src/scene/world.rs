use log::info;

use ash::vk;

use super::{quad_vertices, QUAD_INDICES};
use crate::config::Config;
use crate::error::{ReleaseOnErr, VkQuadResult};
use crate::vk_ctx::VkCtx;
use crate::vk_utils::*;

/// Everything that is uploaded once and does not care about the swapchain:
/// the mesh, its texture and the descriptor set layout describing how shaders see them.
pub struct World {
  pub vertex_buffer: VkBuffer,
  pub index_buffer: VkBuffer,
  pub index_count: u32,
  pub texture: VkTexture,
  pub sampler: VkOwned<vk::Sampler>,
  /// binding 0: `QuadUBO` (vertex), binding 1: diffuse texture (fragment)
  pub descriptor_set_layout: VkOwned<vk::DescriptorSetLayout>,
}

impl World {
  pub const BINDING_UBO: u32 = 0;
  pub const BINDING_TEXTURE: u32 = 1;

  pub fn descriptor_bindings() -> [vk::DescriptorSetLayoutBinding; 2] {
    [
      create_ubo_binding(Self::BINDING_UBO, vk::ShaderStageFlags::VERTEX),
      create_texture_binding(Self::BINDING_TEXTURE, vk::ShaderStageFlags::FRAGMENT),
    ]
  }

  pub fn new(vk_ctx: &VkCtx, config: &Config) -> VkQuadResult<World> {
    let device = vk_ctx.vk_device();
    let allocator = &vk_ctx.allocator;

    // plain handles first, these clean up after themselves
    let sampler = create_sampler(device, vk_ctx.device.max_sampler_anisotropy)?;
    let sampler = VkOwned::new(device, sampler);
    let layout = create_descriptor_set_layout(device, &Self::descriptor_bindings())?;
    let descriptor_set_layout = VkOwned::new(device, layout);

    let vertices = quad_vertices();
    let vertices_bytes: &[u8] = bytemuck::cast_slice(&vertices);
    info!("Vertex buffer bytes={}", vertices_bytes.len());
    let mut vertex_buffer = VkBuffer::from_data(
      allocator,
      vk_ctx,
      "quad-vertices".to_string(),
      vertices_bytes,
      vk::BufferUsageFlags::VERTEX_BUFFER,
    )?;

    let indices_bytes: &[u8] = bytemuck::cast_slice(&QUAD_INDICES);
    let mut index_buffer = VkBuffer::from_data(
      allocator,
      vk_ctx,
      "quad-indices".to_string(),
      indices_bytes,
      vk::BufferUsageFlags::INDEX_BUFFER,
    )
    .release_on_err(|| unsafe { vertex_buffer.delete(allocator) })?;

    let texture = VkTexture::from_file(
      device,
      allocator,
      vk_ctx,
      &config.texture_path,
      VkTexture::DIFFUSE_TEXTURE_FORMAT,
    )
    .release_on_err(|| unsafe {
      vertex_buffer.delete(allocator);
      index_buffer.delete(allocator);
    })?;

    Ok(World {
      vertex_buffer,
      index_buffer,
      index_count: QUAD_INDICES.len() as u32,
      texture,
      sampler,
      descriptor_set_layout,
    })
  }

  pub unsafe fn destroy(&mut self, device: &ash::Device, allocator: &vma::Allocator) {
    self.vertex_buffer.delete(allocator);
    self.index_buffer.delete(allocator);
    self.texture.delete(device, allocator);
  }
}
