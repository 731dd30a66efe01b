use log::trace;

use ash::vk;

use super::{QuadUBO, World};
use crate::error::{ReleaseOnErr, VkQuadResult};
use crate::vk_ctx::VkCtx;
use crate::vk_utils::*;

/// One uniform buffer and one descriptor set per swapchain image.
/// Swapchain image count can change on rebuild, so this is rebuilt with it.
pub struct PerImageUniforms {
  pub descriptor_sets: Vec<vk::DescriptorSet>,
  /// Sets are freed together with the pool
  pub descriptor_pool: VkOwned<vk::DescriptorPool>,
  /// Persistently mapped
  pub buffers: Vec<VkBuffer>,
}

impl PerImageUniforms {
  pub fn new(vk_ctx: &VkCtx, world: &World, image_count: usize) -> VkQuadResult<Self> {
    let device = vk_ctx.vk_device();
    let ubo_size = std::mem::size_of::<QuadUBO>();

    let pool_sizes = get_pool_sizes(&World::descriptor_bindings(), image_count as u32);
    let descriptor_pool = create_descriptor_pool(device, &pool_sizes, image_count as u32)?;
    let descriptor_pool = VkOwned::new(device, descriptor_pool);
    let descriptor_sets = allocate_descriptor_sets(
      device,
      descriptor_pool.handle(),
      world.descriptor_set_layout.handle(),
      image_count,
    )?;

    let mut buffers: Vec<VkBuffer> = Vec::with_capacity(image_count);
    for idx in 0..image_count {
      let buffer = VkBuffer::empty(
        &vk_ctx.allocator,
        format!("quad-ubo-{}", idx),
        ubo_size,
        vk::BufferUsageFlags::UNIFORM_BUFFER,
        VkMemoryPreference::GpuMappable,
      )
      .release_on_err(|| unsafe { delete_all(&mut buffers, &vk_ctx.allocator) })?;
      buffers.push(buffer);
    }

    for (set, buffer) in descriptor_sets.iter().zip(buffers.iter()) {
      let buffer_info = [create_ubo_buffer_info(buffer.buffer, ubo_size)];
      let image_info = [create_texture_image_info(
        world.texture.image_view(),
        world.sampler.handle(),
      )];
      let writes = [
        write_ubo(*set, World::BINDING_UBO, &buffer_info),
        write_texture(*set, World::BINDING_TEXTURE, &image_info),
      ];
      unsafe { device.update_descriptor_sets(&writes, &[]) };
    }
    trace!("Created {} descriptor sets", descriptor_sets.len());

    Ok(Self {
      descriptor_sets,
      descriptor_pool,
      buffers,
    })
  }

  pub fn write(&self, image_idx: usize, ubo: &QuadUBO) {
    self.buffers[image_idx].write_to_mapped(ubo.as_bytes());
  }

  pub unsafe fn destroy(&mut self, allocator: &vma::Allocator) {
    delete_all(&mut self.buffers, allocator);
  }
}

unsafe fn delete_all(buffers: &mut Vec<VkBuffer>, allocator: &vma::Allocator) {
  for buffer in buffers.iter_mut() {
    buffer.delete(allocator);
  }
  buffers.clear();
}
