use log::trace;

use ash::prelude::VkResult;
use ash::vk;

use crate::config::Config;
use crate::error::{ReleaseOnErr, VkQuadResult};
use crate::scene::{Camera, PerImageUniforms, World};
use crate::vk_ctx::{VkCtx, VkCtxPipelines, VkCtxSwapchain};
use crate::vk_utils::{size_to_rect_vk, VkCommandBuffers};

/// Everything that depends on the swapchain. Created as a unit and dropped as a unit
/// when the surface changes.
///
/// Field order is teardown order: command buffers, descriptors, pipelines, swapchain.
/// Uniform buffers are vma allocations and have to be released first
/// with `destroy_uniforms`.
pub struct PresentationResources {
  /// One per swapchain image, recorded once
  pub command_buffers: VkCommandBuffers,
  pub per_image: PerImageUniforms,
  pub pipelines: VkCtxPipelines,
  pub swapchain: VkCtxSwapchain,
  pub camera: Camera,
}

impl PresentationResources {
  pub fn new(
    vk_ctx: &VkCtx,
    world: &World,
    config: &Config,
    window_size: vk::Extent2D,
  ) -> VkQuadResult<Self> {
    let device = vk_ctx.vk_device();

    let mut swapchain = VkCtxSwapchain::new(vk_ctx, window_size)?;
    let pipelines = VkCtxPipelines::new(
      vk_ctx,
      config,
      &swapchain,
      world.descriptor_set_layout.handle(),
    )?;
    swapchain.create_framebuffers(device, pipelines.render_pass.handle())?;

    let image_count = swapchain.image_count();
    let mut per_image = PerImageUniforms::new(vk_ctx, world, image_count)?;
    let command_buffers = record_all_images(
      vk_ctx,
      world,
      config,
      &pipelines,
      &swapchain,
      &per_image.descriptor_sets,
    )
    .release_on_err(|| unsafe { per_image.destroy(&vk_ctx.allocator) })?;

    let camera = Camera::new(&config.camera, swapchain.aspect_ratio());

    Ok(Self {
      command_buffers,
      per_image,
      pipelines,
      swapchain,
      camera,
    })
  }

  pub fn image_count(&self) -> usize {
    self.swapchain.image_count()
  }

  pub unsafe fn destroy_uniforms(&mut self, allocator: &vma::Allocator) {
    self.per_image.destroy(allocator);
  }
}

fn record_all_images(
  vk_ctx: &VkCtx,
  world: &World,
  config: &Config,
  pipelines: &VkCtxPipelines,
  swapchain: &VkCtxSwapchain,
  descriptor_sets: &[vk::DescriptorSet],
) -> VkResult<VkCommandBuffers> {
  let device = vk_ctx.vk_device();
  let image_count = swapchain.image_count();
  let command_buffers = VkCommandBuffers::allocate(device, vk_ctx.command_pool, image_count)?;

  for image_idx in 0..image_count {
    record_quad_commands(
      device,
      command_buffers.get(image_idx),
      config.clear_color(),
      world,
      pipelines,
      swapchain.framebuffers[image_idx].handle(),
      descriptor_sets[image_idx],
      swapchain.size,
    )?;
  }
  trace!("Recorded {} draw command buffers", image_count);
  Ok(command_buffers)
}

/// Clear, then draw the indexed quad with the image's descriptor set.
/// Contents never change, so the buffer is submitted as-is every time its image comes up.
#[allow(clippy::too_many_arguments)]
fn record_quad_commands(
  device: &ash::Device,
  cmd_buf: vk::CommandBuffer,
  clear_color: vk::ClearValue,
  world: &World,
  pipelines: &VkCtxPipelines,
  framebuffer: vk::Framebuffer,
  descriptor_set: vk::DescriptorSet,
  size: vk::Extent2D,
) -> VkResult<()> {
  let begin_info = vk::CommandBufferBeginInfo::builder()
    .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE)
    .build();
  let clear_values = [clear_color];
  let render_pass_begin_info = vk::RenderPassBeginInfo::builder()
    .render_pass(pipelines.render_pass.handle())
    .framebuffer(framebuffer)
    .render_area(size_to_rect_vk(&size))
    .clear_values(&clear_values)
    .build();

  unsafe {
    device.begin_command_buffer(cmd_buf, &begin_info)?;
    device.cmd_begin_render_pass(
      cmd_buf,
      &render_pass_begin_info,
      vk::SubpassContents::INLINE,
    );

    device.cmd_bind_pipeline(
      cmd_buf,
      vk::PipelineBindPoint::GRAPHICS,
      pipelines.pipeline.handle(),
    );
    device.cmd_bind_vertex_buffers(cmd_buf, 0, &[world.vertex_buffer.buffer], &[0]);
    device.cmd_bind_index_buffer(
      cmd_buf,
      world.index_buffer.buffer,
      0,
      vk::IndexType::UINT16,
    );
    device.cmd_bind_descriptor_sets(
      cmd_buf,
      vk::PipelineBindPoint::GRAPHICS,
      pipelines.pipeline_layout.handle(),
      0,
      &[descriptor_set],
      &[],
    );
    device.cmd_draw_indexed(cmd_buf, world.index_count, 1, 0, 0, 0);

    device.cmd_end_render_pass(cmd_buf);
    device.end_command_buffer(cmd_buf)
  }
}
