use log::trace;

use ash::vk;

use super::{VkCtx, VkCtxSwapchain};
use crate::config::Config;
use crate::error::VkQuadResult;
use crate::scene::QuadVertex;
use crate::vk_utils::*;

/// Render pass + graphics pipeline for the quad. Viewport is baked in,
/// so this is rebuilt together with the swapchain.
///
/// Field order is teardown order: pipeline, layout, render pass.
pub struct VkCtxPipelines {
  pub pipeline: VkOwned<vk::Pipeline>,
  pub pipeline_layout: VkOwned<vk::PipelineLayout>,
  pub render_pass: VkOwned<vk::RenderPass>,
}

impl VkCtxPipelines {
  pub fn new(
    vk_ctx: &VkCtx,
    config: &Config,
    swapchain: &VkCtxSwapchain,
    descriptor_set_layout: vk::DescriptorSetLayout,
  ) -> VkQuadResult<Self> {
    let device = vk_ctx.vk_device();

    let render_pass = create_present_render_pass(device, swapchain.surface_format.format)?;
    let render_pass = VkOwned::new(device, render_pass);

    let pipeline_layout = create_pipeline_layout(device, &[descriptor_set_layout])?;
    let pipeline_layout = VkOwned::new(device, pipeline_layout);

    let pipeline = create_quad_pipeline(
      device,
      config,
      render_pass.handle(),
      pipeline_layout.handle(),
      &swapchain.size,
    )?;
    trace!("Quad pipeline created");

    Ok(Self {
      pipeline: VkOwned::new(device, pipeline),
      pipeline_layout,
      render_pass,
    })
  }
}

fn create_quad_pipeline(
  device: &ash::Device,
  config: &Config,
  render_pass: vk::RenderPass,
  pipeline_layout: vk::PipelineLayout,
  size: &vk::Extent2D,
) -> VkQuadResult<vk::Pipeline> {
  // shader modules are dropped at the end of this fn
  let module_vs = create_shader_module(device, &config.vertex_shader_path)?;
  let module_fs = create_shader_module(device, &config.fragment_shader_path)?;
  let stages = [
    create_shader_stage(vk::ShaderStageFlags::VERTEX, module_vs.handle()),
    create_shader_stage(vk::ShaderStageFlags::FRAGMENT, module_fs.handle()),
  ];

  let vertex_desc = QuadVertex::get_vertex_description();
  let input_assembly_state = ps_ia_triangle_list();
  let viewports = [create_viewport(size)];
  let scissors = [size_to_rect_vk(size)];
  let viewport_state = ps_viewport_fill_rect(&viewports, &scissors);
  let rasterization_state = ps_raster_polygons(vk::CullModeFlags::BACK);
  let multisample_state = ps_multisample_disabled();
  let color_attachments = [ps_color_attachment_override()];
  let color_blend_state = ps_color_blend_override(&color_attachments);

  let create_info = vk::GraphicsPipelineCreateInfo::builder()
    .stages(&stages)
    .vertex_input_state(&vertex_desc)
    .input_assembly_state(&input_assembly_state)
    .viewport_state(&viewport_state)
    .rasterization_state(&rasterization_state)
    .multisample_state(&multisample_state)
    .color_blend_state(&color_blend_state)
    .layout(pipeline_layout)
    .render_pass(render_pass)
    .subpass(0)
    .build();

  let pipeline = create_pipeline(device, create_info)?;
  Ok(pipeline)
}
