use ash::prelude::VkResult;
use ash::vk;

pub fn create_pipeline_layout(
  device: &ash::Device,
  uniform_layouts: &[vk::DescriptorSetLayout],
) -> VkResult<vk::PipelineLayout> {
  let create_info = vk::PipelineLayoutCreateInfo::builder()
    .set_layouts(uniform_layouts)
    .build();
  unsafe { device.create_pipeline_layout(&create_info, None) }
}

pub fn create_pipeline(
  device: &ash::Device,
  pipeline_create_info: vk::GraphicsPipelineCreateInfo,
) -> VkResult<vk::Pipeline> {
  let pipelines = unsafe {
    device
      .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_create_info], None)
      .map_err(|(_, err)| err)?
  };
  pipelines
    .into_iter()
    .next()
    .ok_or(vk::Result::ERROR_INITIALIZATION_FAILED)
}

// This file contains presets for `vk::GraphicsPipelineCreateInfo`.
// Most common options, so it's actually manageable and <100LOC every time

/// PipelineInputAssembly-TRIANGLE_LIST
pub fn ps_ia_triangle_list() -> vk::PipelineInputAssemblyStateCreateInfo {
  vk::PipelineInputAssemblyStateCreateInfo::builder()
    .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
    .build()
}

/// Hardcoded size, does not require PipelineDynamicStateCreateInfo later on.
/// Both slices have to outlive pipeline creation.
pub fn ps_viewport_fill_rect(
  viewports: &[vk::Viewport],
  scissors: &[vk::Rect2D],
) -> vk::PipelineViewportStateCreateInfo {
  vk::PipelineViewportStateCreateInfo::builder()
    .viewports(viewports)
    .scissors(scissors)
    .build()
}

/// Default state that you would use to display opaque polygons
pub fn ps_raster_polygons(
  cull_mode: vk::CullModeFlags,
) -> vk::PipelineRasterizationStateCreateInfo {
  vk::PipelineRasterizationStateCreateInfo::builder()
    .depth_clamp_enable(false) // when would You ever want it to be true?
    .rasterizer_discard_enable(false)
    .polygon_mode(vk::PolygonMode::FILL)
    .cull_mode(cull_mode)
    .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
    .depth_bias_enable(false)
    .line_width(1.0) // validation layers: has to be 1.0 if not dynamic
    .build()
}

pub fn ps_multisample_disabled() -> vk::PipelineMultisampleStateCreateInfo {
  vk::PipelineMultisampleStateCreateInfo::builder()
    .rasterization_samples(vk::SampleCountFlags::TYPE_1)
    .sample_shading_enable(false)
    .build()
}

/// Write RGBA, no blending
pub fn ps_color_attachment_override() -> vk::PipelineColorBlendAttachmentState {
  vk::PipelineColorBlendAttachmentState::builder()
    .color_write_mask(vk::ColorComponentFlags::RGBA)
    .blend_enable(false)
    .src_color_blend_factor(vk::BlendFactor::ONE) // shader output
    .dst_color_blend_factor(vk::BlendFactor::ZERO) // existing value on destination attachment
    .color_blend_op(vk::BlendOp::ADD)
    .src_alpha_blend_factor(vk::BlendFactor::ONE)
    .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
    .alpha_blend_op(vk::BlendOp::ADD)
    .build()
}

pub fn ps_color_blend_override(
  attachments: &[vk::PipelineColorBlendAttachmentState],
) -> vk::PipelineColorBlendStateCreateInfo {
  vk::PipelineColorBlendStateCreateInfo::builder()
    .logic_op_enable(false)
    .attachments(attachments)
    .build()
}
