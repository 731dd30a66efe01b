use ash::prelude::VkResult;
use ash::vk;

/// Single color attachment that ends up on screen.
/// Cleared on load, layout goes UNDEFINED -> PRESENT_SRC_KHR.
pub fn create_present_attachment(image_format: vk::Format) -> vk::AttachmentDescription {
  vk::AttachmentDescription::builder()
    .format(image_format)
    .samples(vk::SampleCountFlags::TYPE_1) // single sampled
    .load_op(vk::AttachmentLoadOp::CLEAR)
    .store_op(vk::AttachmentStoreOp::STORE)
    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
    .initial_layout(vk::ImageLayout::UNDEFINED)
    .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
    .build()
}

/// Do not write color before the swapchain image was actually acquired.
pub fn create_present_dependency() -> vk::SubpassDependency {
  vk::SubpassDependency::builder()
    .src_subpass(vk::SUBPASS_EXTERNAL)
    .dst_subpass(0)
    .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .src_access_mask(vk::AccessFlags::empty())
    .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .dst_access_mask(
      vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
    )
    .build()
}

pub fn create_present_render_pass(
  device: &ash::Device,
  image_format: vk::Format,
) -> VkResult<vk::RenderPass> {
  let attachments = [create_present_attachment(image_format)];
  let color_refs = [vk::AttachmentReference {
    attachment: 0, // from the array above
    layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
  }];

  let subpasses = [vk::SubpassDescription::builder()
    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
    .color_attachments(&color_refs)
    .build()];
  let dependencies = [create_present_dependency()];

  let create_info = vk::RenderPassCreateInfo::builder()
    .attachments(&attachments)
    .subpasses(&subpasses)
    .dependencies(&dependencies)
    .build();
  unsafe { device.create_render_pass(&create_info, None) }
}
