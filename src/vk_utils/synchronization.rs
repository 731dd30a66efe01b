use ash::prelude::VkResult;
use ash::vk;

/*
https://github.com/KhronosGroup/Vulkan-Docs/wiki/Synchronization-Examples
https://vulkan-tutorial.com/Texture_mapping/Images#page_Transition-barrier-masks
*/

pub fn create_semaphore(device: &ash::Device) -> VkResult<vk::Semaphore> {
  let semaphore_create_info = vk::SemaphoreCreateInfo::builder()
    .flags(vk::SemaphoreCreateFlags::empty())
    .build();
  unsafe { device.create_semaphore(&semaphore_create_info, None) }
}

/// Created signaled, so the very first wait on it returns immediately.
pub fn create_fence(device: &ash::Device) -> VkResult<vk::Fence> {
  let create_info = vk::FenceCreateInfo::builder()
    .flags(vk::FenceCreateFlags::SIGNALED)
    .build();
  unsafe { device.create_fence(&create_info, None) }
}

/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkImageMemoryBarrier.html
pub fn create_image_barrier(
  image: vk::Image,
  aspect_mask: vk::ImageAspectFlags,
  old_layout: vk::ImageLayout,
  new_layout: vk::ImageLayout,
  src_access_mask: vk::AccessFlags,
  dst_access_mask: vk::AccessFlags,
) -> vk::ImageMemoryBarrier {
  vk::ImageMemoryBarrier::builder()
    .old_layout(old_layout)
    .new_layout(new_layout)
    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
    .image(image)
    .src_access_mask(src_access_mask)
    .dst_access_mask(dst_access_mask)
    .subresource_range(vk::ImageSubresourceRange {
      aspect_mask,
      base_mip_level: 0,
      level_count: 1, // vk::REMAINING_MIP_LEVELS
      base_array_layer: 0,
      layer_count: 1, // vk::REMAINING_ARRAY_LAYERS
    })
    .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutTransition {
  pub src_access_mask: vk::AccessFlags,
  pub dst_access_mask: vk::AccessFlags,
  pub src_stage: vk::PipelineStageFlags,
  pub dst_stage: vk::PipelineStageFlags,
}

/// Only the two transitions needed to upload a sampled texture are known.
/// Anything else is a programming error.
pub fn get_layout_transition(
  old_layout: vk::ImageLayout,
  new_layout: vk::ImageLayout,
) -> LayoutTransition {
  match (old_layout, new_layout) {
    (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => LayoutTransition {
      src_access_mask: vk::AccessFlags::empty(),
      dst_access_mask: vk::AccessFlags::TRANSFER_WRITE,
      src_stage: vk::PipelineStageFlags::TOP_OF_PIPE,
      dst_stage: vk::PipelineStageFlags::TRANSFER,
    },
    (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => {
      LayoutTransition {
        src_access_mask: vk::AccessFlags::TRANSFER_WRITE,
        dst_access_mask: vk::AccessFlags::SHADER_READ,
        src_stage: vk::PipelineStageFlags::TRANSFER,
        dst_stage: vk::PipelineStageFlags::FRAGMENT_SHADER,
      }
    }
    _ => panic!(
      "Unsupported image layout transition {:?} -> {:?}",
      old_layout, new_layout
    ),
  }
}

pub unsafe fn cmd_transition_image_layout(
  device: &ash::Device,
  cmd_buf: vk::CommandBuffer,
  image: vk::Image,
  old_layout: vk::ImageLayout,
  new_layout: vk::ImageLayout,
) {
  let transition = get_layout_transition(old_layout, new_layout);
  let barrier = create_image_barrier(
    image,
    vk::ImageAspectFlags::COLOR,
    old_layout,
    new_layout,
    transition.src_access_mask,
    transition.dst_access_mask,
  );

  device.cmd_pipeline_barrier(
    cmd_buf,
    transition.src_stage,
    transition.dst_stage,
    vk::DependencyFlags::empty(),
    &[],
    &[],
    &[barrier],
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn upload_transition_waits_for_nothing() {
    let t = get_layout_transition(
      vk::ImageLayout::UNDEFINED,
      vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );
    assert_eq!(t.src_access_mask, vk::AccessFlags::empty());
    assert_eq!(t.dst_access_mask, vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(t.src_stage, vk::PipelineStageFlags::TOP_OF_PIPE);
    assert_eq!(t.dst_stage, vk::PipelineStageFlags::TRANSFER);
  }

  #[test]
  fn sampling_transition_waits_for_copy() {
    let t = get_layout_transition(
      vk::ImageLayout::TRANSFER_DST_OPTIMAL,
      vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    );
    assert_eq!(t.src_access_mask, vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(t.dst_access_mask, vk::AccessFlags::SHADER_READ);
    assert_eq!(t.src_stage, vk::PipelineStageFlags::TRANSFER);
    assert_eq!(t.dst_stage, vk::PipelineStageFlags::FRAGMENT_SHADER);
  }

  #[test]
  #[should_panic(expected = "Unsupported image layout transition")]
  fn unknown_transition_panics() {
    get_layout_transition(
      vk::ImageLayout::UNDEFINED,
      vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    );
  }

  #[test]
  fn barrier_carries_layouts_and_masks() {
    let b = create_image_barrier(
      vk::Image::null(),
      vk::ImageAspectFlags::COLOR,
      vk::ImageLayout::UNDEFINED,
      vk::ImageLayout::TRANSFER_DST_OPTIMAL,
      vk::AccessFlags::empty(),
      vk::AccessFlags::TRANSFER_WRITE,
    );
    assert_eq!(b.old_layout, vk::ImageLayout::UNDEFINED);
    assert_eq!(b.new_layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
    assert_eq!(b.dst_access_mask, vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(b.src_queue_family_index, vk::QUEUE_FAMILY_IGNORED);
    assert_eq!(b.subresource_range.level_count, 1);
  }
}
