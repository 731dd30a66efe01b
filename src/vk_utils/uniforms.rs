use ash::prelude::VkResult;
use ash::vk;

/*
https://vulkan-tutorial.com/Uniform_buffers/Descriptor_layout_and_buffer <3

You cannot bind a single shader resource to a buffer/texture. You can only bind a group
of resources as descriptor sets.

Steps:
  1. Create descriptor pool. Specify how many descriptors will be allocated
  2. Create descriptor set(s). Each descriptor set contains some number
     of uniform buffers/textures, each assigned a `binding`.
  3. Connect the real data buffer to a (descriptor_set, binding) using `vkUpdateDescriptorSets`.
  4. Bind the descriptor sets before draw call: `vkCmdBindDescriptorSets`.

DescriptorSetLayout is required during:
- creating descriptor set so we can bind the data
- creating rendering pipeline
*/

////////////////////////////////
/// Layout utils
////////////////////////////////

/// Create layout for a single uniform buffer object.
/// That layout will be one of layouts gathered in DescriptorSetLayout.
pub fn create_ubo_binding(
  binding: u32,
  stage_flags: vk::ShaderStageFlags,
) -> vk::DescriptorSetLayoutBinding {
  vk::DescriptorSetLayoutBinding::builder()
    .binding(binding)
    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
    .descriptor_count(1)
    .stage_flags(stage_flags)
    .build()
}

/// Create layout for a single texture/sampler object.
/// That layout will be one of layouts gathered in DescriptorSetLayout.
pub fn create_texture_binding(
  binding: u32,
  stage_flags: vk::ShaderStageFlags,
) -> vk::DescriptorSetLayoutBinding {
  vk::DescriptorSetLayoutBinding::builder()
    .binding(binding)
    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
    .descriptor_count(1)
    .stage_flags(stage_flags)
    .build()
}

pub fn create_descriptor_set_layout(
  device: &ash::Device,
  bindings: &[vk::DescriptorSetLayoutBinding],
) -> VkResult<vk::DescriptorSetLayout> {
  let create_info = vk::DescriptorSetLayoutCreateInfo::builder()
    .bindings(bindings)
    .build();
  unsafe { device.create_descriptor_set_layout(&create_info, None) }
}

/// Pool sizes so that `set_count` sets, each with all of `bindings`, fit.
pub fn get_pool_sizes(
  bindings: &[vk::DescriptorSetLayoutBinding],
  set_count: u32,
) -> Vec<vk::DescriptorPoolSize> {
  let mut sizes: Vec<vk::DescriptorPoolSize> = Vec::new();
  for binding in bindings {
    let count = binding.descriptor_count * set_count;
    match sizes.iter_mut().find(|s| s.ty == binding.descriptor_type) {
      Some(size) => size.descriptor_count += count,
      None => sizes.push(vk::DescriptorPoolSize {
        ty: binding.descriptor_type,
        descriptor_count: count,
      }),
    }
  }
  sizes
}

pub fn create_descriptor_pool(
  device: &ash::Device,
  pool_sizes: &[vk::DescriptorPoolSize],
  max_sets: u32,
) -> VkResult<vk::DescriptorPool> {
  let create_info = vk::DescriptorPoolCreateInfo::builder()
    .pool_sizes(pool_sizes)
    .max_sets(max_sets)
    .build();
  unsafe { device.create_descriptor_pool(&create_info, None) }
}

/// `count` sets with the same layout
pub fn allocate_descriptor_sets(
  device: &ash::Device,
  pool: vk::DescriptorPool,
  layout: vk::DescriptorSetLayout,
  count: usize,
) -> VkResult<Vec<vk::DescriptorSet>> {
  let layouts = vec![layout; count];
  let alloc_info = vk::DescriptorSetAllocateInfo::builder()
    .descriptor_pool(pool)
    .set_layouts(&layouts)
    .build();
  unsafe { device.allocate_descriptor_sets(&alloc_info) }
}

////////////////////////////////
/// Write utils
////////////////////////////////

pub fn create_ubo_buffer_info(buffer: vk::Buffer, size: usize) -> vk::DescriptorBufferInfo {
  vk::DescriptorBufferInfo::builder()
    .buffer(buffer)
    .offset(0)
    .range(size as u64)
    .build()
}

pub fn create_texture_image_info(
  image_view: vk::ImageView,
  sampler: vk::Sampler,
) -> vk::DescriptorImageInfo {
  vk::DescriptorImageInfo::builder()
    .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
    .image_view(image_view)
    .sampler(sampler)
    .build()
}

/// `buffer_info` has to outlive `update_descriptor_sets`.
pub fn write_ubo(
  set: vk::DescriptorSet,
  binding: u32,
  buffer_info: &[vk::DescriptorBufferInfo],
) -> vk::WriteDescriptorSet {
  vk::WriteDescriptorSet::builder()
    .dst_set(set)
    .dst_binding(binding)
    .dst_array_element(0)
    .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
    .buffer_info(buffer_info)
    .build()
}

/// `image_info` has to outlive `update_descriptor_sets`.
pub fn write_texture(
  set: vk::DescriptorSet,
  binding: u32,
  image_info: &[vk::DescriptorImageInfo],
) -> vk::WriteDescriptorSet {
  vk::WriteDescriptorSet::builder()
    .dst_set(set)
    .dst_binding(binding)
    .dst_array_element(0)
    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
    .image_info(image_info)
    .build()
}
