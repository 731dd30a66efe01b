use ash::prelude::VkResult;
use ash::vk;

pub fn create_command_pool(
  device: &ash::Device,
  queue_family_index: u32,
) -> VkResult<vk::CommandPool> {
  // vk::CommandPoolCreateFlags::TRANSIENT - we are not short lived at all
  let cmd_pool_create_info = vk::CommandPoolCreateInfo::builder()
    .queue_family_index(queue_family_index)
    .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
    .build();

  unsafe { device.create_command_pool(&cmd_pool_create_info, None) }
}

pub fn create_command_buffers(
  device: &ash::Device,
  cmd_pool: vk::CommandPool,
  count: usize,
) -> VkResult<Vec<vk::CommandBuffer>> {
  let cmd_buf_create_info = vk::CommandBufferAllocateInfo::builder()
    .command_buffer_count(count as u32)
    .command_pool(cmd_pool)
    .level(vk::CommandBufferLevel::PRIMARY)
    .build();

  unsafe { device.allocate_command_buffers(&cmd_buf_create_info) }
}

/// Command buffers allocated from a pool that outlives them.
/// Returned to the pool on drop.
pub struct VkCommandBuffers {
  device: ash::Device,
  pool: vk::CommandPool,
  pub buffers: Vec<vk::CommandBuffer>,
}

impl VkCommandBuffers {
  pub fn allocate(device: &ash::Device, pool: vk::CommandPool, count: usize) -> VkResult<Self> {
    let buffers = create_command_buffers(device, pool, count)?;
    Ok(Self {
      device: device.clone(),
      pool,
      buffers,
    })
  }

  pub fn get(&self, idx: usize) -> vk::CommandBuffer {
    self.buffers[idx]
  }
}

impl Drop for VkCommandBuffers {
  fn drop(&mut self) {
    if !self.buffers.is_empty() {
      unsafe { self.device.free_command_buffers(self.pool, &self.buffers) }
    }
  }
}
