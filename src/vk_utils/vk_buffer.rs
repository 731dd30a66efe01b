use ash::prelude::VkResult;
use ash::vk;
use log::trace;
use vma::Alloc;

use crate::error::ReleaseOnErr;

use super::{
  determine_gpu_allocation_info, get_persistently_mapped_pointer, MemoryMapPointer,
  VkMemoryPreference, VkMemoryResource, WithSetupCmdBuffer,
};

// https://gpuopen-librariesandsdks.github.io/VulkanMemoryAllocator/html/quick_start.html
// https://github.com/expenses/vulkan-base/blob/main/ash-helpers/src/lib.rs

pub struct VkBuffer {
  // For debugging
  pub name: String,
  /// Size in bytes
  pub size: usize,
  /// Native Vulkan buffer
  pub buffer: vk::Buffer,
  pub allocation: vma::Allocation,
  /// Set for `GpuMappable` and `ScratchTransfer`, valid until `delete`
  mapped_pointer: Option<MemoryMapPointer>,
}

impl VkBuffer {
  /// Allocate empty vulkan buffer
  pub fn empty(
    allocator: &vma::Allocator,
    name: String,
    size: usize,
    usage: vk::BufferUsageFlags,
    memory_pref: VkMemoryPreference,
  ) -> VkResult<Self> {
    let buffer_info = vk::BufferCreateInfo::builder()
      .size(size as u64)
      .usage(usage)
      .sharing_mode(vk::SharingMode::EXCLUSIVE)
      .build();
    let alloc_info = determine_gpu_allocation_info(&memory_pref);

    let (buffer, allocation) = unsafe { allocator.create_buffer(&buffer_info, &alloc_info)? };
    let mapped_pointer = if memory_pref.is_mapped() {
      get_persistently_mapped_pointer(allocator, &allocation)
    } else {
      None
    };
    trace!("Allocated buffer '{}' ({} bytes)", name, size);

    Ok(Self {
      name,
      size,
      buffer,
      allocation,
      mapped_pointer,
    })
  }

  /// Device-local buffer filled through a temporary staging buffer.
  /// `usage` gets `TRANSFER_DST` added.
  pub fn from_data(
    allocator: &vma::Allocator,
    app_init: &impl WithSetupCmdBuffer,
    name: String,
    bytes: &[u8],
    usage: vk::BufferUsageFlags,
  ) -> VkResult<Self> {
    let size = bytes.len();
    let mut staging = VkBuffer::empty(
      allocator,
      format!("{}-staging", name),
      size,
      vk::BufferUsageFlags::TRANSFER_SRC,
      VkMemoryPreference::ScratchTransfer,
    )?;
    staging.write_to_mapped(bytes);

    let mut buffer = VkBuffer::empty(
      allocator,
      name,
      size,
      usage | vk::BufferUsageFlags::TRANSFER_DST,
      VkMemoryPreference::GpuOnly,
    )
    .release_on_err(|| unsafe { staging.delete(allocator) })?;

    let (src, dst) = (staging.buffer, buffer.buffer);
    let upload_result = app_init.with_setup_cb(|device, cmd_buf| unsafe {
      let region = vk::BufferCopy::builder().size(size as u64).build();
      device.cmd_copy_buffer(cmd_buf, src, dst, &[region]);
    });

    // staging buffer goes away whatever happened
    unsafe { staging.delete(allocator) };
    upload_result.release_on_err(|| unsafe { buffer.delete(allocator) })?;
    Ok(buffer)
  }

  pub unsafe fn delete(&mut self, allocator: &vma::Allocator) {
    self.mapped_pointer = None;
    allocator.destroy_buffer(self.buffer, &mut self.allocation)
  }
}

impl VkMemoryResource for VkBuffer {
  fn get_name(&self) -> &String {
    &self.name
  }

  fn get_size(&self) -> usize {
    self.size
  }

  fn get_mapped_pointer(&self) -> Option<MemoryMapPointer> {
    self.mapped_pointer
  }
}
