use std::marker::{Send, Sync};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VkMemoryPreference {
  /// Usage: vertex, index buffers, sampled textures.
  GpuOnly,
  /// CPU-mapped memory that is read on GPU.
  /// Will be persistently mapped.
  ///
  /// Usage: Uniform buffers.
  GpuMappable,
  /// Temporary allocation used when copying CPU data to GPU-only memory.
  /// No guarantee if it's CPU or GPU. Nor should you care.
  ///
  /// Will be persistently mapped.
  ScratchTransfer,
}

impl VkMemoryPreference {
  pub fn is_mapped(&self) -> bool {
    *self != VkMemoryPreference::GpuOnly
  }
}

pub fn determine_gpu_allocation_info(
  memory_pref: &VkMemoryPreference,
) -> vma::AllocationCreateInfo {
  match memory_pref {
    VkMemoryPreference::GpuOnly => vma::AllocationCreateInfo {
      usage: vma::MemoryUsage::AutoPreferDevice,
      ..Default::default()
    },
    VkMemoryPreference::GpuMappable => vma::AllocationCreateInfo {
      usage: vma::MemoryUsage::AutoPreferDevice,
      flags: vma::AllocationCreateFlags::HOST_ACCESS_SEQUENTIAL_WRITE
        | vma::AllocationCreateFlags::MAPPED,
      ..Default::default()
    },
    VkMemoryPreference::ScratchTransfer => vma::AllocationCreateInfo {
      usage: vma::MemoryUsage::Auto,
      flags: vma::AllocationCreateFlags::HOST_ACCESS_SEQUENTIAL_WRITE
        | vma::AllocationCreateFlags::MAPPED,
      ..Default::default()
    },
  }
}

pub fn get_persistently_mapped_pointer(
  allocator: &vma::Allocator,
  allocation: &vma::Allocation,
) -> Option<MemoryMapPointer> {
  let alloc_info = allocator.get_allocation_info(allocation);
  let ptr = alloc_info.mapped_data;
  if ptr.is_null() {
    None
  } else {
    Some(MemoryMapPointer(ptr))
  }
}

/// Wrapper over a raw pointer to make it moveable and accessible from other threads
#[derive(Clone, Copy)]
pub struct MemoryMapPointer(pub *mut ::std::os::raw::c_void);
unsafe impl Send for MemoryMapPointer {}
unsafe impl Sync for MemoryMapPointer {}

pub trait VkMemoryResource {
  fn get_name(&self) -> &String;
  fn get_size(&self) -> usize;
  fn get_mapped_pointer(&self) -> Option<MemoryMapPointer>;

  /// Panics if the resource was not mapped, or `bytes` do not fit.
  fn write_to_mapped(&self, bytes: &[u8]) {
    let mapped_pointer = self.get_mapped_pointer();
    let size = bytes.len();
    if size > self.get_size() {
      panic!(
        "Tried to write {} bytes into '{}' that only has {} bytes",
        size,
        self.get_name(),
        self.get_size()
      );
    }

    if let Some(pointer) = mapped_pointer {
      let slice = unsafe { std::slice::from_raw_parts_mut(pointer.0 as *mut u8, size) };
      slice.copy_from_slice(bytes);
    } else {
      panic!(
        "Tried to write {} bytes to unmapped '{}'",
        size,
        self.get_name()
      )
    }
  }
}
