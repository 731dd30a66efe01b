use ash::prelude::VkResult;
use ash::vk;

use crate::vk_utils::{create_fence, create_semaphore, VkOwned};

/// Sync objects for one frame in flight.
pub struct FrameSlot {
  /// Signaled by acquire, waited on by submit
  pub image_acquired_semaphore: VkOwned<vk::Semaphore>,
  /// Signaled by submit, waited on by present
  pub render_complete_semaphore: VkOwned<vk::Semaphore>,
  /// Signaled by submit, waited on by the CPU before reusing this slot.
  /// Created signaled.
  pub submission_fence: VkOwned<vk::Fence>,
}

/**
https://www.khronos.org/assets/uploads/developers/library/2016-vulkan-devday-uk/7-Keeping-your-GPU-fed.pdf

`frames_in_flight` slots, used round-robin. Independent of the swapchain image count,
so these survive swapchain recreation.
*/
pub struct VkCtxSynchronize {
  pub slots: Vec<FrameSlot>,
}

impl VkCtxSynchronize {
  pub fn new(device: &ash::Device, frames_in_flight: usize) -> VkResult<Self> {
    let slots = (0..frames_in_flight)
      .map(|_| -> VkResult<FrameSlot> {
        Ok(FrameSlot {
          image_acquired_semaphore: VkOwned::new(device, create_semaphore(device)?),
          render_complete_semaphore: VkOwned::new(device, create_semaphore(device)?),
          submission_fence: VkOwned::new(device, create_fence(device)?),
        })
      })
      .collect::<VkResult<Vec<_>>>()?;
    Ok(Self { slots })
  }

  pub fn frames_in_flight(&self) -> usize {
    self.slots.len()
  }

  pub fn slot(&self, idx: usize) -> &FrameSlot {
    let slot = self.slots.get(idx);
    assert!(
      slot.is_some(),
      "Requested frame slot {}, there are only {}",
      idx,
      self.slots.len()
    );
    &self.slots[idx]
  }
}
