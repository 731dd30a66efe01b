use log::{debug, trace};

use ash::vk;

use super::{AcquireOutcome, FrameBackend, PresentOutcome, PresentationResources};
use crate::config::Config;
use crate::error::{VkQuadError, VkQuadResult};
use crate::scene::{QuadUBO, World};
use crate::vk_ctx::{VkCtx, VkCtxSynchronize};

/// Borrows everything one `draw_frame` needs. Built fresh every frame.
pub struct VkFrameBackend<'a> {
  pub vk_ctx: &'a VkCtx,
  pub world: &'a World,
  pub config: &'a Config,
  pub synchronize: &'a VkCtxSynchronize,
  /// `None` only if a previous rebuild failed halfway
  pub presentation: &'a mut Option<PresentationResources>,
  pub window_size: vk::Extent2D,
  /// seconds since start
  pub time: f32,
}

impl<'a> VkFrameBackend<'a> {
  fn presentation(&self) -> VkQuadResult<&PresentationResources> {
    self
      .presentation
      .as_ref()
      .ok_or(VkQuadError::PresentationNotReady)
  }
}

impl<'a> FrameBackend for VkFrameBackend<'a> {
  fn wait_for_slot(&mut self, slot: usize) -> VkQuadResult<()> {
    let fence = self.synchronize.slot(slot).submission_fence.handle();
    unsafe {
      self
        .vk_ctx
        .vk_device()
        .wait_for_fences(&[fence], true, u64::MAX)?;
    }
    Ok(())
  }

  fn acquire_image(&mut self, slot: usize) -> VkQuadResult<AcquireOutcome> {
    let presentation = self.presentation()?;
    let swapchain = &presentation.swapchain;
    let semaphore = self.synchronize.slot(slot).image_acquired_semaphore.handle();

    let result = unsafe {
      swapchain.loader().acquire_next_image(
        swapchain.handle(),
        u64::MAX,
        semaphore,
        vk::Fence::null(),
      )
    };
    match result {
      Ok((image_idx, suboptimal)) => Ok(AcquireOutcome::Acquired {
        image_idx,
        suboptimal,
      }),
      Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
      Err(err) => Err(err.into()),
    }
  }

  fn update_uniforms(&mut self, image_idx: u32) -> VkQuadResult<()> {
    let presentation = self.presentation()?;
    let ubo = QuadUBO::new(
      &presentation.camera,
      self.time,
      self.config.model_rotation_speed,
    );
    presentation.per_image.write(image_idx as usize, &ubo);
    Ok(())
  }

  fn submit(&mut self, slot: usize, image_idx: u32) -> VkQuadResult<()> {
    let presentation = self.presentation()?;
    let device = self.vk_ctx.vk_device();
    let frame_slot = self.synchronize.slot(slot);
    let fence = frame_slot.submission_fence.handle();

    let wait_semaphores = [frame_slot.image_acquired_semaphore.handle()];
    let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
    let cmd_bufs = [presentation.command_buffers.get(image_idx as usize)];
    let signal_semaphores = [frame_slot.render_complete_semaphore.handle()];
    let submit_info = vk::SubmitInfo::builder()
      .wait_semaphores(&wait_semaphores)
      .wait_dst_stage_mask(&wait_stages)
      .command_buffers(&cmd_bufs)
      .signal_semaphores(&signal_semaphores)
      .build();

    unsafe {
      // reset only right before the submit that signals it again
      device.reset_fences(&[fence])?;
      device.queue_submit(self.vk_ctx.device.graphics_queue, &[submit_info], fence)?;
    }
    Ok(())
  }

  fn present(&mut self, slot: usize, image_idx: u32) -> VkQuadResult<PresentOutcome> {
    let presentation = self.presentation()?;
    let swapchain = &presentation.swapchain;

    let wait_semaphores = [self.synchronize.slot(slot).render_complete_semaphore.handle()];
    let swapchains = [swapchain.handle()];
    let image_indices = [image_idx];
    let present_info = vk::PresentInfoKHR::builder()
      .wait_semaphores(&wait_semaphores)
      .swapchains(&swapchains)
      .image_indices(&image_indices)
      .build();

    let result = unsafe {
      swapchain
        .loader()
        .queue_present(self.vk_ctx.device.present_queue, &present_info)
    };
    match result {
      Ok(false) => Ok(PresentOutcome::Presented),
      Ok(true) => Ok(PresentOutcome::Suboptimal),
      Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
      Err(err) => Err(err.into()),
    }
  }

  fn window_extent(&self) -> vk::Extent2D {
    self.window_size
  }

  fn rebuild_presentation(&mut self, window_extent: vk::Extent2D) -> VkQuadResult<()> {
    self.vk_ctx.wait_idle()?;

    if let Some(mut old) = self.presentation.take() {
      unsafe { old.destroy_uniforms(&self.vk_ctx.allocator) };
      // old swapchain and everything built on it goes away here
    }
    trace!("Old presentation resources released");

    let presentation =
      PresentationResources::new(self.vk_ctx, self.world, self.config, window_extent)?;
    debug!(
      "Presentation rebuilt: {}x{}, {:?}",
      presentation.swapchain.size.width,
      presentation.swapchain.size.height,
      presentation.swapchain.present_mode
    );
    *self.presentation = Some(presentation);
    Ok(())
  }
}
