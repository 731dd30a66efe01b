use ash::prelude::VkResult;
use ash::vk;

/// Anything that can run a one-shot command buffer on the graphics queue
/// and wait for it to finish. Used for uploads during init.
pub trait WithSetupCmdBuffer {
  fn with_setup_cb(&self, callback: impl FnOnce(&ash::Device, vk::CommandBuffer)) -> VkResult<()>;
}

pub unsafe fn execute_setup_cmd_buf(
  device: &ash::Device,
  queue: vk::Queue,
  cmd_buf: vk::CommandBuffer,
  callback: impl FnOnce(&ash::Device, vk::CommandBuffer),
) -> VkResult<()> {
  // begin setup
  let cmd_buf_begin_info = vk::CommandBufferBeginInfo::builder()
    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)
    .build();
  // also resets command buffer
  device.begin_command_buffer(cmd_buf, &cmd_buf_begin_info)?;

  // execute
  callback(device, cmd_buf);

  // end+submit
  device.end_command_buffer(cmd_buf)?;
  let cmd_bufs = [cmd_buf];
  let submit_info = vk::SubmitInfo::builder().command_buffers(&cmd_bufs).build();
  device.queue_submit(queue, &[submit_info], vk::Fence::null())?;

  log::trace!("with_setup_cb: queue_wait_idle");
  device.queue_wait_idle(queue)
}
