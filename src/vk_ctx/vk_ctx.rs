use log::{info, trace};
use std::mem::ManuallyDrop;

use ash::extensions::khr::Surface;
use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use winit::window::Window;

use super::VkCtxDevice;
use crate::config::DeviceConfig;
use crate::error::{VkQuadError, VkQuadResult};
use crate::vk_utils::debug::DebugMessenger;
use crate::vk_utils::device::{
  create_instance, create_logical_device, get_max_sampler_anisotropy, pick_physical_device,
};
use crate::vk_utils::surface_support::SwapchainSupportDetails;
use crate::vk_utils::{
  create_command_buffers, create_command_pool, execute_setup_cmd_buf, WithSetupCmdBuffer,
};

/** Kitchen sink for Vulkan stuff that lives as long as the app does */
pub struct VkCtx {
  /// Keeps the Vulkan loader library loaded, only read during creation
  #[allow(dead_code)]
  pub entry: ash::Entry,
  pub instance: ash::Instance,
  pub debug_messenger: Option<DebugMessenger>,
  pub enable_diagnostics: bool,

  // surface
  pub surface_loader: Surface,
  pub surface_khr: vk::SurfaceKHR,

  pub device: VkCtxDevice,
  pub allocator: ManuallyDrop<vma::Allocator>,

  pub command_pool: vk::CommandPool,
  /// Special command buffer used for resource init
  pub setup_cb: vk::CommandBuffer,
}

impl VkCtx {
  // https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L332
  pub fn new(window: &Window, device_config: &DeviceConfig) -> VkQuadResult<VkCtx> {
    let entry = unsafe { ash::Entry::load()? };
    let instance = create_instance(&entry, device_config, window.raw_display_handle())?;
    let debug_messenger = if device_config.enable_diagnostics {
      Some(DebugMessenger::new(&entry, &instance)?)
    } else {
      None
    };

    // surface data
    let surface_loader = Surface::new(&entry, &instance);
    let surface_khr = unsafe {
      ash_window::create_surface(
        &entry,
        &instance,
        window.raw_display_handle(),
        window.raw_window_handle(),
        None,
      )?
    };
    trace!("Surface created");

    // devices
    let (phys_device, queue_families) =
      pick_physical_device(&instance, &surface_loader, surface_khr, device_config)?;
    let (device, graphics_queue, present_queue) =
      create_logical_device(&instance, phys_device, &queue_families, device_config)?;
    let (graphics_family, present_family) = queue_families
      .pair()
      .ok_or(VkQuadError::NoSuitableAdapter)?;
    info!(
      "Queue families: graphics={}, present={}",
      graphics_family, present_family
    );

    // command buffers
    let command_pool = create_command_pool(&device, graphics_family)?;
    let setup_cb = create_command_buffers(&device, command_pool, 1)?[0];

    // gpu memory allocator
    let allocator = vma::Allocator::new(vma::AllocatorCreateInfo::new(
      &instance,
      &device,
      phys_device,
    ))?;

    Ok(VkCtx {
      debug_messenger,
      enable_diagnostics: device_config.enable_diagnostics,
      surface_loader,
      surface_khr,
      device: VkCtxDevice {
        phys_device,
        graphics_family,
        present_family,
        max_sampler_anisotropy: get_max_sampler_anisotropy(&instance, phys_device),
        device,
        graphics_queue,
        present_queue,
      },
      allocator: ManuallyDrop::new(allocator),
      command_pool,
      setup_cb,
      entry,
      instance,
    })
  }

  pub fn vk_device(&self) -> &ash::Device {
    &self.device.device
  }

  /// Re-queried every time, capabilities change with window size
  pub fn swapchain_support(&self) -> VkQuadResult<SwapchainSupportDetails> {
    let details = SwapchainSupportDetails::query(
      &self.surface_loader,
      self.surface_khr,
      self.device.phys_device,
    )?;
    Ok(details)
  }

  pub fn wait_idle(&self) -> VkQuadResult<()> {
    unsafe { self.device.device.device_wait_idle()? };
    Ok(())
  }
}

impl WithSetupCmdBuffer for VkCtx {
  fn with_setup_cb(
    &self,
    callback: impl FnOnce(&ash::Device, vk::CommandBuffer),
  ) -> ash::prelude::VkResult<()> {
    unsafe {
      execute_setup_cmd_buf(
        &self.device.device,
        self.device.graphics_queue,
        self.setup_cb,
        callback,
      )
    }
  }
}

impl Drop for VkCtx {
  fn drop(&mut self) {
    info!("VkCtx::drop()");
    let device = &self.device.device;

    unsafe {
      // ignore error, we are going down anyway
      let _ = device.device_wait_idle();

      ManuallyDrop::drop(&mut self.allocator);
      device.free_command_buffers(self.command_pool, &[self.setup_cb]);
      device.destroy_command_pool(self.command_pool, None);
      device.destroy_device(None);

      if let Some(debug_messenger) = &self.debug_messenger {
        debug_messenger.destroy();
      }
      self.surface_loader.destroy_surface(self.surface_khr, None);
      self.instance.destroy_instance(None);
    }
    info!("VkCtx::drop() finished");
  }
}
