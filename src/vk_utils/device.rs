use log::{info, trace, warn};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use ash::extensions::{ext::DebugUtils, khr::Surface};
use ash::vk;
use raw_window_handle::RawDisplayHandle;

use super::debug::debug_messenger_create_info;
use super::surface_support::{
  find_missing_extensions, query_queue_families, AdapterCandidate, QueueFamilyIndices,
  SwapchainSupportDetails,
};
use crate::config::DeviceConfig;
use crate::error::{VkQuadError, VkQuadResult};

fn from_c_str(s: &[c_char]) -> String {
  unsafe { CStr::from_ptr(s.as_ptr()) }
    .to_string_lossy()
    .to_string()
}

fn to_c_strings(names: &[String]) -> VkQuadResult<Vec<CString>> {
  names
    .iter()
    .map(|name| CString::new(name.as_str()).map_err(VkQuadError::from))
    .collect()
}

fn get_app_version() -> u32 {
  let to_u32 = |s: &str| s.parse::<u32>().unwrap_or(0);

  vk::make_api_version(
    0,
    to_u32(env!("CARGO_PKG_VERSION_MAJOR")),
    to_u32(env!("CARGO_PKG_VERSION_MINOR")),
    to_u32(env!("CARGO_PKG_VERSION_PATCH")),
  )
}

/// First required layer the loader does not know about
pub fn find_missing_layer(available: &[String], required: &[String]) -> Option<String> {
  find_missing_extensions(available, required).into_iter().next()
}

pub fn create_instance(
  entry: &ash::Entry,
  device_config: &DeviceConfig,
  display_handle: RawDisplayHandle,
) -> VkQuadResult<ash::Instance> {
  // layers
  let available_layers: Vec<String> = entry
    .enumerate_instance_layer_properties()?
    .iter()
    .map(|layer| from_c_str(&layer.layer_name))
    .collect();
  if let Some(missing) = find_missing_layer(&available_layers, &device_config.required_layers) {
    return Err(VkQuadError::MissingLayer(missing));
  }
  let layer_names = to_c_strings(&device_config.required_layers)?;
  let layer_names_raw: Vec<*const c_char> = layer_names.iter().map(|n| n.as_ptr()).collect();

  // extensions: whatever the window system needs + debug utils
  let mut extension_names_raw: Vec<*const c_char> =
    ash_window::enumerate_required_extensions(display_handle)?.to_vec();
  if device_config.enable_diagnostics {
    extension_names_raw.push(DebugUtils::name().as_ptr());
  }

  let app_name = CString::new(env!("CARGO_PKG_NAME"))?;
  let app_info = vk::ApplicationInfo::builder()
    .application_name(&app_name)
    .application_version(get_app_version())
    .engine_name(&app_name)
    .engine_version(get_app_version())
    .api_version(vk::make_api_version(0, 1, 0, 0))
    .build();

  let mut debug_info = debug_messenger_create_info();
  let mut create_info = vk::InstanceCreateInfo::builder()
    .application_info(&app_info)
    .enabled_layer_names(&layer_names_raw)
    .enabled_extension_names(&extension_names_raw);
  if device_config.enable_diagnostics {
    create_info = create_info.push_next(&mut debug_info);
  }

  let instance = unsafe { entry.create_instance(&create_info, None)? };
  trace!("Ash instance created");
  Ok(instance)
}

fn describe_adapter(
  instance: &ash::Instance,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
  device_config: &DeviceConfig,
) -> VkQuadResult<AdapterCandidate> {
  let props = unsafe { instance.get_physical_device_properties(phys_device) };
  let features = unsafe { instance.get_physical_device_features(phys_device) };
  let queue_families = query_queue_families(instance, surface_loader, surface_khr, phys_device);

  let available_extensions: Vec<String> =
    unsafe { instance.enumerate_device_extension_properties(phys_device)? }
      .iter()
      .map(|ext| from_c_str(&ext.extension_name))
      .collect();
  let missing_extensions =
    find_missing_extensions(&available_extensions, &device_config.required_extensions);

  // only query surface if device can even talk to it
  let swapchain_support = if missing_extensions.is_empty() {
    let queried = SwapchainSupportDetails::query(surface_loader, surface_khr, phys_device);
    if let Err(err) = &queried {
      warn!("Surface query failed for {:?}: {}", phys_device, err);
    }
    SwapchainSupportDetails::or_inadequate(queried)
  } else {
    SwapchainSupportDetails::default()
  };

  Ok(AdapterCandidate {
    device_type: props.device_type,
    geometry_shader: features.geometry_shader != vk::FALSE,
    sampler_anisotropy: features.sampler_anisotropy != vk::FALSE,
    queue_families,
    missing_extensions,
    swapchain_support,
  })
}

/// Picks physical device e.g. "GeForce GTX 1050 Ti". First one that passes
/// `AdapterCandidate::is_suitable` wins.
pub fn pick_physical_device(
  instance: &ash::Instance,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  device_config: &DeviceConfig,
) -> VkQuadResult<(vk::PhysicalDevice, QueueFamilyIndices)> {
  let phys_devices = unsafe { instance.enumerate_physical_devices()? };
  trace!("Found {} physical devices", phys_devices.len());

  for phys_device in phys_devices {
    let props = unsafe { instance.get_physical_device_properties(phys_device) };
    let device_name = from_c_str(&props.device_name);
    let candidate = describe_adapter(
      instance,
      surface_loader,
      surface_khr,
      phys_device,
      device_config,
    )?;

    if candidate.is_suitable() {
      info!("Using physical device: {:?}", device_name);
      return Ok((phys_device, candidate.queue_families));
    }
    if !candidate.missing_extensions.is_empty() {
      warn!(
        "Physical device {:?} is missing extensions: {:?}",
        device_name, candidate.missing_extensions
      );
    }
    trace!("Skipping physical device {:?}", device_name);
  }

  Err(VkQuadError::NoSuitableAdapter)
}

pub fn get_max_sampler_anisotropy(instance: &ash::Instance, phys_device: vk::PhysicalDevice) -> f32 {
  let props = unsafe { instance.get_physical_device_properties(phys_device) };
  props.limits.max_sampler_anisotropy
}

/// Logical device with one queue per unique family.
/// Returns `(device, graphics_queue, present_queue)`, queues may be the same object.
pub fn create_logical_device(
  instance: &ash::Instance,
  phys_device: vk::PhysicalDevice,
  queue_family_indices: &QueueFamilyIndices,
  device_config: &DeviceConfig,
) -> VkQuadResult<(ash::Device, vk::Queue, vk::Queue)> {
  trace!("Will create logical device");
  let (graphics_family, present_family) = queue_family_indices
    .pair()
    .ok_or(VkQuadError::NoSuitableAdapter)?;

  let queue_prio = [1.0f32]; // only one queue per family
  let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = queue_family_indices
    .unique()
    .into_iter()
    .map(|family_idx| {
      vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(family_idx)
        .queue_priorities(&queue_prio)
        .build()
    })
    .collect();

  let extension_names = to_c_strings(&device_config.required_extensions)?;
  let extension_names_raw: Vec<*const c_char> =
    extension_names.iter().map(|n| n.as_ptr()).collect();
  // ignored by new loaders, required by old ones
  let layer_names = to_c_strings(&device_config.required_layers)?;
  let layer_names_raw: Vec<*const c_char> = layer_names.iter().map(|n| n.as_ptr()).collect();

  let features = vk::PhysicalDeviceFeatures {
    sampler_anisotropy: vk::TRUE,
    ..Default::default()
  };
  let device_create_info = vk::DeviceCreateInfo::builder()
    .queue_create_infos(&queue_create_infos)
    .enabled_extension_names(&extension_names_raw)
    .enabled_layer_names(&layer_names_raw)
    .enabled_features(&features)
    .build();

  let device = unsafe { instance.create_device(phys_device, &device_create_info, None)? };
  trace!("Logical device created");

  let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
  let present_queue = unsafe { device.get_device_queue(present_family, 0) };
  Ok((device, graphics_queue, present_queue))
}
