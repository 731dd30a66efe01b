use log::trace;

use ash::extensions::khr::Surface;
use ash::vk;

/*
Everything we need to know about (physical device, surface) pair.
Used both when picking the adapter and when (re)creating the swapchain,
so both places agree on what is "supported".
*/

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
  pub graphics: Option<u32>,
  pub present: Option<u32>,
}

impl QueueFamilyIndices {
  pub fn is_complete(&self) -> bool {
    self.graphics.is_some() && self.present.is_some()
  }

  /// `(graphics, present)`, only if both were found
  pub fn pair(&self) -> Option<(u32, u32)> {
    match (self.graphics, self.present) {
      (Some(g), Some(p)) => Some((g, p)),
      _ => None,
    }
  }

  /// Families that need a queue. One entry if graphics and present coincide.
  pub fn unique(&self) -> Vec<u32> {
    let mut result: Vec<u32> = self.graphics.iter().chain(self.present.iter()).copied().collect();
    result.dedup();
    result
  }
}

/// Scan queue families in order. Graphics is the first family with GRAPHICS flag,
/// present is the first non-empty family that can present to the surface.
/// Stops as soon as both are known.
pub fn find_queue_families(
  families: &[vk::QueueFamilyProperties],
  mut can_present: impl FnMut(u32) -> bool,
) -> QueueFamilyIndices {
  let mut indices = QueueFamilyIndices::default();

  for (idx, family) in families.iter().enumerate() {
    let idx = idx as u32;
    if indices.graphics.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
      indices.graphics = Some(idx);
    }
    if indices.present.is_none() && family.queue_count > 0 && can_present(idx) {
      indices.present = Some(idx);
    }
    if indices.is_complete() {
      break;
    }
  }

  indices
}

pub fn query_queue_families(
  instance: &ash::Instance,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
) -> QueueFamilyIndices {
  let families = unsafe { instance.get_physical_device_queue_family_properties(phys_device) };

  find_queue_families(&families, |idx| unsafe {
    surface_loader
      .get_physical_device_surface_support(phys_device, idx, surface_khr)
      // treat query failure as "cannot present from this family"
      .unwrap_or(false)
  })
}

#[derive(Debug, Clone, Default)]
pub struct SwapchainSupportDetails {
  pub capabilities: vk::SurfaceCapabilitiesKHR,
  pub formats: Vec<vk::SurfaceFormatKHR>,
  pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SwapchainSupportDetails {
  pub fn query(
    surface_loader: &Surface,
    surface_khr: vk::SurfaceKHR,
    phys_device: vk::PhysicalDevice,
  ) -> Result<Self, vk::Result> {
    let details = unsafe {
      SwapchainSupportDetails {
        capabilities: surface_loader
          .get_physical_device_surface_capabilities(phys_device, surface_khr)?,
        formats: surface_loader.get_physical_device_surface_formats(phys_device, surface_khr)?,
        present_modes: surface_loader
          .get_physical_device_surface_present_modes(phys_device, surface_khr)?,
      }
    };
    trace!("Surface capabilities {:?}", details.capabilities);
    Ok(details)
  }

  /// Failed surface query means this adapter cannot present, not that the search is over.
  pub fn or_inadequate(queried: Result<Self, vk::Result>) -> Self {
    queried.unwrap_or_default()
  }

  pub fn is_adequate(&self) -> bool {
    !self.formats.is_empty() && !self.present_modes.is_empty()
  }
}

/// What we know about a physical device when deciding whether to use it.
pub struct AdapterCandidate {
  pub device_type: vk::PhysicalDeviceType,
  pub geometry_shader: bool,
  pub sampler_anisotropy: bool,
  pub queue_families: QueueFamilyIndices,
  pub missing_extensions: Vec<String>,
  pub swapchain_support: SwapchainSupportDetails,
}

impl AdapterCandidate {
  pub fn is_suitable(&self) -> bool {
    self.device_type == vk::PhysicalDeviceType::DISCRETE_GPU
      && self.geometry_shader
      && self.sampler_anisotropy
      && self.queue_families.is_complete()
      && self.missing_extensions.is_empty()
      && self.swapchain_support.is_adequate()
  }
}

/// Extensions from `required` that are not in `available`.
pub fn find_missing_extensions(available: &[String], required: &[String]) -> Vec<String> {
  required
    .iter()
    .filter(|req| !available.contains(req))
    .cloned()
    .collect()
}

/// B8G8R8A8_UNORM + SRGB_NONLINEAR if present, first listed format otherwise.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
  let preferred = formats.iter().find(|surface_fmt| {
    let fmt_ok = surface_fmt.format == vk::Format::B8G8R8A8_UNORM;
    let color_space_ok = surface_fmt.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR;
    fmt_ok && color_space_ok
  });

  preferred.or_else(|| formats.first()).copied()
}

/// MAILBOX only with validation off. FIFO is guaranteed by the standard.
pub fn choose_present_mode(
  present_modes: &[vk::PresentModeKHR],
  enable_diagnostics: bool,
) -> vk::PresentModeKHR {
  let has_mailbox = present_modes.contains(&vk::PresentModeKHR::MAILBOX);
  if has_mailbox && !enable_diagnostics {
    vk::PresentModeKHR::MAILBOX
  } else {
    vk::PresentModeKHR::FIFO
  }
}

/// One more than minimum. `max_image_count == 0` means "no limit".
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
  let requested = capabilities.min_image_count + 1;
  let max = capabilities.max_image_count;
  if max > 0 && requested > max {
    max
  } else {
    requested
  }
}

/// `current_extent` is authoritative unless width is the `u32::MAX` sentinel,
/// in which case the window size is clamped into the surface limits.
pub fn choose_extent(
  capabilities: &vk::SurfaceCapabilitiesKHR,
  window_size: vk::Extent2D,
) -> vk::Extent2D {
  if capabilities.current_extent.width != u32::MAX {
    return capabilities.current_extent;
  }

  let min = capabilities.min_image_extent;
  let max = capabilities.max_image_extent;
  vk::Extent2D {
    width: window_size.width.clamp(min.width, max.width),
    height: window_size.height.clamp(min.height, max.height),
  }
}

/// CONCURRENT over both families if they differ. Returned family list is empty for EXCLUSIVE.
pub fn choose_sharing_mode(graphics_family: u32, present_family: u32) -> (vk::SharingMode, Vec<u32>) {
  if graphics_family != present_family {
    (
      vk::SharingMode::CONCURRENT,
      vec![graphics_family, present_family],
    )
  } else {
    (vk::SharingMode::EXCLUSIVE, Vec::new())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn caps(min: u32, max: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
      min_image_count: min,
      max_image_count: max,
      ..Default::default()
    }
  }

  fn extent(width: u32, height: u32) -> vk::Extent2D {
    vk::Extent2D { width, height }
  }

  fn fmt(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
      format,
      color_space,
    }
  }

  fn family(flags: vk::QueueFlags, queue_count: u32) -> vk::QueueFamilyProperties {
    vk::QueueFamilyProperties {
      queue_flags: flags,
      queue_count,
      ..Default::default()
    }
  }

  #[test]
  fn surface_format_prefers_bgra_unorm_srgb() {
    let formats = [
      fmt(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      fmt(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
    assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
  }

  #[test]
  fn surface_format_falls_back_to_first() {
    let formats = [
      fmt(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      // right format, wrong color space
      fmt(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::R8G8B8A8_SRGB);

    assert!(choose_surface_format(&[]).is_none());
  }

  #[test]
  fn present_mode_mailbox_only_without_diagnostics() {
    let with_mailbox = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
    let fifo_only = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];

    assert_eq!(
      choose_present_mode(&with_mailbox, false),
      vk::PresentModeKHR::MAILBOX
    );
    assert_eq!(
      choose_present_mode(&with_mailbox, true),
      vk::PresentModeKHR::FIFO
    );
    assert_eq!(
      choose_present_mode(&fifo_only, false),
      vk::PresentModeKHR::FIFO
    );
  }

  #[test]
  fn image_count_is_min_plus_one_clamped_to_max() {
    // unbounded
    assert_eq!(choose_image_count(&caps(2, 0)), 3);
    // bounded at minimum
    assert_eq!(choose_image_count(&caps(2, 2)), 2);
    // bound not hit
    assert_eq!(choose_image_count(&caps(2, 8)), 3);
  }

  #[test]
  fn extent_uses_current_extent_verbatim() {
    let mut c = caps(2, 0);
    c.current_extent = extent(640, 480);
    c.min_image_extent = extent(1000, 1000);
    c.max_image_extent = extent(4000, 4000);
    assert_eq!(choose_extent(&c, extent(1024, 768)), extent(640, 480));
  }

  #[test]
  fn extent_sentinel_uses_window_size() {
    let mut c = caps(2, 0);
    c.current_extent = extent(u32::MAX, u32::MAX);
    c.min_image_extent = extent(64, 64);
    c.max_image_extent = extent(4096, 4096);
    assert_eq!(choose_extent(&c, extent(1024, 768)), extent(1024, 768));
  }

  #[test]
  fn extent_sentinel_clamps_window_size() {
    let mut c = caps(2, 0);
    c.current_extent = extent(u32::MAX, u32::MAX);
    c.min_image_extent = extent(64, 64);
    c.max_image_extent = extent(4096, 4096);
    assert_eq!(choose_extent(&c, extent(10, 9000)), extent(64, 4096));
  }

  #[test]
  fn renegotiation_at_same_size_is_stable() {
    let mut c = caps(2, 0);
    c.current_extent = extent(u32::MAX, u32::MAX);
    c.min_image_extent = extent(1, 1);
    c.max_image_extent = extent(4096, 4096);
    let formats = [
      fmt(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      fmt(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    let window = extent(800, 600);

    let first = (choose_extent(&c, window), choose_surface_format(&formats));
    let second = (choose_extent(&c, window), choose_surface_format(&formats));
    assert_eq!(first.0, second.0);
    assert_eq!(first.1.unwrap().format, second.1.unwrap().format);
  }

  #[test]
  fn sharing_mode_depends_on_family_split() {
    let (mode, families) = choose_sharing_mode(0, 0);
    assert_eq!(mode, vk::SharingMode::EXCLUSIVE);
    assert!(families.is_empty());

    let (mode, families) = choose_sharing_mode(0, 2);
    assert_eq!(mode, vk::SharingMode::CONCURRENT);
    assert_eq!(families, vec![0, 2]);
  }

  #[test]
  fn queue_families_pick_first_matches_and_stop_early() {
    let families = [
      family(vk::QueueFlags::TRANSFER, 1),
      family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, 4),
      family(vk::QueueFlags::GRAPHICS, 1),
      family(vk::QueueFlags::COMPUTE, 1),
    ];
    let mut asked = Vec::new();
    let indices = find_queue_families(&families, |idx| {
      asked.push(idx);
      idx >= 1
    });

    assert_eq!(indices.graphics, Some(1));
    assert_eq!(indices.present, Some(1));
    assert_eq!(indices.unique(), vec![1]);
    // family 2 and 3 never inspected
    assert_eq!(asked, vec![0, 1]);
  }

  #[test]
  fn queue_families_ignore_empty_present_family() {
    let families = [
      family(vk::QueueFlags::COMPUTE, 0),
      family(vk::QueueFlags::GRAPHICS, 1),
      family(vk::QueueFlags::TRANSFER, 1),
    ];
    let indices = find_queue_families(&families, |idx| idx != 1);

    assert_eq!(indices.graphics, Some(1));
    assert_eq!(indices.present, Some(2));
    assert_eq!(indices.pair(), Some((1, 2)));
    assert_eq!(indices.unique(), vec![1, 2]);
  }

  #[test]
  fn queue_families_incomplete_without_present() {
    let families = [family(vk::QueueFlags::GRAPHICS, 1)];
    let indices = find_queue_families(&families, |_| false);
    assert!(!indices.is_complete());
    assert_eq!(indices.pair(), None);
  }

  fn good_candidate() -> AdapterCandidate {
    AdapterCandidate {
      device_type: vk::PhysicalDeviceType::DISCRETE_GPU,
      geometry_shader: true,
      sampler_anisotropy: true,
      queue_families: QueueFamilyIndices {
        graphics: Some(0),
        present: Some(0),
      },
      missing_extensions: Vec::new(),
      swapchain_support: SwapchainSupportDetails {
        capabilities: caps(2, 0),
        formats: vec![fmt(
          vk::Format::B8G8R8A8_UNORM,
          vk::ColorSpaceKHR::SRGB_NONLINEAR,
        )],
        present_modes: vec![vk::PresentModeKHR::FIFO],
      },
    }
  }

  #[test]
  fn adapter_requires_every_capability() {
    assert!(good_candidate().is_suitable());

    let mut c = good_candidate();
    c.device_type = vk::PhysicalDeviceType::INTEGRATED_GPU;
    assert!(!c.is_suitable());

    let mut c = good_candidate();
    c.geometry_shader = false;
    assert!(!c.is_suitable());

    let mut c = good_candidate();
    c.sampler_anisotropy = false;
    assert!(!c.is_suitable());

    let mut c = good_candidate();
    c.queue_families.present = None;
    assert!(!c.is_suitable());

    let mut c = good_candidate();
    c.missing_extensions = vec!["VK_KHR_swapchain".to_string()];
    assert!(!c.is_suitable());

    let mut c = good_candidate();
    c.swapchain_support.present_modes.clear();
    assert!(!c.is_suitable());
  }

  #[test]
  fn failed_surface_query_rejects_only_that_adapter() {
    let support =
      SwapchainSupportDetails::or_inadequate(Err(vk::Result::ERROR_SURFACE_LOST_KHR));
    assert!(!support.is_adequate());

    let mut c = good_candidate();
    c.swapchain_support = support;
    assert!(!c.is_suitable());

    let queried = good_candidate().swapchain_support;
    let kept = SwapchainSupportDetails::or_inadequate(Ok(queried));
    assert!(kept.is_adequate());
  }

  #[test]
  fn missing_extensions_are_reported() {
    let available = vec!["VK_KHR_swapchain".to_string(), "VK_KHR_maintenance1".to_string()];
    let required = vec!["VK_KHR_swapchain".to_string(), "VK_EXT_foo".to_string()];
    assert_eq!(
      find_missing_extensions(&available, &required),
      vec!["VK_EXT_foo".to_string()]
    );
  }
}
