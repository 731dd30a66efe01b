use std::path::PathBuf;

use ash::vk;
use glam::{vec3, Vec3};

/// Device-level requirements handed to `VkCtx` on creation.
pub struct DeviceConfig {
  /// Validation layer + debug messenger. Also disables MAILBOX present mode.
  pub enable_diagnostics: bool,
  /// Device extensions every candidate adapter must support
  pub required_extensions: Vec<String>,
  /// Instance layers that have to be reported by the loader
  pub required_layers: Vec<String>,
}

impl DeviceConfig {
  pub const VALIDATION_LAYER: &'static str = "VK_LAYER_KHRONOS_validation";

  pub fn new(enable_diagnostics: bool) -> DeviceConfig {
    let swapchain_ext = ash::extensions::khr::Swapchain::name();
    let mut required_layers = Vec::new();
    if enable_diagnostics {
      required_layers.push(Self::VALIDATION_LAYER.to_string());
    }

    DeviceConfig {
      enable_diagnostics,
      required_extensions: vec![swapchain_ext.to_string_lossy().to_string()],
      required_layers,
    }
  }
}

impl Default for DeviceConfig {
  fn default() -> Self {
    DeviceConfig::new(cfg!(debug_assertions))
  }
}

pub struct CameraConfig {
  pub position: Vec3,
  pub target: Vec3,
  pub up: Vec3,
  pub fov_dgr: f32,
  pub z_near: f32,
  pub z_far: f32,
}

impl Default for CameraConfig {
  fn default() -> Self {
    Self {
      position: vec3(2.0, 2.0, 2.0),
      target: Vec3::ZERO,
      up: Vec3::Z,
      fov_dgr: 20.0,
      z_near: 0.1,
      z_far: 10.0,
    }
  }
}

pub struct Config {
  // window
  pub window_title: String,
  pub window_width: f64,
  pub window_height: f64,
  /// how often to refresh fps in the window title (seconds)
  pub fps_refresh_period: f32,
  // assets
  pub vertex_shader_path: PathBuf,
  pub fragment_shader_path: PathBuf,
  pub texture_path: PathBuf,
  // rendering
  pub clear_color: Vec3,
  pub frames_in_flight: usize,
  /// degrees per second
  pub model_rotation_speed: f32,
  pub camera: CameraConfig,
  pub device: DeviceConfig,
}

impl Config {
  pub const FRAMES_IN_FLIGHT: usize = 2;

  pub fn new() -> Config {
    Config {
      // window
      window_title: "Vulkan".to_string(),
      window_width: 800f64,
      window_height: 600f64,
      fps_refresh_period: 0.3,
      // assets
      vertex_shader_path: PathBuf::from("./shaders/quad.vert.spv"),
      fragment_shader_path: PathBuf::from("./shaders/quad.frag.spv"),
      texture_path: PathBuf::from("./assets/texture.jpg"),
      // rendering
      clear_color: Vec3::ZERO,
      frames_in_flight: Self::FRAMES_IN_FLIGHT,
      model_rotation_speed: 90.0,
      camera: CameraConfig::default(),
      device: DeviceConfig::default(),
    }
  }

  pub fn clear_color(&self) -> vk::ClearValue {
    let cc = self.clear_color;
    vk::ClearValue {
      color: vk::ClearColorValue {
        float32: [cc[0], cc[1], cc[2], 1f32],
      },
    }
  }

  pub fn window_title_with_fps(&self, fps: u32) -> String {
    format!("{} - FPS: {}", self.window_title, fps)
  }
}
