use glam::Mat4;

use crate::config::CameraConfig;

/// Static camera looking at the origin. Only the aspect ratio changes,
/// and that only when the swapchain is rebuilt.
pub struct Camera {
  view_matrix: Mat4,
  perspective_matrix: Mat4,
}

impl Camera {
  pub fn new(cfg: &CameraConfig, aspect_ratio: f32) -> Camera {
    Camera {
      view_matrix: Mat4::look_at_rh(cfg.position, cfg.target, cfg.up),
      perspective_matrix: Self::calc_perspective_matrix(cfg, aspect_ratio),
    }
  }

  // https://matthewwellings.com/blog/the-new-vulkan-coordinate-system/
  // glam's perspective_rh already maps depth to [0, 1], only Y needs a flip.
  fn calc_perspective_matrix(cfg: &CameraConfig, aspect_ratio: f32) -> Mat4 {
    let mut proj = Mat4::perspective_rh(
      cfg.fov_dgr.to_radians(),
      aspect_ratio,
      cfg.z_near,
      cfg.z_far,
    );
    proj.y_axis.y *= -1.0;
    proj
  }

  pub fn view_matrix(&self) -> &Mat4 {
    &self.view_matrix
  }

  pub fn perspective_matrix(&self) -> &Mat4 {
    &self.perspective_matrix
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::{vec3, Vec4Swizzles};

  #[test]
  fn origin_is_in_front_of_camera() {
    let cfg = CameraConfig::default();
    let camera = Camera::new(&cfg, 800.0 / 600.0);

    let view_pos = *camera.view_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
    // right handed: looking down -Z
    assert!(view_pos.z < 0.0);
    let expected_dist = vec3(2.0, 2.0, 2.0).length();
    assert!((view_pos.xyz().length() - expected_dist).abs() < 1e-4);
  }

  #[test]
  fn projection_flips_y_for_vulkan() {
    let cfg = CameraConfig::default();
    let flipped = Camera::new(&cfg, 1.0);
    let plain = Mat4::perspective_rh(cfg.fov_dgr.to_radians(), 1.0, cfg.z_near, cfg.z_far);

    assert_eq!(flipped.perspective_matrix().y_axis.y, -plain.y_axis.y);
    assert_eq!(flipped.perspective_matrix().x_axis.x, plain.x_axis.x);
  }

  #[test]
  fn wider_window_squeezes_x() {
    let cfg = CameraConfig::default();
    let square = Camera::new(&cfg, 1.0);
    let wide = Camera::new(&cfg, 2.0);
    let ratio = square.perspective_matrix().x_axis.x / wide.perspective_matrix().x_axis.x;
    assert!((ratio - 2.0).abs() < 1e-4);
  }
}
