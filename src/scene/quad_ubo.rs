use bytemuck;
use glam::{Mat4, Vec3};

use super::Camera;

/// Must match `QuadUBO` in `quad.vert.glsl` (std140).
#[derive(Copy, Clone, Debug)]
#[repr(C)]
pub struct QuadUBO {
  pub model: Mat4,
  pub view: Mat4,
  pub projection: Mat4,
  /// seconds since start
  pub time: f32,
  pub _padding: [f32; 3],
}
unsafe impl bytemuck::Zeroable for QuadUBO {}
unsafe impl bytemuck::Pod for QuadUBO {}

impl QuadUBO {
  pub fn new(camera: &Camera, time: f32, rotation_speed_dgr: f32) -> QuadUBO {
    QuadUBO {
      model: model_matrix(time, rotation_speed_dgr),
      view: *camera.view_matrix(),
      projection: *camera.perspective_matrix(),
      time,
      _padding: [0.0; 3],
    }
  }

  pub fn as_bytes(&self) -> &[u8] {
    bytemuck::bytes_of(self)
  }
}

/// Spin around Z (camera's up)
pub fn model_matrix(time: f32, rotation_speed_dgr: f32) -> Mat4 {
  Mat4::from_axis_angle(Vec3::Z, (time * rotation_speed_dgr).to_radians())
}
