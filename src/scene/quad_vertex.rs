use ash::vk;
use bytemuck;
use glam::{Vec2, Vec3};

/// Vertex layout of the quad. Must match `quad.vert.glsl`.
#[derive(Copy, Clone, Debug)]
#[repr(C)]
pub struct QuadVertex {
  /// position in the model's XY plane
  pub position: Vec2,
  /// per-vertex tint
  pub color: Vec3,
  /// uv texture coordinates
  pub uv: Vec2,
}
unsafe impl bytemuck::Zeroable for QuadVertex {}
unsafe impl bytemuck::Pod for QuadVertex {}

impl QuadVertex {
  const BINDINGS_DESC: [vk::VertexInputBindingDescription; 1] =
    [vk::VertexInputBindingDescription {
      binding: 0,
      input_rate: vk::VertexInputRate::VERTEX,
      stride: std::mem::size_of::<QuadVertex>() as u32,
    }];

  const ATTRIBUTES_DESC: [vk::VertexInputAttributeDescription; 3] = [
    // position
    vk::VertexInputAttributeDescription {
      binding: 0,
      location: 0,
      format: vk::Format::R32G32_SFLOAT,
      offset: 0,
    },
    // color
    vk::VertexInputAttributeDescription {
      binding: 0,
      location: 1,
      format: vk::Format::R32G32B32_SFLOAT,
      // offsetted by 'position' from beginning of structure
      offset: std::mem::size_of::<Vec2>() as u32,
    },
    // uv
    vk::VertexInputAttributeDescription {
      binding: 0,
      location: 2,
      format: vk::Format::R32G32_SFLOAT,
      // offsetted by 'position' and 'color' from beginning of structure
      offset: (std::mem::size_of::<Vec2>() + std::mem::size_of::<Vec3>()) as u32,
    },
  ];

  pub fn new(pos: (f32, f32), color: (f32, f32, f32), uv: (f32, f32)) -> QuadVertex {
    QuadVertex {
      position: Vec2::new(pos.0, pos.1),
      color: Vec3::new(color.0, color.1, color.2),
      uv: Vec2::new(uv.0, uv.1),
    }
  }

  pub fn get_vertex_description() -> vk::PipelineVertexInputStateCreateInfo {
    vk::PipelineVertexInputStateCreateInfo::builder()
      .vertex_attribute_descriptions(&Self::ATTRIBUTES_DESC)
      .vertex_binding_descriptions(&Self::BINDINGS_DESC)
      .build()
  }
}

/// Unit quad centered at origin, counter-clockwise.
pub fn quad_vertices() -> [QuadVertex; 4] {
  [
    QuadVertex::new((-0.5, -0.5), (1.0, 0.0, 0.0), (1.0, 0.0)),
    QuadVertex::new((0.5, -0.5), (0.0, 1.0, 0.0), (0.0, 0.0)),
    QuadVertex::new((0.5, 0.5), (0.0, 0.0, 1.0), (0.0, 1.0)),
    QuadVertex::new((-0.5, 0.5), (1.0, 1.0, 1.0), (1.0, 1.0)),
  ]
}

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vertex_is_tightly_packed() {
    assert_eq!(std::mem::size_of::<QuadVertex>(), 7 * 4);
    let verts = quad_vertices();
    let bytes: &[u8] = bytemuck::cast_slice(&verts);
    assert_eq!(bytes.len(), 4 * 7 * 4);
  }

  #[test]
  fn attribute_offsets_follow_fields() {
    let v = QuadVertex::new((1.0, 2.0), (3.0, 4.0, 5.0), (6.0, 7.0));
    let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));

    for attr in QuadVertex::ATTRIBUTES_DESC.iter() {
      let first_float = floats[(attr.offset / 4) as usize];
      let expected = match attr.location {
        0 => 1.0,
        1 => 3.0,
        2 => 6.0,
        _ => unreachable!(),
      };
      assert_eq!(first_float, expected);
    }
    assert_eq!(
      QuadVertex::BINDINGS_DESC[0].stride as usize,
      std::mem::size_of::<QuadVertex>()
    );
  }

  #[test]
  fn indices_form_two_ccw_triangles() {
    let verts = quad_vertices();
    for tri in QUAD_INDICES.chunks(3) {
      let a = verts[tri[0] as usize].position;
      let b = verts[tri[1] as usize].position;
      let c = verts[tri[2] as usize].position;
      let signed_area = (b - a).perp_dot(c - a);
      assert!(signed_area > 0.0, "Triangle {:?} is not CCW", tri);
    }
    assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < verts.len()));
  }
}
