mod camera;
mod per_image_uniforms;
mod quad_ubo;
mod quad_vertex;
mod world;

pub use self::camera::*;
pub use self::per_image_uniforms::*;
pub use self::quad_ubo::*;
pub use self::quad_vertex::*;
pub use self::world::*;
