// mostly inspired by:
// - https://github.com/zeux/niagara/tree/master/src
// - https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L256
mod command_buffers;
pub mod debug;
pub mod device;
mod load_shader;
mod pipeline;
mod render_pass;
mod resources;
mod setup_cmd_buf;
pub mod surface_support;
mod swapchain;
mod synchronization;
mod uniforms;
mod vk_buffer;
mod vk_memory_resource;
mod vk_owned;
mod vk_texture;

pub use self::command_buffers::*;
pub use self::load_shader::*;
pub use self::pipeline::*;
pub use self::render_pass::*;
pub use self::resources::*;
pub use self::setup_cmd_buf::*;
pub use self::swapchain::*;
pub use self::synchronization::*;
pub use self::uniforms::*;
pub use self::vk_buffer::*;
pub use self::vk_memory_resource::*;
pub use self::vk_owned::*;
pub use self::vk_texture::*;
