mod vk_ctx;
mod vk_ctx_device;
mod vk_ctx_pipelines;
mod vk_ctx_swapchain;
mod vk_ctx_synchronize;

pub use vk_ctx::*;
pub use vk_ctx_device::*;
pub use vk_ctx_pipelines::*;
pub use vk_ctx_swapchain::*;
pub use vk_ctx_synchronize::*;
