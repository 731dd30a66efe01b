mod frame_orchestrator;
mod presentation;
mod resize_signal;
mod vk_frame_backend;

pub use self::frame_orchestrator::*;
pub use self::presentation::*;
pub use self::resize_signal::*;
pub use self::vk_frame_backend::*;
