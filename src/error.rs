use std::path::PathBuf;

use ash::vk;
use thiserror::Error;

/// Everything that can stop the app. None of these is ever retried,
/// swapchain staleness is handled by rebuilding and never ends up here.
#[derive(Error, Debug)]
pub enum VkQuadError {
  #[error("Vulkan error: {0}")]
  Vulkan(#[from] vk::Result),

  #[error("Failed to load Vulkan: {0}")]
  Loading(#[from] ash::LoadingError),

  #[error("Failed to create window: {0}")]
  Window(#[from] winit::error::OsError),

  #[error("Name contains a nul byte: {0}")]
  InvalidName(#[from] std::ffi::NulError),

  #[error("No physical device satisfies the adapter requirements")]
  NoSuitableAdapter,

  #[error("Required instance layer '{0}' is not available")]
  MissingLayer(String),

  #[error("Failed to read '{path}': {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("Failed to decode texture '{path}': {source}")]
  TextureDecode {
    path: PathBuf,
    source: jpeg_decoder::Error,
  },

  #[error("Texture '{path}' has unsupported pixel format {format:?}")]
  UnsupportedPixelFormat {
    path: PathBuf,
    format: jpeg_decoder::PixelFormat,
  },

  #[error("Swapchain resources were requested before they were created")]
  PresentationNotReady,
}

pub type VkQuadResult<T> = std::result::Result<T, VkQuadError>;

impl VkQuadError {
  pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
    VkQuadError::Io {
      path: path.to_path_buf(),
      source,
    }
  }
}

/// GPU allocations are freed by hand. When a later setup step fails, whatever was
/// already allocated has to be given back before the error travels further up,
/// the allocator refuses to be destroyed with live allocations.
pub trait ReleaseOnErr<T, E> {
  fn release_on_err(self, release: impl FnOnce()) -> Result<T, E>;
}

impl<T, E> ReleaseOnErr<T, E> for Result<T, E> {
  fn release_on_err(self, release: impl FnOnce()) -> Result<T, E> {
    if self.is_err() {
      release();
    }
    self
  }
}
