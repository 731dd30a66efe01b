use log::trace;
use std::io::Cursor;
use std::path::Path;

use ash::vk;

use super::VkOwned;
use crate::error::{VkQuadError, VkQuadResult};

// https://github.com/zeux/niagara/blob/master/src/shaders.cpp

/// Whole file as bytes. Shaders are compiled offline, see `shaders/`.
pub fn read_shader_bytes(path: &Path) -> VkQuadResult<Vec<u8>> {
  trace!("Loading shader from {}", path.to_string_lossy());
  std::fs::read(path).map_err(|err| VkQuadError::io(path, err))
}

/// Realigns bytes to u32 words. Length has to be a multiple of 4.
pub fn parse_spirv(path: &Path, bytes: &[u8]) -> VkQuadResult<Vec<u32>> {
  ash::util::read_spv(&mut Cursor::new(bytes)).map_err(|err| VkQuadError::io(path, err))
}

pub fn create_shader_module(
  device: &ash::Device,
  path: &Path,
) -> VkQuadResult<VkOwned<vk::ShaderModule>> {
  let bytes = read_shader_bytes(path)?;
  let spirv_code = parse_spirv(path, &bytes)?;
  let create_info = vk::ShaderModuleCreateInfo::builder()
    .code(&spirv_code)
    .build();

  let shader_module = unsafe { device.create_shader_module(&create_info, None)? };
  Ok(VkOwned::new(device, shader_module))
}

pub fn create_shader_stage(
  stage: vk::ShaderStageFlags,
  module: vk::ShaderModule,
) -> vk::PipelineShaderStageCreateInfo {
  let shader_fn_name = unsafe { std::ffi::CStr::from_bytes_with_nul_unchecked(b"main\0") };

  vk::PipelineShaderStageCreateInfo::builder()
    .stage(stage)
    .module(module)
    .name(shader_fn_name)
    .build()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_spirv_words() {
    // magic number + one more word, little endian
    let bytes: Vec<u8> = vec![0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00];
    let words = parse_spirv(Path::new("test.spv"), &bytes).unwrap();
    assert_eq!(words, vec![0x0723_0203, 0x0001_0000]);
  }

  #[test]
  fn rejects_truncated_spirv() {
    let bytes: Vec<u8> = vec![0x03, 0x02, 0x23];
    let err = parse_spirv(Path::new("broken.spv"), &bytes).unwrap_err();
    assert!(err.to_string().contains("broken.spv"));
  }

  #[test]
  fn missing_shader_file_is_io_error() {
    let err = read_shader_bytes(Path::new("./does/not/exist.spv")).unwrap_err();
    match err {
      VkQuadError::Io { path, .. } => assert_eq!(path, Path::new("./does/not/exist.spv")),
      other => panic!("Unexpected error {:?}", other),
    }
  }
}
