//! Platform services implementation.

use glpipe_demos::PlatformServices;
use std::path::PathBuf;

/// Desktop implementation of the [`PlatformServices`] API.
///
/// Shader files are looked up in a directory of the local file system.
#[derive(Debug)]
pub struct DesktopPlatformServices {
  shaders: PathBuf,
}

impl DesktopPlatformServices {
  pub fn new(shaders: PathBuf) -> Self {
    if !shaders.is_dir() {
      log::warn!(
        "shader directory {} does not exist, demos loading files will fail",
        shaders.display()
      );
    }

    Self { shaders }
  }
}

impl PlatformServices for DesktopPlatformServices {
  fn shader_path(&self, name: &str) -> PathBuf {
    self.shaders.join(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::Path;

  #[test]
  fn shader_path_is_relative_to_the_root() {
    let services = DesktopPlatformServices::new(PathBuf::from("assets/shaders"));

    assert_eq!(
      services.shader_path("simple.vert"),
      Path::new("assets/shaders/simple.vert")
    );
  }
}
