//! glpipe demos.
//!
//! This project provides a set of demos that can be run on any surface. The demos are made
//! platform-agnostic on purpose: the window system, its events and the way shader files are found
//! are all provided by the platform code running them.
//!
//! # Demo architecture
//!
//! Demos are simple modules exposed from this crate. Whenever a demo requires user interaction,
//! an abstract [`InputAction`] is used, which the platform code derives from its own events. Each
//! demo carries its own command line options as a `structopt` type, so that the runner can expose
//! them as a subcommand.
//!
//! Demos are responsible for allocating their GL resources and implementing the frame loop by
//! using the [`Demo`] trait. Every resource is owned by the demo and released when it is dropped,
//! which the runner does before tearing the surface down.
//!
//! # Error handling
//!
//! Unlike a lot of GL samples, the demos do not panic on build failures. Bootstrapping returns a
//! [`DemoError`], which carries the driver log when a shader did not compile, link or validate.

use glpipe::context::GraphicsContext;
use glpipe::shader::BuildError;
use glpipe_gl::gl41::{BufferError, GlError, ImmediateModeError};
use glpipe_gl::GL41;
use glpipe_windowing::ContextProfile;
use std::error;
use std::fmt;
use std::path::PathBuf;

pub mod compat_triangle;
pub mod cube_full;
pub mod mem_stress;
pub mod red_triangle;
pub mod separate_program;
mod shared;
pub mod tess;

/// Title of the window every demo opens.
pub const WINDOW_TITLE: &str = "GL Test Window";

/// Size of the window every demo opens.
pub const WINDOW_SIZE: [u32; 2] = [800, 600];

/// Demo interface.
pub trait Demo: Sized {
  /// Command line options of the demo.
  type Opts: fmt::Debug;

  /// Context profile the demo needs.
  fn profile(_opts: &Self::Opts) -> ContextProfile {
    ContextProfile::Core
  }

  /// Bootstrap the demo.
  fn bootstrap(
    opts: Self::Opts,
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> Result<Self, DemoError>;

  /// Render a frame of the demo.
  fn render_frame(
    self,
    time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> LoopFeedback<Self>;
}

/// Services the platform provides to the demos.
pub trait PlatformServices {
  /// Path of the shader file `name`.
  fn shader_path(&self, name: &str) -> PathBuf;
}

/// A type used to pass “inputs” to demos.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Main action. Typically used to switch an effect on and off.
  MainToggle,

  /// Framebuffer size changed.
  Resized { width: u32, height: u32 },
}

/// What to do after a frame.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LoopFeedback<T> {
  /// Keep running with the stepped demo.
  Continue(T),
  /// Stop the loop.
  Exit,
}

/// Errors that can make a demo fail to bootstrap.
#[derive(Debug)]
pub enum DemoError {
  /// A shader program or pipeline could not be built.
  Build(BuildError),
  /// OpenGL reported an error.
  Gl(GlError),
  /// Immediate mode drawing is not possible.
  ImmediateMode(ImmediateModeError),
  /// A buffer update went wrong.
  Buffer(BufferError),
}

impl fmt::Display for DemoError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DemoError::Build(ref e) => write!(f, "cannot build shaders: {}", e),
      DemoError::Gl(ref e) => write!(f, "{}", e),
      DemoError::ImmediateMode(ref e) => write!(f, "immediate mode error: {}", e),
      DemoError::Buffer(ref e) => write!(f, "buffer error: {}", e),
    }
  }
}

impl error::Error for DemoError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      DemoError::Build(e) => Some(e),
      DemoError::Gl(e) => Some(e),
      DemoError::ImmediateMode(e) => Some(e),
      DemoError::Buffer(e) => Some(e),
    }
  }
}

impl From<BuildError> for DemoError {
  fn from(e: BuildError) -> Self {
    DemoError::Build(e)
  }
}

impl From<GlError> for DemoError {
  fn from(e: GlError) -> Self {
    DemoError::Gl(e)
  }
}

impl From<ImmediateModeError> for DemoError {
  fn from(e: ImmediateModeError) -> Self {
    DemoError::ImmediateMode(e)
  }
}

impl From<BufferError> for DemoError {
  fn from(e: BufferError) -> Self {
    DemoError::Buffer(e)
  }
}
