//! OpenGL 4.1 backend.
//!
//! This module implements an OpenGL 4.1 backend for glpipe. The backend type is [`GL41`]. Besides
//! the shader and pipeline backend traits, it exposes the handful of GL facilities the rest of a
//! small renderer needs: buffers, vertex arrays, uniforms, a cached render state and error checks.

mod buffer;
mod error;
mod immediate;
mod program_pipeline;
mod shader;
mod state;
mod uniform;
mod vertex_array;

pub use self::buffer::{Buffer, BufferError, BufferKind};
pub use self::error::{GlError, GlErrorKind};
pub use self::immediate::{Immediate, ImmediateModeError};
pub use self::state::{GLState, PolygonMode, StateQueryError};
pub use self::uniform::{Uniform, UniformBlock, Uniformable};
pub use self::vertex_array::{Primitive, VertexArray, VertexAttrib};

use self::immediate::ImmediateMode;
use self::state::Bind;
use gl::types::*;
use glpipe::pipeline::ProgramPipeline;
use glpipe::shader::Program;
use std::cell::RefCell;
use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::rc::Rc;

/// An OpenGL 4.1 backend.
#[derive(Debug)]
pub struct GL41 {
  pub(crate) state: Rc<RefCell<GLState>>,
  immediate: Option<ImmediateMode>,
}

impl GL41 {
  /// Create a new OpenGL 4.1 backend over the current context.
  ///
  /// The GL entry points must already be loaded. Immediate mode is not available on a backend
  /// created this way; see [`GL41::load_with`].
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GL41 {
      state: Rc::new(RefCell::new(state)),
      immediate: None,
    })
  }

  /// Load the GL entry points with `loader` and create the backend.
  ///
  /// `loader` is typically the proc-address function of the windowing library.
  pub fn load_with<F>(mut loader: F) -> Result<Self, StateQueryError>
  where
    F: FnMut(&'static str) -> *const c_void,
  {
    gl::load_with(&mut loader);

    let mut gl41 = Self::new()?;
    gl41.immediate = ImmediateMode::load_with(&mut loader);

    Ok(gl41)
  }

  /// Vendor, renderer and version strings of the context.
  pub fn info(&self) -> GLInfo {
    unsafe {
      GLInfo {
        vendor: get_string(gl::VENDOR),
        renderer: get_string(gl::RENDERER),
        version: get_string(gl::VERSION),
        glsl_version: get_string(gl::SHADING_LANGUAGE_VERSION),
      }
    }
  }

  /// Drain the GL error flags.
  ///
  /// Every raised flag is logged at warning level along with `context`; the first one is
  /// returned.
  pub fn check_error(&mut self, context: &str) -> Result<(), GlError> {
    unsafe { error::check_error(context) }
  }

  /// Whether the context exposes the extension `name`.
  pub fn has_extension(&mut self, name: &str) -> bool {
    let supported = unsafe {
      let mut nb: GLint = 0;
      gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut nb);

      (0..nb.max(0) as GLuint).any(|i| {
        let ext = gl::GetStringi(gl::EXTENSIONS, i);
        !ext.is_null() && CStr::from_ptr(ext as *const c_char).to_bytes() == name.as_bytes()
      })
    };

    if supported {
      log::info!("{} is supported", name);
    } else {
      log::warn!("{} is not supported", name);
    }

    supported
  }

  /// Set the viewport.
  pub fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
    unsafe {
      self
        .state
        .borrow_mut()
        .set_viewport([x, y, width as GLint, height as GLint])
    }
  }

  /// Set the color used to clear the color buffer.
  pub fn set_clear_color(&mut self, color: [f32; 4]) {
    unsafe { self.state.borrow_mut().set_clear_color(color) }
  }

  /// Enable or disable the depth test.
  pub fn set_depth_test(&mut self, enabled: bool) {
    unsafe { self.state.borrow_mut().set_depth_test(enabled) }
  }

  /// Set how polygons are rasterized.
  pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
    unsafe { self.state.borrow_mut().set_polygon_mode(mode) }
  }

  /// Clear the color buffer, and the depth buffer if `depth` is set.
  pub fn clear(&mut self, depth: bool) {
    let mut mask = gl::COLOR_BUFFER_BIT;

    if depth {
      mask |= gl::DEPTH_BUFFER_BIT;
    }

    unsafe { gl::Clear(mask) }
  }

  /// Make `program` the current program.
  pub fn use_program(&mut self, program: &Program<Self>) {
    unsafe {
      self
        .state
        .borrow_mut()
        .use_program(program.repr().handle())
    }
  }

  /// Render with the stage programs of `pipeline`.
  ///
  /// The current program, if any, is unset, as it would take precedence over the pipeline.
  pub fn use_pipeline(&mut self, pipeline: &ProgramPipeline<Self>) {
    unsafe {
      let mut state = self.state.borrow_mut();
      state.use_program(0);
      state.bind_pipeline(pipeline.repr().handle(), Bind::Cached);
    }
  }
}

/// Strings describing the OpenGL implementation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GLInfo {
  /// `GL_VENDOR`.
  pub vendor: String,
  /// `GL_RENDERER`.
  pub renderer: String,
  /// `GL_VERSION`.
  pub version: String,
  /// `GL_SHADING_LANGUAGE_VERSION`.
  pub glsl_version: String,
}

impl GLInfo {
  /// Log every string at info level.
  pub fn log(&self) {
    log::info!("OpenGL vendor: {}", self.vendor);
    log::info!("OpenGL renderer: {}", self.renderer);
    log::info!("OpenGL version: {}", self.version);
    log::info!("GLSL version: {}", self.glsl_version);
  }
}

unsafe fn get_string(name: GLenum) -> String {
  let ptr = gl::GetString(name);

  if ptr.is_null() {
    String::new()
  } else {
    CStr::from_ptr(ptr as *const c_char)
      .to_string_lossy()
      .into_owned()
  }
}
