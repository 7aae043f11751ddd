//! Graphics state.

use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// Cached value.
///
/// A cached value is used to prevent issuing costy GPU commands if we know the target value is
/// already set to what the command tries to set.
#[derive(Debug)]
struct Cached<T>(Option<T>)
where
  T: PartialEq;

impl<T> Cached<T>
where
  T: PartialEq,
{
  fn new(initial: T) -> Self {
    Cached(Some(initial))
  }

  fn set(&mut self, value: T) {
    self.0 = Some(value);
  }

  /// A non-cached value is always invalid. A cached one is invalid if it differs from `new_val`.
  fn is_invalid(&self, new_val: &T) -> bool {
    match &self.0 {
      Some(ref t) => t != new_val,
      _ => true,
    }
  }
}

/// Rasterization mode of polygons.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PolygonMode {
  /// Filled polygons.
  Fill,
  /// Only the edges (wireframe).
  Line,
}

impl PolygonMode {
  fn to_glenum(self) -> GLenum {
    match self {
      PolygonMode::Fill => gl::FILL,
      PolygonMode::Line => gl::LINE,
    }
  }
}

/// The graphics state.
///
/// This type represents the current state of a given graphics context. It adds a small cache
/// layer over the GL calls to prevent from issuing the same call (with the same parameters).
#[derive(Debug)]
pub struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // viewport
  viewport: Cached<[GLint; 4]>,

  // clear buffers
  clear_color: Cached<[GLfloat; 4]>,

  // depth test
  depth_test: Cached<bool>,

  // rasterization
  polygon_mode: Cached<PolygonMode>,

  // patch primitive vertex number
  patch_vertex_nb: Cached<usize>,

  // array buffer
  bound_array_buffer: GLuint,

  // vertex array
  bound_vertex_array: GLuint,

  // shader program
  current_program: GLuint,

  // program pipeline
  bound_pipeline: GLuint,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          inner.take();
          Self::get_from_context()
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  fn get_from_context() -> Result<Self, StateQueryError> {
    unsafe {
      let viewport = Cached::new(get_ctx_viewport());
      let clear_color = Cached::new(get_ctx_clear_color());
      let depth_test = Cached::new(get_ctx_depth_test()?);
      let polygon_mode = Cached::new(PolygonMode::Fill);
      let patch_vertex_nb = Cached::new(get_ctx_integer(gl::PATCH_VERTICES) as usize);
      let bound_array_buffer = get_ctx_integer(gl::ARRAY_BUFFER_BINDING) as GLuint;
      let bound_vertex_array = get_ctx_integer(gl::VERTEX_ARRAY_BINDING) as GLuint;
      let current_program = get_ctx_integer(gl::CURRENT_PROGRAM) as GLuint;
      let bound_pipeline = get_ctx_integer(gl::PROGRAM_PIPELINE_BINDING) as GLuint;

      Ok(GLState {
        _a: PhantomData,
        viewport,
        clear_color,
        depth_test,
        polygon_mode,
        patch_vertex_nb,
        bound_array_buffer,
        bound_vertex_array,
        current_program,
        bound_pipeline,
      })
    }
  }

  pub(crate) unsafe fn set_viewport(&mut self, viewport: [GLint; 4]) {
    if self.viewport.is_invalid(&viewport) {
      gl::Viewport(viewport[0], viewport[1], viewport[2], viewport[3]);
      self.viewport.set(viewport);
    }
  }

  pub(crate) unsafe fn set_clear_color(&mut self, clear_color: [GLfloat; 4]) {
    if self.clear_color.is_invalid(&clear_color) {
      gl::ClearColor(
        clear_color[0],
        clear_color[1],
        clear_color[2],
        clear_color[3],
      );
      self.clear_color.set(clear_color);
    }
  }

  pub(crate) unsafe fn set_depth_test(&mut self, depth_test: bool) {
    if self.depth_test.is_invalid(&depth_test) {
      if depth_test {
        gl::Enable(gl::DEPTH_TEST);
      } else {
        gl::Disable(gl::DEPTH_TEST);
      }

      self.depth_test.set(depth_test);
    }
  }

  pub(crate) unsafe fn set_polygon_mode(&mut self, mode: PolygonMode) {
    if self.polygon_mode.is_invalid(&mode) {
      gl::PolygonMode(gl::FRONT_AND_BACK, mode.to_glenum());
      self.polygon_mode.set(mode);
    }
  }

  pub(crate) unsafe fn set_patch_vertex_nb(&mut self, nb: usize) {
    if self.patch_vertex_nb.is_invalid(&nb) {
      gl::PatchParameteri(gl::PATCH_VERTICES, nb as GLint);
      self.patch_vertex_nb.set(nb);
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_array_buffer != handle {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
      self.bound_array_buffer = handle;
    }
  }

  pub(crate) unsafe fn unbind_buffer(&mut self, handle: GLuint) {
    if self.bound_array_buffer == handle {
      self.bind_array_buffer(0, Bind::Cached);
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_vertex_array != handle {
      gl::BindVertexArray(handle);
      self.bound_vertex_array = handle;
    }
  }

  pub(crate) unsafe fn unbind_vertex_array(&mut self, handle: GLuint) {
    if self.bound_vertex_array == handle {
      self.bind_vertex_array(0, Bind::Cached);
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.current_program != handle {
      gl::UseProgram(handle);
      self.current_program = handle;
    }
  }

  pub(crate) unsafe fn unuse_program(&mut self, handle: GLuint) {
    if self.current_program == handle {
      self.use_program(0);
    }
  }

  pub(crate) fn bound_pipeline(&self) -> GLuint {
    self.bound_pipeline
  }

  pub(crate) unsafe fn bind_pipeline(&mut self, handle: GLuint, bind: Bind) {
    if bind == Bind::Forced || self.bound_pipeline != handle {
      gl::BindProgramPipeline(handle);
      self.bound_pipeline = handle;
    }
  }

  pub(crate) unsafe fn unbind_pipeline(&mut self, handle: GLuint) {
    if self.bound_pipeline == handle {
      self.bind_pipeline(0, Bind::Cached);
    }
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The [`GLState`] object is unavailable.
  ///
  /// That might occur if the current thread doesn’t support allocating a new graphics state. It
  /// might happen if you try to have more than one state on the same thread, for instance.
  UnavailableGLState,
  /// Corrupted depth test state.
  UnknownDepthTestState(GLboolean),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownDepthTestState(ref s) => write!(f, "unknown depth test state: {}", s),
    }
  }
}

impl error::Error for StateQueryError {}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

unsafe fn get_ctx_viewport() -> [GLint; 4] {
  let mut data = [0; 4];
  gl::GetIntegerv(gl::VIEWPORT, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_clear_color() -> [GLfloat; 4] {
  let mut data = [0.; 4];
  gl::GetFloatv(gl::COLOR_CLEAR_VALUE, data.as_mut_ptr());
  data
}

unsafe fn get_ctx_depth_test() -> Result<bool, StateQueryError> {
  let state = gl::IsEnabled(gl::DEPTH_TEST);

  match state {
    gl::TRUE => Ok(true),
    gl::FALSE => Ok(false),
    _ => Err(StateQueryError::UnknownDepthTestState(state)),
  }
}

unsafe fn get_ctx_integer(pname: GLenum) -> GLint {
  let mut data = 0;
  gl::GetIntegerv(pname, &mut data);
  data
}
