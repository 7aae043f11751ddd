//! Compatibility-profile immediate mode.
//!
//! The `gl` crate only generates core-profile bindings, so `glBegin` and friends are loaded here
//! through the same proc-address loader as the rest of the API. They are only usable on a
//! compatibility-profile context.

use crate::gl41::state::Bind;
use crate::gl41::vertex_array::Primitive;
use crate::gl41::GL41;
use gl::types::*;
use std::error;
use std::fmt;
use std::mem;
use std::os::raw::c_void;

type BeginFn = unsafe extern "system" fn(GLenum);
type EndFn = unsafe extern "system" fn();
type Color4fFn = unsafe extern "system" fn(GLfloat, GLfloat, GLfloat, GLfloat);
type Vertex3fFn = unsafe extern "system" fn(GLfloat, GLfloat, GLfloat);

/// Immediate-mode entry points.
#[derive(Clone, Copy)]
pub(crate) struct ImmediateMode {
  begin: BeginFn,
  end: EndFn,
  color4f: Color4fFn,
  vertex3f: Vertex3fFn,
}

impl fmt::Debug for ImmediateMode {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("ImmediateMode")
  }
}

impl ImmediateMode {
  /// Load the entry points, or `None` if any of them is missing.
  pub(crate) fn load_with<F>(loader: &mut F) -> Option<Self>
  where
    F: FnMut(&'static str) -> *const c_void,
  {
    let begin = non_null(loader("glBegin"))?;
    let end = non_null(loader("glEnd"))?;
    let color4f = non_null(loader("glColor4f"))?;
    let vertex3f = non_null(loader("glVertex3f"))?;

    unsafe {
      Some(ImmediateMode {
        begin: mem::transmute::<*const c_void, BeginFn>(begin),
        end: mem::transmute::<*const c_void, EndFn>(end),
        color4f: mem::transmute::<*const c_void, Color4fFn>(color4f),
        vertex3f: mem::transmute::<*const c_void, Vertex3fFn>(vertex3f),
      })
    }
  }
}

fn non_null(ptr: *const c_void) -> Option<*const c_void> {
  if ptr.is_null() {
    None
  } else {
    Some(ptr)
  }
}

/// Error raised when immediate mode cannot be used.
#[derive(Debug, Eq, PartialEq)]
pub enum ImmediateModeError {
  /// The entry points could not be loaded.
  Unavailable,
  /// Patches cannot be drawn in immediate mode.
  UnsupportedPrimitive(Primitive),
}

impl fmt::Display for ImmediateModeError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ImmediateModeError::Unavailable => {
        f.write_str("immediate mode requires a compatibility profile context")
      }
      ImmediateModeError::UnsupportedPrimitive(p) => {
        write!(f, "unsupported immediate mode primitive: {:?}", p)
      }
    }
  }
}

impl error::Error for ImmediateModeError {}

/// Vertex submission between `glBegin` and `glEnd`.
pub struct Immediate<'a> {
  fns: &'a ImmediateMode,
}

impl Immediate<'_> {
  /// Set the current color.
  pub fn color(&mut self, [r, g, b, a]: [f32; 4]) {
    unsafe { (self.fns.color4f)(r, g, b, a) }
  }

  /// Emit a vertex.
  pub fn vertex(&mut self, [x, y, z]: [f32; 3]) {
    unsafe { (self.fns.vertex3f)(x, y, z) }
  }
}

impl GL41 {
  /// Whether immediate mode entry points were found.
  pub fn has_immediate_mode(&self) -> bool {
    self.immediate.is_some()
  }

  /// Submit vertices in immediate mode.
  ///
  /// `submit` runs between `glBegin` and `glEnd`.
  pub fn immediate<F>(&mut self, primitive: Primitive, submit: F) -> Result<(), ImmediateModeError>
  where
    F: FnOnce(&mut Immediate),
  {
    if let Primitive::Patches(_) = primitive {
      return Err(ImmediateModeError::UnsupportedPrimitive(primitive));
    }

    let fns = self.immediate.ok_or(ImmediateModeError::Unavailable)?;

    unsafe {
      self
        .state
        .borrow_mut()
        .bind_vertex_array(0, Bind::Cached);

      (fns.begin)(primitive.to_glenum());
      submit(&mut Immediate { fns: &fns });
      (fns.end)();
    }

    Ok(())
  }
}
