//! OpenGL buffer implementation.

use crate::gl41::state::{Bind, GLState};
use crate::gl41::GL41;
use gl::types::*;
use std::cell::RefCell;
use std::error;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::os::raw::c_void;
use std::ptr;
use std::rc::Rc;

/// What a buffer is used for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferKind {
  /// Vertex attributes.
  Vertex,
  /// Element indices.
  Index,
  /// Uniform block storage.
  Uniform,
}

impl BufferKind {
  fn usage(self) -> GLenum {
    match self {
      BufferKind::Vertex | BufferKind::Index => gl::STATIC_DRAW,
      BufferKind::Uniform => gl::DYNAMIC_DRAW,
    }
  }
}

/// Error that can occur when writing to a buffer.
#[derive(Debug, Eq, PartialEq)]
pub enum BufferError {
  /// The write would go past the end of the buffer.
  Overflow {
    /// Requested offset, in elements.
    offset: usize,
    /// Number of elements to write.
    len: usize,
    /// Buffer length, in elements.
    capacity: usize,
  },
}

impl fmt::Display for BufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      BufferError::Overflow {
        offset,
        len,
        capacity,
      } => write!(
        f,
        "buffer overflow: writing {} elements at {} in a buffer of {}",
        len, offset, capacity
      ),
    }
  }
}

impl error::Error for BufferError {}

/// OpenGL buffer of `T` elements.
///
/// The buffer object is deleted when dropped.
#[derive(Debug)]
pub struct Buffer<T> {
  handle: GLuint,
  kind: BufferKind,
  len: usize,
  state: Rc<RefCell<GLState>>,
  _t: PhantomData<T>,
}

impl<T> Buffer<T>
where
  T: Copy,
{
  unsafe fn alloc(gl41: &mut GL41, kind: BufferKind, len: usize, data: *const c_void) -> Self {
    let mut handle: GLuint = 0;
    gl::GenBuffers(1, &mut handle);

    let buffer = Buffer {
      handle,
      kind,
      len,
      state: gl41.state.clone(),
      _t: PhantomData,
    };

    let target = buffer.bind();
    gl::BufferData(
      target,
      (mem::size_of::<T>() * len) as GLsizeiptr,
      data,
      kind.usage(),
    );

    buffer
  }

  // Bind the buffer to the target matching its kind and return that target.
  unsafe fn bind(&self) -> GLenum {
    let mut state = self.state.borrow_mut();

    match self.kind {
      BufferKind::Vertex => {
        state.bind_array_buffer(self.handle, Bind::Cached);
        gl::ARRAY_BUFFER
      }

      BufferKind::Index => {
        // the element array binding belongs to the bound vertex array
        state.bind_vertex_array(0, Bind::Cached);
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, self.handle);
        gl::ELEMENT_ARRAY_BUFFER
      }

      BufferKind::Uniform => {
        gl::BindBuffer(gl::UNIFORM_BUFFER, self.handle);
        gl::UNIFORM_BUFFER
      }
    }
  }

  /// Number of elements.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Whether the buffer has no element.
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Kind of the buffer.
  pub fn kind(&self) -> BufferKind {
    self.kind
  }

  /// Overwrite `values.len()` elements starting at `offset`.
  pub fn write(&mut self, offset: usize, values: &[T]) -> Result<(), BufferError> {
    if overflows(offset, values.len(), self.len) {
      return Err(BufferError::Overflow {
        offset,
        len: values.len(),
        capacity: self.len,
      });
    }

    unsafe {
      let target = self.bind();
      gl::BufferSubData(
        target,
        (mem::size_of::<T>() * offset) as GLintptr,
        (mem::size_of::<T>() * values.len()) as GLsizeiptr,
        values.as_ptr() as *const c_void,
      );
    }

    Ok(())
  }

  /// Bind the buffer to an indexed uniform buffer binding point.
  pub fn bind_base(&self, binding: u32) {
    unsafe { gl::BindBufferBase(gl::UNIFORM_BUFFER, binding, self.handle) }
  }

  pub(crate) fn handle(&self) -> GLuint {
    self.handle
  }
}

// Whether writing `len` elements at `offset` goes past `capacity`.
fn overflows(offset: usize, len: usize, capacity: usize) -> bool {
  offset
    .checked_add(len)
    .map_or(true, |end| end > capacity)
}

impl<T> Drop for Buffer<T> {
  fn drop(&mut self) {
    unsafe {
      self.state.borrow_mut().unbind_buffer(self.handle);
      gl::DeleteBuffers(1, &self.handle);
    }
  }
}

impl GL41 {
  /// Create a buffer initialized with `data`.
  pub fn new_buffer<T>(&mut self, kind: BufferKind, data: &[T]) -> Buffer<T>
  where
    T: Copy,
  {
    unsafe { Buffer::alloc(self, kind, data.len(), data.as_ptr() as *const c_void) }
  }

  /// Create a buffer of `len` elements with unspecified content.
  pub fn new_buffer_uninit<T>(&mut self, kind: BufferKind, len: usize) -> Buffer<T>
  where
    T: Copy,
  {
    unsafe { Buffer::alloc(self, kind, len, ptr::null()) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn write_bounds() {
    assert!(!overflows(0, 4, 4));
    assert!(!overflows(3, 1, 4));
    assert!(!overflows(4, 0, 4));
    assert!(overflows(3, 2, 4));
    assert!(overflows(usize::MAX, 1, 4));
    assert!(overflows(1, usize::MAX, 4));
  }

  #[test]
  fn overflow_display() {
    let e = BufferError::Overflow {
      offset: 2,
      len: 3,
      capacity: 4,
    };

    assert_eq!(
      e.to_string(),
      "buffer overflow: writing 3 elements at 2 in a buffer of 4"
    );
  }
}
