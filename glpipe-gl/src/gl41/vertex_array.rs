//! Vertex arrays and draw calls.

use crate::gl41::buffer::Buffer;
use crate::gl41::state::{Bind, GLState};
use crate::gl41::GL41;
use gl::types::*;
use std::cell::RefCell;
use std::mem;
use std::ptr;
use std::rc::Rc;

/// Primitive to assemble vertices into.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Primitive {
  /// Independent triangles.
  Triangles,
  /// Triangle strip.
  TriangleStrip,
  /// Tessellation patches of the given number of vertices.
  Patches(usize),
}

impl Primitive {
  pub(crate) fn to_glenum(self) -> GLenum {
    match self {
      Primitive::Triangles => gl::TRIANGLES,
      Primitive::TriangleStrip => gl::TRIANGLE_STRIP,
      Primitive::Patches(_) => gl::PATCHES,
    }
  }
}

/// A float vertex attribute.
///
/// Attributes are interleaved in the order they are declared.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VertexAttrib {
  /// Attribute location in the vertex shader.
  pub index: u32,
  /// Number of float components (1 to 4).
  pub components: usize,
}

impl VertexAttrib {
  /// Attribute at `index` with `components` floats.
  pub const fn new(index: u32, components: usize) -> Self {
    VertexAttrib { index, components }
  }
}

/// OpenGL vertex array object.
#[derive(Debug)]
pub struct VertexArray {
  handle: GLuint,
  vertex_nb: usize,
  index_nb: Option<usize>,
  state: Rc<RefCell<GLState>>,
}

impl VertexArray {
  /// Number of vertices.
  pub fn vertex_nb(&self) -> usize {
    self.vertex_nb
  }

  /// Number of indices, if the vertex array is indexed.
  pub fn index_nb(&self) -> Option<usize> {
    self.index_nb
  }
}

impl Drop for VertexArray {
  fn drop(&mut self) {
    unsafe {
      self.state.borrow_mut().unbind_vertex_array(self.handle);
      gl::DeleteVertexArrays(1, &self.handle);
    }
  }
}

impl GL41 {
  /// Create a vertex array reading interleaved `attribs` from `vertices`, optionally indexed.
  pub fn new_vertex_array(
    &mut self,
    vertices: &Buffer<f32>,
    attribs: &[VertexAttrib],
    indices: Option<&Buffer<u32>>,
  ) -> VertexArray {
    let stride = attribs.iter().map(|a| a.components).sum::<usize>();
    let vertex_nb = if stride == 0 {
      0
    } else {
      vertices.len() / stride
    };

    unsafe {
      let mut handle: GLuint = 0;
      gl::GenVertexArrays(1, &mut handle);

      let mut state = self.state.borrow_mut();
      state.bind_vertex_array(handle, Bind::Forced);
      state.bind_array_buffer(vertices.handle(), Bind::Forced);

      let mut offset = 0;
      for attrib in attribs {
        gl::EnableVertexAttribArray(attrib.index);
        gl::VertexAttribPointer(
          attrib.index,
          attrib.components as GLint,
          gl::FLOAT,
          gl::FALSE,
          (stride * mem::size_of::<f32>()) as GLsizei,
          (offset * mem::size_of::<f32>()) as *const _,
        );
        offset += attrib.components;
      }

      if let Some(indices) = indices {
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, indices.handle());
      }

      state.bind_vertex_array(0, Bind::Cached);

      VertexArray {
        handle,
        vertex_nb,
        index_nb: indices.map(Buffer::len),
        state: self.state.clone(),
      }
    }
  }

  /// Draw a whole vertex array.
  ///
  /// Indexed vertex arrays go through the element array.
  pub fn draw(&mut self, vertex_array: &VertexArray, primitive: Primitive) {
    unsafe {
      let mut state = self.state.borrow_mut();
      state.bind_vertex_array(vertex_array.handle, Bind::Cached);

      if let Primitive::Patches(nb) = primitive {
        state.set_patch_vertex_nb(nb);
      }

      match vertex_array.index_nb {
        Some(index_nb) => gl::DrawElements(
          primitive.to_glenum(),
          index_nb as GLsizei,
          gl::UNSIGNED_INT,
          ptr::null(),
        ),

        None => gl::DrawArrays(primitive.to_glenum(), 0, vertex_array.vertex_nb as GLsizei),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn patches_share_one_mode() {
    assert_eq!(Primitive::Patches(3).to_glenum(), gl::PATCHES);
    assert_eq!(Primitive::Patches(4).to_glenum(), gl::PATCHES);
    assert_eq!(Primitive::TriangleStrip.to_glenum(), gl::TRIANGLE_STRIP);
  }
}
