//! Uniforms and uniform blocks.
//!
//! Values are written with the program-scoped `glProgramUniform*` calls, so a uniform can be set
//! on any program, including a separable program bound to a pipeline, without making it current.

use crate::gl41::GL41;
use gl::types::*;
use glpipe::shader::Program;
use std::ffi::CString;

/// An active uniform of a program.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Uniform {
  program: GLuint,
  location: GLint,
}

/// An active uniform block of a program.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct UniformBlock {
  program: GLuint,
  index: GLuint,
}

/// Types that can be sent to a uniform.
pub unsafe trait Uniformable {
  /// Write `value` to the uniform at `location` of `program`.
  unsafe fn program_uniform(program: GLuint, location: GLint, value: &Self);
}

unsafe impl Uniformable for f32 {
  unsafe fn program_uniform(program: GLuint, location: GLint, value: &Self) {
    gl::ProgramUniform1f(program, location, *value);
  }
}

unsafe impl Uniformable for [f32; 2] {
  unsafe fn program_uniform(program: GLuint, location: GLint, value: &Self) {
    gl::ProgramUniform2fv(program, location, 1, value.as_ptr());
  }
}

unsafe impl Uniformable for [f32; 3] {
  unsafe fn program_uniform(program: GLuint, location: GLint, value: &Self) {
    gl::ProgramUniform3fv(program, location, 1, value.as_ptr());
  }
}

unsafe impl Uniformable for [f32; 4] {
  unsafe fn program_uniform(program: GLuint, location: GLint, value: &Self) {
    gl::ProgramUniform4fv(program, location, 1, value.as_ptr());
  }
}

unsafe impl Uniformable for [[f32; 4]; 4] {
  unsafe fn program_uniform(program: GLuint, location: GLint, value: &Self) {
    gl::ProgramUniformMatrix4fv(
      program,
      location,
      1,
      gl::FALSE,
      value.as_ptr() as *const GLfloat,
    );
  }
}

impl GL41 {
  /// Look up an active uniform by name.
  ///
  /// Returns `None` if the program has no such active uniform.
  pub fn uniform(&mut self, program: &Program<Self>, name: &str) -> Option<Uniform> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let program = program.repr().handle();
    let location = unsafe { gl::GetUniformLocation(program, c_name.as_ptr() as *const GLchar) };

    if location < 0 {
      None
    } else {
      Some(Uniform { program, location })
    }
  }

  /// Set the value of a uniform.
  pub fn set_uniform<T>(&mut self, uniform: Uniform, value: &T)
  where
    T: Uniformable,
  {
    unsafe { T::program_uniform(uniform.program, uniform.location, value) }
  }

  /// Look up an active uniform block by name.
  ///
  /// Returns `None` if the program has no such active block.
  pub fn uniform_block(&mut self, program: &Program<Self>, name: &str) -> Option<UniformBlock> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let program = program.repr().handle();
    let index = unsafe { gl::GetUniformBlockIndex(program, c_name.as_ptr() as *const GLchar) };

    if index == gl::INVALID_INDEX {
      None
    } else {
      Some(UniformBlock { program, index })
    }
  }

  /// Make a uniform block read from a uniform buffer binding point.
  pub fn bind_uniform_block(&mut self, block: UniformBlock, binding: u32) {
    unsafe { gl::UniformBlockBinding(block.program, block.index, binding) }
  }
}
