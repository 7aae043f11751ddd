//! Shader stages and programs.

use crate::gl41::state::GLState;
use crate::gl41::GL41;
use gl::types::*;
use glpipe::backend::shader::{BuildStatus, Shader, StageType};
use std::cell::RefCell;
use std::ffi::CString;
use std::ptr::null;
use std::rc::Rc;

/// OpenGL shader object.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
}

/// OpenGL program object.
#[derive(Debug)]
pub struct Program {
  handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Program {
  /// OpenGL program object name.
  pub fn handle(&self) -> GLuint {
    self.handle
  }
}

unsafe impl Shader for GL41 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType) -> Option<Self::StageRepr> {
    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      None
    } else {
      Some(Stage { handle })
    }
  }

  unsafe fn compile_stage(stage: &mut Self::StageRepr, src: &str) -> BuildStatus {
    let c_src = match CString::new(src.as_bytes()) {
      Ok(c_src) => c_src,
      Err(e) => {
        return BuildStatus::failed(format!(
          "source contains a NUL byte at offset {}",
          e.nul_position()
        ))
      }
    };

    gl::ShaderSource(stage.handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(stage.handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(stage.handle, gl::COMPILE_STATUS, &mut compiled);

    BuildStatus {
      success: compiled == gl::TRUE.into(),
      log: info_log(stage.handle, gl::GetShaderiv, gl::GetShaderInfoLog),
    }
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    gl::DeleteShader(stage.handle);
  }

  unsafe fn new_program(&mut self, separable: bool) -> Option<Self::ProgramRepr> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return None;
    }

    if separable {
      gl::ProgramParameteri(handle, gl::PROGRAM_SEPARABLE, gl::TRUE.into());
    }

    Some(Program {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    gl::AttachShader(program.handle, stage.handle);
  }

  unsafe fn detach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    gl::DetachShader(program.handle, stage.handle);
  }

  unsafe fn link_program(program: &mut Self::ProgramRepr) -> BuildStatus {
    gl::LinkProgram(program.handle);

    let mut linked: GLint = gl::FALSE.into();
    gl::GetProgramiv(program.handle, gl::LINK_STATUS, &mut linked);

    BuildStatus {
      success: linked == gl::TRUE.into(),
      log: info_log(program.handle, gl::GetProgramiv, gl::GetProgramInfoLog),
    }
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    program.state.borrow_mut().unuse_program(program.handle);
    gl::DeleteProgram(program.handle);
  }
}

/// Fetch the info log of a shader, program or pipeline object.
///
/// The reported length includes the NUL terminator, so anything up to 1 means no log.
pub(crate) unsafe fn info_log(
  handle: GLuint,
  get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
  get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
  let mut log_len: GLint = 0;
  get_iv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

  if log_len <= 1 {
    return String::new();
  }

  let mut log = vec![0u8; log_len as usize];
  let mut written: GLsizei = 0;
  get_log(handle, log_len, &mut written, log.as_mut_ptr() as *mut GLchar);
  log.truncate(written.max(0) as usize);

  String::from_utf8_lossy(&log).into_owned()
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::TessellationControlShader => gl::TESS_CONTROL_SHADER,
    StageType::TessellationEvaluationShader => gl::TESS_EVALUATION_SHADER,
    StageType::GeometryShader => gl::GEOMETRY_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}
