use crate::gl41::shader::{info_log, Program};
use crate::gl41::state::{Bind, GLState};
use crate::gl41::GL41;
use gl::types::*;
use glpipe::backend::program_pipeline::ProgramPipeline as ProgramPipelineBackend;
use glpipe::backend::shader::{BuildStatus, StageType};
use std::cell::RefCell;
use std::rc::Rc;

/// OpenGL program pipeline object.
#[derive(Debug)]
pub struct ProgramPipeline {
  handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl ProgramPipeline {
  /// OpenGL program pipeline object name.
  pub fn handle(&self) -> GLuint {
    self.handle
  }
}

unsafe impl ProgramPipelineBackend for GL41 {
  type PipelineRepr = ProgramPipeline;

  unsafe fn new_pipeline(&mut self) -> Self::PipelineRepr {
    let mut handle: GLuint = 0;
    gl::GenProgramPipelines(1, &mut handle);

    // a generated name only becomes a pipeline object once bound
    let mut state = self.state.borrow_mut();
    let previous = state.bound_pipeline();
    state.bind_pipeline(handle, Bind::Forced);
    state.bind_pipeline(previous, Bind::Forced);

    ProgramPipeline {
      handle,
      state: self.state.clone(),
    }
  }

  unsafe fn use_program_stage(
    pipeline: &mut Self::PipelineRepr,
    ty: StageType,
    program: &Program,
  ) {
    gl::UseProgramStages(pipeline.handle, opengl_stage_bit(ty), program.handle());
  }

  unsafe fn validate_pipeline(pipeline: &mut Self::PipelineRepr) -> BuildStatus {
    gl::ValidateProgramPipeline(pipeline.handle);

    let mut validated: GLint = gl::FALSE.into();
    gl::GetProgramPipelineiv(pipeline.handle, gl::VALIDATE_STATUS, &mut validated);

    BuildStatus {
      success: validated == gl::TRUE.into(),
      log: info_log(
        pipeline.handle,
        gl::GetProgramPipelineiv,
        gl::GetProgramPipelineInfoLog,
      ),
    }
  }

  unsafe fn destroy_pipeline(pipeline: &mut Self::PipelineRepr) {
    pipeline.state.borrow_mut().unbind_pipeline(pipeline.handle);
    gl::DeleteProgramPipelines(1, &pipeline.handle);
  }
}

fn opengl_stage_bit(t: StageType) -> GLbitfield {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER_BIT,
    StageType::TessellationControlShader => gl::TESS_CONTROL_SHADER_BIT,
    StageType::TessellationEvaluationShader => gl::TESS_EVALUATION_SHADER_BIT,
    StageType::GeometryShader => gl::GEOMETRY_SHADER_BIT,
    StageType::FragmentShader => gl::FRAGMENT_SHADER_BIT,
  }
}
