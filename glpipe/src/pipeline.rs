//! Separable program pipelines.
//!
//! A [`ProgramPipeline`] binds independently linked programs (see
//! [`Program::build_separable`]) to the stages of the rendering pipeline. The pipeline owns the
//! programs bound to it, and each stage holds at most one program at a time.

use crate::backend::program_pipeline::ProgramPipeline as ProgramPipelineBackend;
use crate::context::GraphicsContext;
use crate::shader::{report_status, BuildError, Program, StageType};
use std::collections::BTreeMap;
use std::fmt;

/// A program pipeline object and the programs bound to it.
pub struct ProgramPipeline<S>
where
  S: ?Sized + ProgramPipelineBackend,
{
  repr: S::PipelineRepr,
  programs: BTreeMap<StageType, Program<S>>,
}

impl<S> ProgramPipeline<S>
where
  S: ?Sized + ProgramPipelineBackend,
{
  /// Create a pipeline and bind each program to its stage.
  ///
  /// If a stage type appears more than once, the last program wins and the others are released.
  pub fn assemble<C, I>(ctx: &mut C, stage_programs: I) -> Self
  where
    C: GraphicsContext<Backend = S>,
    I: IntoIterator<Item = (StageType, Program<S>)>,
  {
    let repr = unsafe { ctx.backend().new_pipeline() };
    let mut pipeline = ProgramPipeline {
      repr,
      programs: BTreeMap::new(),
    };

    for (ty, program) in stage_programs {
      pipeline.set_stage(ty, program);
    }

    pipeline
  }

  /// Bind `program` to the stage `ty`.
  ///
  /// The program previously bound to that stage, if any, is returned.
  pub fn set_stage(&mut self, ty: StageType, program: Program<S>) -> Option<Program<S>> {
    if !program.is_separable() {
      log::warn!("binding a non-separable program to the {} stage", ty);
    }

    unsafe { S::use_program_stage(&mut self.repr, ty, program.repr()) };
    self.programs.insert(ty, program)
  }

  /// Program bound to the stage `ty`, if any.
  pub fn program(&self, ty: StageType) -> Option<&Program<S>> {
    self.programs.get(&ty)
  }

  /// Stages with a bound program, in pipeline order.
  pub fn stages(&self) -> impl Iterator<Item = StageType> + '_ {
    self.programs.keys().copied()
  }

  /// Ask the driver to validate the interfaces between the bound stages.
  ///
  /// The validation log is always fetched and logged.
  pub fn validate(&mut self) -> Result<(), BuildError> {
    let status = unsafe { S::validate_pipeline(&mut self.repr) };
    report_status(&"program pipeline validation", &status);

    if status.success {
      Ok(())
    } else {
      Err(BuildError::ValidationError { log: status.log })
    }
  }

  /// Same as [`ProgramPipeline::validate`], dropping the error.
  pub fn is_valid(&mut self) -> bool {
    self.validate().is_ok()
  }

  /// Backend representation of the pipeline.
  pub fn repr(&self) -> &S::PipelineRepr {
    &self.repr
  }
}

impl<S> Drop for ProgramPipeline<S>
where
  S: ?Sized + ProgramPipelineBackend,
{
  fn drop(&mut self) {
    unsafe { S::destroy_pipeline(&mut self.repr) }
  }
}

impl<S> fmt::Debug for ProgramPipeline<S>
where
  S: ?Sized + ProgramPipelineBackend,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("ProgramPipeline")
      .field("programs", &self.programs)
      .finish()
  }
}
