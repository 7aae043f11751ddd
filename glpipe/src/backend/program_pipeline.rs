//! Program pipeline backend.

use crate::backend::shader::{BuildStatus, Shader, StageType};

/// Separable program pipelines.
pub unsafe trait ProgramPipeline: Shader {
  /// Backend representation of a program pipeline.
  type PipelineRepr;

  /// Create an empty pipeline object.
  unsafe fn new_pipeline(&mut self) -> Self::PipelineRepr;

  /// Bind `program` to the stage bit of `ty`, replacing whatever was bound there.
  unsafe fn use_program_stage(
    pipeline: &mut Self::PipelineRepr,
    ty: StageType,
    program: &Self::ProgramRepr,
  );

  /// Validate the stage interfaces of the pipeline. The log is always retrieved.
  unsafe fn validate_pipeline(pipeline: &mut Self::PipelineRepr) -> BuildStatus;

  /// Release a pipeline object.
  unsafe fn destroy_pipeline(pipeline: &mut Self::PipelineRepr);
}
