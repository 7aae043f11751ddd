//! Shader backend.

use std::fmt;

/// A shader stage type.
///
/// Variants are ordered the way data flows through the rendering pipeline.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Tessellation control shader.
  TessellationControlShader,
  /// Tessellation evaluation shader.
  TessellationEvaluationShader,
  /// Geometry shader.
  GeometryShader,
  /// Fragment shader.
  FragmentShader,
}

impl StageType {
  /// All the stage types, in pipeline order.
  pub const ALL: [StageType; 5] = [
    StageType::VertexShader,
    StageType::TessellationControlShader,
    StageType::TessellationEvaluationShader,
    StageType::GeometryShader,
    StageType::FragmentShader,
  ];
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::TessellationControlShader => f.write_str("tessellation control shader"),
      StageType::TessellationEvaluationShader => f.write_str("tessellation evaluation shader"),
      StageType::GeometryShader => f.write_str("geometry shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Outcome of a driver-side compile, link or validation step.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BuildStatus {
  /// Whether the driver reported success.
  pub success: bool,
  /// Driver log, empty when the driver had nothing to say.
  pub log: String,
}

impl BuildStatus {
  /// Successful status without any message.
  pub fn ok() -> Self {
    BuildStatus {
      success: true,
      log: String::new(),
    }
  }

  /// Failed status with its log.
  pub fn failed(log: impl Into<String>) -> Self {
    BuildStatus {
      success: false,
      log: log.into(),
    }
  }
}

/// Shader stages and programs.
///
/// Functions taking a representation instead of `&mut self` are called from `Drop`
/// implementations or while the backend is already borrowed.
pub unsafe trait Shader {
  /// Backend representation of a shader stage.
  type StageRepr;

  /// Backend representation of a shader program.
  type ProgramRepr;

  /// Create an empty shader object for the given stage type.
  ///
  /// Returns `None` if the driver refuses to create the object.
  unsafe fn new_stage(&mut self, ty: StageType) -> Option<Self::StageRepr>;

  /// Submit the source and compile it. The log is always retrieved.
  unsafe fn compile_stage(stage: &mut Self::StageRepr, src: &str) -> BuildStatus;

  /// Release a shader object.
  unsafe fn destroy_stage(stage: &mut Self::StageRepr);

  /// Create an empty program object, optionally flagged as separable.
  unsafe fn new_program(&mut self, separable: bool) -> Option<Self::ProgramRepr>;

  /// Attach a compiled stage to a program.
  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr);

  /// Detach a stage previously attached with [`Shader::attach_stage`].
  unsafe fn detach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr);

  /// Link a program. The log is always retrieved.
  unsafe fn link_program(program: &mut Self::ProgramRepr) -> BuildStatus;

  /// Release a program object.
  unsafe fn destroy_program(program: &mut Self::ProgramRepr);
}
