//! Shader stages and programs.
//!
//! A [`Stage`] is a compiled shader object for one [`StageType`]. Stages are linked into a
//! [`Program`], either explicitly with [`Program::link`] or in one go from sources with
//! [`Program::build`]. [`Program::build_separable`] produces a single-stage program meant to be
//! plugged into a [`ProgramPipeline`](crate::pipeline::ProgramPipeline).
//!
//! Stages are only needed until the link attempt. Once a program is linked, dropping the stages
//! used to build it is fine.

mod source;

pub use crate::backend::shader::{BuildStatus, StageType};
pub use self::source::{inject_prefix, read_source_file, ProgramSources, ShaderSource};

use crate::backend::shader::Shader;
use crate::context::GraphicsContext;
use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can occur while building shader programs.
#[derive(Debug)]
pub enum BuildError {
  /// A shader source file could not be read.
  FileNotFound {
    /// Path of the file.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
  /// A stage failed to compile.
  CompileError {
    /// Stage that failed.
    stage: StageType,
    /// Compiler log.
    log: String,
  },
  /// A program failed to link.
  LinkError {
    /// Linker log.
    log: String,
  },
  /// A program pipeline failed to validate.
  ValidationError {
    /// Validation log.
    log: String,
  },
}

impl BuildError {
  /// Driver log carried by the error, if any.
  pub fn log(&self) -> Option<&str> {
    match *self {
      BuildError::FileNotFound { .. } => None,
      BuildError::CompileError { ref log, .. }
      | BuildError::LinkError { ref log }
      | BuildError::ValidationError { ref log } => Some(log),
    }
  }
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      BuildError::FileNotFound {
        ref path,
        ref source,
      } => write!(f, "cannot read shader source {}: {}", path.display(), source),

      BuildError::CompileError { stage, ref log } => {
        write!(f, "{} compilation failed: {}", stage, log)
      }

      BuildError::LinkError { ref log } => write!(f, "program link failed: {}", log),

      BuildError::ValidationError { ref log } => {
        write!(f, "program pipeline validation failed: {}", log)
      }
    }
  }
}

impl error::Error for BuildError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      BuildError::FileNotFound { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Log a driver status: failures at warning level, successes with messages at info level.
pub(crate) fn report_status(what: &dyn fmt::Display, status: &BuildStatus) {
  let log = status.log.trim_end();

  if !status.success {
    log::warn!("{} failed:\n{}", what, log);
  } else if !log.is_empty() {
    log::info!("{} succeeded with messages:\n{}", what, log);
  } else {
    log::debug!("{} succeeded", what);
  }
}

/// A compiled shader stage.
///
/// The shader object is released when the stage is dropped.
pub struct Stage<S>
where
  S: ?Sized + Shader,
{
  repr: S::StageRepr,
  ty: StageType,
  log: String,
}

impl<S> Stage<S>
where
  S: ?Sized + Shader,
{
  /// Compile `src` as a stage of type `ty`.
  ///
  /// The compiler log is always fetched and logged. On failure the shader object is released and
  /// [`BuildError::CompileError`] carries the log.
  pub fn compile<C, R>(ctx: &mut C, ty: StageType, src: R) -> Result<Self, BuildError>
  where
    C: GraphicsContext<Backend = S>,
    R: AsRef<str>,
  {
    Self::compile_labeled(ctx, ty, src.as_ref(), "<inline>")
  }

  pub(crate) fn compile_labeled<C>(
    ctx: &mut C,
    ty: StageType,
    src: &str,
    label: &str,
  ) -> Result<Self, BuildError>
  where
    C: GraphicsContext<Backend = S>,
  {
    let repr = unsafe { ctx.backend().new_stage(ty) }.ok_or_else(|| BuildError::CompileError {
      stage: ty,
      log: format!("unable to create {} object", ty),
    })?;
    let mut stage = Stage {
      repr,
      ty,
      log: String::new(),
    };

    let status = unsafe { S::compile_stage(&mut stage.repr, src) };
    report_status(&format_args!("{} compilation ({})", ty, label), &status);

    if status.success {
      stage.log = status.log;
      Ok(stage)
    } else {
      log::debug!("{} source ({}):\n{}", ty, label, source::numbered(src));
      Err(BuildError::CompileError {
        stage: ty,
        log: status.log,
      })
    }
  }

  /// Type of the stage.
  pub fn ty(&self) -> StageType {
    self.ty
  }

  /// Compiler log. Empty unless the driver had warnings to report.
  pub fn log(&self) -> &str {
    &self.log
  }

  /// Backend representation of the stage.
  pub fn repr(&self) -> &S::StageRepr {
    &self.repr
  }
}

impl<S> Drop for Stage<S>
where
  S: ?Sized + Shader,
{
  fn drop(&mut self) {
    unsafe { S::destroy_stage(&mut self.repr) }
  }
}

impl<S> fmt::Debug for Stage<S>
where
  S: ?Sized + Shader,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Stage").field("ty", &self.ty).finish()
  }
}

/// A linked shader program.
///
/// The program object is released when the program is dropped. It holds no reference to the
/// stages it was linked from.
pub struct Program<S>
where
  S: ?Sized + Shader,
{
  repr: S::ProgramRepr,
  stages: Vec<StageType>,
  separable: bool,
  log: String,
}

impl<S> Program<S>
where
  S: ?Sized + Shader,
{
  /// Link already compiled stages into a program.
  ///
  /// Stages are attached, linked and detached again. On failure the program object is released
  /// and [`BuildError::LinkError`] carries the linker log.
  pub fn link<C>(ctx: &mut C, stages: &[&Stage<S>]) -> Result<Self, BuildError>
  where
    C: GraphicsContext<Backend = S>,
  {
    Self::link_stages(ctx, stages, false)
  }

  /// Read, compile and link every stage of `sources`.
  ///
  /// All stages are compiled, even after a failure, so that every compiler log gets reported. If
  /// any stage failed, no program object is created and the error of the first failing stage (in
  /// pipeline order) is returned. Intermediate stages are released on every path.
  pub fn build<C>(ctx: &mut C, sources: &ProgramSources) -> Result<Self, BuildError>
  where
    C: GraphicsContext<Backend = S>,
  {
    let loaded = sources.load()?;
    let mut stages = Vec::with_capacity(loaded.len());
    let mut first_error = None;

    for (ty, label, src) in loaded {
      match Stage::compile_labeled(ctx, ty, &src, &label) {
        Ok(stage) => stages.push(stage),

        Err(e) => {
          if first_error.is_none() {
            first_error = Some(e);
          }
        }
      }
    }

    if let Some(e) = first_error {
      return Err(e);
    }

    let stages = stages.iter().collect::<Vec<_>>();
    Self::link_stages(ctx, &stages, false)
  }

  /// Compile `source` as a stage of type `ty` and link it on its own as a separable program.
  pub fn build_separable<C>(
    ctx: &mut C,
    ty: StageType,
    source: &ShaderSource,
  ) -> Result<Self, BuildError>
  where
    C: GraphicsContext<Backend = S>,
  {
    let src = source.load()?;
    let stage = Stage::compile_labeled(ctx, ty, &src, &source.label())?;

    Self::link_stages(ctx, &[&stage], true)
  }

  fn link_stages<C>(ctx: &mut C, stages: &[&Stage<S>], separable: bool) -> Result<Self, BuildError>
  where
    C: GraphicsContext<Backend = S>,
  {
    let repr = unsafe { ctx.backend().new_program(separable) }.ok_or_else(|| {
      BuildError::LinkError {
        log: "unable to create program object".to_owned(),
      }
    })?;
    let mut program = Program {
      repr,
      stages: stages.iter().map(|stage| stage.ty).collect(),
      separable,
      log: String::new(),
    };

    let status = unsafe {
      for stage in stages {
        S::attach_stage(&mut program.repr, &stage.repr);
      }

      let status = S::link_program(&mut program.repr);

      for stage in stages {
        S::detach_stage(&mut program.repr, &stage.repr);
      }

      status
    };

    if separable {
      report_status(&"separable program link", &status);
    } else {
      report_status(&"program link", &status);
    }

    if status.success {
      program.log = status.log;
      Ok(program)
    } else {
      Err(BuildError::LinkError { log: status.log })
    }
  }

  /// Stage types the program was linked from, in pipeline order.
  pub fn stages(&self) -> &[StageType] {
    &self.stages
  }

  /// Whether the program was linked as a separable program.
  pub fn is_separable(&self) -> bool {
    self.separable
  }

  /// Linker log. Empty unless the driver had warnings to report.
  pub fn log(&self) -> &str {
    &self.log
  }

  /// Backend representation of the program.
  pub fn repr(&self) -> &S::ProgramRepr {
    &self.repr
  }
}

impl<S> Drop for Program<S>
where
  S: ?Sized + Shader,
{
  fn drop(&mut self) {
    unsafe { S::destroy_program(&mut self.repr) }
  }
}

impl<S> fmt::Debug for Program<S>
where
  S: ?Sized + Shader,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("Program")
      .field("stages", &self.stages)
      .field("separable", &self.separable)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::error::Error as _;

  #[test]
  fn stage_types_are_in_pipeline_order() {
    let mut sorted = StageType::ALL;
    sorted.sort();

    assert_eq!(sorted, StageType::ALL);
    assert!(StageType::VertexShader < StageType::FragmentShader);
  }

  #[test]
  fn build_error_display() {
    let e = BuildError::CompileError {
      stage: StageType::GeometryShader,
      log: "0:3: error: syntax error".to_owned(),
    };
    assert_eq!(
      e.to_string(),
      "geometry shader compilation failed: 0:3: error: syntax error"
    );

    let e = BuildError::ValidationError {
      log: "interface mismatch".to_owned(),
    };
    assert_eq!(
      e.to_string(),
      "program pipeline validation failed: interface mismatch"
    );
  }

  #[test]
  fn file_not_found_keeps_io_source() {
    let e = BuildError::FileNotFound {
      path: PathBuf::from("missing.vert"),
      source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
    };

    assert!(e.source().is_some());
    assert!(e.log().is_none());
    assert!(e.to_string().starts_with("cannot read shader source missing.vert"));
  }
}
