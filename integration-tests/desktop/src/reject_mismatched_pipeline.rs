use crate::common::{surface, MISMATCHED_FS, VS};
use glpipe::pipeline::ProgramPipeline;
use glpipe::shader::{BuildError, Program, ShaderSource, StageType};

pub fn fixture() {
  let mut surface = surface("Reject mismatched pipeline");

  let vs = Program::build_separable(
    &mut surface,
    StageType::VertexShader,
    &ShaderSource::inline(VS),
  )
  .unwrap();
  let fs = Program::build_separable(
    &mut surface,
    StageType::FragmentShader,
    &ShaderSource::inline(MISMATCHED_FS),
  )
  .unwrap();

  let mut pipeline = ProgramPipeline::assemble(
    &mut surface,
    vec![
      (StageType::VertexShader, vs),
      (StageType::FragmentShader, fs),
    ],
  );

  match pipeline.validate() {
    Err(BuildError::ValidationError { ref log }) => {
      assert!(!log.trim().is_empty(), "validation failed without a log");
    }

    Err(e) => panic!("unexpected error: {}", e),
    Ok(()) => panic!("mismatched interfaces validated"),
  }

  assert!(!pipeline.is_valid());
}
