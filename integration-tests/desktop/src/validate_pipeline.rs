use crate::common::{surface, FS, VS};
use glpipe::pipeline::ProgramPipeline;
use glpipe::shader::{Program, ShaderSource, StageType};

pub fn fixture() {
  let mut surface = surface("Validate pipeline");

  let vs = Program::build_separable(
    &mut surface,
    StageType::VertexShader,
    &ShaderSource::inline(VS),
  )
  .unwrap();
  let fs = Program::build_separable(
    &mut surface,
    StageType::FragmentShader,
    &ShaderSource::inline(FS),
  )
  .unwrap();

  assert!(vs.is_separable());

  let mut pipeline = ProgramPipeline::assemble(
    &mut surface,
    vec![
      (StageType::VertexShader, vs),
      (StageType::FragmentShader, fs),
    ],
  );

  pipeline.validate().unwrap();
  assert!(pipeline.is_valid());
}
