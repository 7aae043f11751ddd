use crate::common::{surface, FS, VS};
use glpipe::context::GraphicsContext as _;
use glpipe::shader::{Program, ProgramSources, StageType};
use glpipe_gl::gl41::BufferKind;

pub fn fixture() {
  let mut surface = surface("Build program from literals");
  let program = Program::build(&mut surface, &ProgramSources::from_strings(VS, FS)).unwrap();

  assert_eq!(
    program.stages(),
    &[StageType::VertexShader, StageType::FragmentShader]
  );
  assert!(!program.is_separable());
  assert!(
    program.log().trim().is_empty(),
    "unexpected link log: {}",
    program.log()
  );

  let gl = surface.backend();
  let vertices = gl.new_buffer(BufferKind::Vertex, &[0f32; 9]);
  assert_eq!(vertices.len(), 9);

  gl.use_program(&program);
  gl.check_error("program use").unwrap();
}
