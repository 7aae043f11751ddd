//! The simplest demo: a red triangle over a dark blue background.
//!
//! The program is built from two shader files, `triangle.vert` and `triangle.frag`.

use crate::shared::{handle_common_actions, init_gl, triangle};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use glpipe::context::GraphicsContext;
use glpipe::shader::{Program, ProgramSources};
use glpipe_gl::gl41::{Buffer, Primitive, VertexArray};
use glpipe_gl::GL41;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct Opts {}

pub struct LocalDemo {
  program: Program<GL41>,
  _vertices: Buffer<f32>,
  triangle: VertexArray,
}

impl Demo for LocalDemo {
  type Opts = Opts;

  fn bootstrap(
    _opts: Self::Opts,
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> Result<Self, DemoError> {
    init_gl(context.backend());

    let sources = ProgramSources::from_files(
      platform.shader_path("triangle.vert"),
      platform.shader_path("triangle.frag"),
    );
    let program = Program::build(context, &sources)?;

    let (vertices, triangle) = triangle(context.backend());
    context.backend().check_error("red triangle bootstrap")?;

    Ok(Self {
      program,
      _vertices: vertices,
      triangle,
    })
  }

  fn render_frame(
    self,
    _time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> LoopFeedback<Self> {
    let gl = context.backend();

    if !handle_common_actions(actions, gl, |_| ()) {
      return LoopFeedback::Exit;
    }

    gl.clear(false);
    gl.use_program(&self.program);
    gl.draw(&self.triangle, Primitive::Triangles);

    LoopFeedback::Continue(self)
  }
}
