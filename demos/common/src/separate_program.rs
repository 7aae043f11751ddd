//! Same triangle as the red triangle demo, optionally drawn through a program pipeline.
//!
//! Without `--sep`, `sep.vert` and `sep.frag` are linked into one program. With it, each file is
//! built into its own separable program and both are assembled into a validated pipeline.

use crate::shared::{handle_common_actions, init_gl, triangle, Shading};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use glpipe::context::GraphicsContext;
use glpipe::shader::StageType;
use glpipe_gl::gl41::{Buffer, Primitive, VertexArray};
use glpipe_gl::GL41;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct Opts {
  /// Enable separate shader objects.
  #[structopt(short, long)]
  sep: bool,
}

pub struct LocalDemo {
  shading: Shading,
  _vertices: Buffer<f32>,
  triangle: VertexArray,
}

impl Demo for LocalDemo {
  type Opts = Opts;

  fn bootstrap(
    opts: Self::Opts,
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> Result<Self, DemoError> {
    init_gl(context.backend());

    let shading = Shading::from_files(
      context,
      &*platform,
      &[
        (StageType::VertexShader, "sep.vert"),
        (StageType::FragmentShader, "sep.frag"),
      ],
      opts.sep,
    )?;

    let (vertices, triangle) = triangle(context.backend());
    context.backend().check_error("separate program bootstrap")?;

    Ok(Self {
      shading,
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
    self.shading.bind(gl);
    gl.draw(&self.triangle, Primitive::Triangles);

    LoopFeedback::Continue(self)
  }
}
