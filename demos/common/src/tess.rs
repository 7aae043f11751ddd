//! Tessellated triangle.
//!
//! The triangle is sent as a single three-vertex patch through vertex, tessellation control,
//! tessellation evaluation and fragment stages, linked together or as separable programs (`--sep`).
//! `--lines` shows the generated triangles in wireframe.

use crate::shared::{handle_common_actions, init_gl, triangle, Shading};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use glpipe::context::GraphicsContext;
use glpipe::shader::StageType;
use glpipe_gl::gl41::{Buffer, PolygonMode, Primitive, VertexArray};
use glpipe_gl::GL41;
use structopt::StructOpt;

const PATCH_VERTICES: usize = 3;

#[derive(Debug, StructOpt)]
pub struct Opts {
  /// Enable separate shader objects.
  #[structopt(short, long)]
  sep: bool,

  /// Enable wireframe mode.
  #[structopt(long)]
  lines: bool,
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
        (StageType::TessellationControlShader, "sep.tesc"),
        (StageType::TessellationEvaluationShader, "sep.tese"),
        (StageType::FragmentShader, "sep.frag"),
      ],
      opts.sep,
    )?;

    let gl = context.backend();
    let (vertices, triangle) = triangle(gl);

    if opts.lines {
      gl.set_polygon_mode(PolygonMode::Line);
    }

    gl.check_error("tess bootstrap")?;

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
    gl.draw(&self.triangle, Primitive::Patches(PATCH_VERTICES));

    LoopFeedback::Continue(self)
  }
}
