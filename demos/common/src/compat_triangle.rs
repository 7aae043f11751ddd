//! Compatibility profile triangle.
//!
//! Shaders are built from in-memory strings and read the fixed-function `gl_Vertex` and
//! `gl_Color` inputs. By default vertices are submitted in immediate mode: a yellowish triangle
//! and a multicolored strip over it. `--vbo` draws the triangle from a vertex buffer instead.

use crate::shared::{handle_common_actions, init_gl, triangle, TRIANGLE_VERTICES};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use glpipe::context::GraphicsContext;
use glpipe::shader::{Program, ProgramSources};
use glpipe_gl::gl41::{Buffer, ImmediateModeError, Primitive, VertexArray};
use glpipe_gl::GL41;
use glpipe_windowing::ContextProfile;
use structopt::StructOpt;

const VS: &str = "#version 330 compatibility
out vec4 incolor;

void main() {
  gl_Position = vec4(gl_Vertex.xyz, 1.);
  incolor = gl_Color;
}
";

const FS: &str = "#version 330 compatibility
in vec4 incolor;
out vec4 color;

void main() {
  color = incolor;
}
";

const TRIANGLE_COLOR: [f32; 4] = [0.5, 0.5, 0.1, 1.];

const STRIP_SCALE: [f32; 2] = [1. / 8., 1. / 4.];

// colors and unscaled positions of the strip
const STRIP: [([f32; 4], [f32; 2]); 4] = [
  ([0.9843137, 0.9843137, 0.09882353, 1.], [-6.076823, 3.486979]),
  ([0.9333333, 0.09411765, 0.945098, 1.], [-6.076823, -3.486979]),
  ([0.09843137, 0.9843137, 0.9882353, 1.], [6.076823, 3.486979]),
  ([0.9333333, 0.09411765, 0.945098, 1.], [6.076823, -3.486979]),
];

#[derive(Debug, StructOpt)]
pub struct Opts {
  /// Draw from a vertex buffer instead of using glBegin/glEnd.
  #[structopt(long)]
  vbo: bool,
}

enum DrawMode {
  Immediate,
  VertexBuffer {
    _vertices: Buffer<f32>,
    triangle: VertexArray,
  },
}

pub struct LocalDemo {
  program: Program<GL41>,
  mode: DrawMode,
}

fn draw_immediate(gl: &mut GL41) -> Result<(), ImmediateModeError> {
  gl.immediate(Primitive::Triangles, |im| {
    im.color(TRIANGLE_COLOR);

    for v in TRIANGLE_VERTICES.chunks(3) {
      im.vertex([v[0], v[1], v[2]]);
    }
  })?;

  gl.immediate(Primitive::TriangleStrip, |im| {
    for &(color, [x, y]) in &STRIP {
      im.color(color);
      im.vertex([x * STRIP_SCALE[0], y * STRIP_SCALE[1], 0.]);
    }
  })
}

impl Demo for LocalDemo {
  type Opts = Opts;

  fn profile(_opts: &Self::Opts) -> ContextProfile {
    ContextProfile::Compatibility
  }

  fn bootstrap(
    opts: Self::Opts,
    _platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> Result<Self, DemoError> {
    init_gl(context.backend());

    let program = Program::build(context, &ProgramSources::from_strings(VS, FS))?;

    let gl = context.backend();
    let mode = if opts.vbo {
      log::info!("draw mode: vertex buffer");

      let (vertices, triangle) = triangle(gl);
      DrawMode::VertexBuffer {
        _vertices: vertices,
        triangle,
      }
    } else {
      log::info!("draw mode: glBegin/glEnd");

      if !gl.has_immediate_mode() {
        return Err(ImmediateModeError::Unavailable.into());
      }

      DrawMode::Immediate
    };

    gl.check_error("compatibility triangle bootstrap")?;

    Ok(Self { program, mode })
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

    match self.mode {
      DrawMode::Immediate => {
        if let Err(e) = draw_immediate(gl) {
          log::error!("{}", e);
          return LoopFeedback::Exit;
        }
      }

      DrawMode::VertexBuffer { ref triangle, .. } => gl.draw(triangle, Primitive::Triangles),
    }

    LoopFeedback::Continue(self)
  }
}
