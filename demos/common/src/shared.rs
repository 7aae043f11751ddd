//! Pieces shared by several demos.

use crate::{InputAction, PlatformServices};
use cgmath::{perspective, Deg, Matrix4, Point3, Vector3};
use glpipe::context::GraphicsContext;
use glpipe::pipeline::ProgramPipeline;
use glpipe::shader::{BuildError, Program, ProgramSources, ShaderSource, StageType};
use glpipe_gl::gl41::{Buffer, BufferKind, VertexArray, VertexAttrib};
use glpipe_gl::GL41;

/// Dark blue background.
pub const CLEAR_COLOR: [f32; 4] = [0., 0., 0.4, 0.];

/// A triangle covering the lower half of the viewport and its top middle.
pub const TRIANGLE_VERTICES: [f32; 9] = [
  -1., -1., 0., //
  1., -1., 0., //
  0., 1., 0., //
];

/// Position at location 0, three floats.
pub const POSITION: VertexAttrib = VertexAttrib::new(0, 3);

/// Color at location 1, three floats.
pub const COLOR: VertexAttrib = VertexAttrib::new(1, 3);

// cube corners, interleaved position and color
#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 48] = [
  // front
  -1., -1.,  1.,   1., 0., 0.,
   1., -1.,  1.,   0., 1., 0.,
   1.,  1.,  1.,   0., 0., 1.,
  -1.,  1.,  1.,   1., 1., 1.,
  // back
  -1., -1., -1.,   1., 0., 0.,
   1., -1., -1.,   0., 1., 0.,
   1.,  1., -1.,   0., 0., 1.,
  -1.,  1., -1.,   1., 1., 1.,
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
  0, 1, 2, 2, 3, 0, // front
  1, 5, 6, 6, 2, 1, // top
  7, 6, 5, 5, 4, 7, // back
  4, 0, 3, 3, 7, 4, // bottom
  4, 5, 1, 1, 0, 4, // left
  3, 2, 6, 6, 7, 3, // right
];

/// Rotation applied to the cube at every frame, around the z axis.
pub const CUBE_ROTATION_STEP: Deg<f32> = Deg(0.03);

/// Projection and view matrices looking at a cube sitting at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
  pub projection: Matrix4<f32>,
  pub view: Matrix4<f32>,
}

impl Camera {
  /// 45 degrees of vertical field of view, 4:3 ratio, from (4, 3, -3).
  pub fn new() -> Self {
    let projection = perspective(Deg(45.0f32), 4. / 3., 0.1, 100.);
    let view = Matrix4::look_at_rh(
      Point3::new(4., 3., -3.),
      Point3::new(0., 0., 0.),
      Vector3::unit_y(),
    );

    Camera { projection, view }
  }

  /// Model-view-projection of a model transformed by `model`.
  pub fn mvp(&self, model: Matrix4<f32>) -> [[f32; 4]; 4] {
    (self.projection * self.view * model).into()
  }

  /// Model-view of a model transformed by `model`.
  pub fn mv(&self, model: Matrix4<f32>) -> [[f32; 4]; 4] {
    (self.view * model).into()
  }

  pub fn p(&self) -> [[f32; 4]; 4] {
    self.projection.into()
  }
}

/// Log the context strings and set the clear color every demo starts with.
pub fn init_gl(gl: &mut GL41) {
  gl.info().log();
  gl.set_clear_color(CLEAR_COLOR);
}

/// Upload the triangle and describe it.
pub fn triangle(gl: &mut GL41) -> (Buffer<f32>, VertexArray) {
  let vertices = gl.new_buffer(BufferKind::Vertex, &TRIANGLE_VERTICES);
  let vertex_array = gl.new_vertex_array(&vertices, &[POSITION], None);

  (vertices, vertex_array)
}

/// Upload the colored cube and describe it.
pub fn cube(gl: &mut GL41) -> (Buffer<f32>, Buffer<u32>, VertexArray) {
  let vertices = gl.new_buffer(BufferKind::Vertex, &CUBE_VERTICES);
  let indices = gl.new_buffer(BufferKind::Index, &CUBE_INDICES);
  let vertex_array = gl.new_vertex_array(&vertices, &[POSITION, COLOR], Some(&indices));

  (vertices, indices, vertex_array)
}

/// React to the actions every demo handles the same way.
///
/// Returns `false` if the demo should exit.
pub fn handle_common_actions(
  actions: impl Iterator<Item = InputAction>,
  gl: &mut GL41,
  mut on_other: impl FnMut(InputAction),
) -> bool {
  for action in actions {
    match action {
      InputAction::Quit => return false,

      InputAction::Resized { width, height } => {
        log::debug!("resized to {}x{}", width, height);
        gl.set_viewport(0, 0, width, height);
      }

      action => on_other(action),
    }
  }

  true
}

/// Shaders of a demo: either one linked program or a pipeline of separable programs.
pub enum Shading {
  Linked(Program<GL41>),
  Separable(ProgramPipeline<GL41>),
}

impl Shading {
  /// Build `stages` (shader file names per stage) into a linked program, or into a validated
  /// pipeline of separable programs if `separable` is set.
  pub fn from_files(
    context: &mut impl GraphicsContext<Backend = GL41>,
    platform: &impl PlatformServices,
    stages: &[(StageType, &str)],
    separable: bool,
  ) -> Result<Self, BuildError> {
    let sources = stages.iter().fold(ProgramSources::new(), |sources, &(ty, name)| {
      sources.stage(ty, ShaderSource::file(platform.shader_path(name)))
    });

    if separable {
      log::info!("building separable programs");

      if !context.backend().has_extension("GL_ARB_separate_shader_objects") {
        log::warn!("separable programs are core since OpenGL 4.1, trying anyway");
      }

      let programs = sources
        .iter()
        .map(|(ty, source)| Program::build_separable(context, ty, source).map(|p| (ty, p)))
        .collect::<Result<Vec<_>, _>>()?;

      let mut pipeline = ProgramPipeline::assemble(context, programs);
      pipeline.validate()?;

      Ok(Shading::Separable(pipeline))
    } else {
      Program::build(context, &sources).map(Shading::Linked)
    }
  }

  /// Program running the stage `ty`, if any.
  ///
  /// Uniforms of a stage live in that program.
  pub fn program(&self, ty: StageType) -> Option<&Program<GL41>> {
    match self {
      Shading::Linked(program) => Some(program).filter(|p| p.stages().contains(&ty)),
      Shading::Separable(pipeline) => pipeline.program(ty),
    }
  }

  /// Make the shaders current.
  pub fn bind(&self, gl: &mut GL41) {
    match self {
      Shading::Linked(program) => gl.use_program(program),
      Shading::Separable(pipeline) => gl.use_pipeline(pipeline),
    }
  }
}
