//! Rotating colored cube, with every stage of the pipeline optionally in use.
//!
//! The base pipeline is vertex and fragment only. `--tess` adds both tessellation stages, `--gs`
//! a geometry stage that pushes faces along their normal, and `--ubo` switches to shader
//! variants reading part of their inputs from uniform blocks. `--all` turns the three of them on.
//! With `--sep`, every stage is built as a separable program and the programs are assembled into
//! a pipeline; uniforms are then set on the program running the stage that declares them.
//!
//! Press the <main action> to pause or resume the rotation.

use crate::shared::{
  cube, handle_common_actions, init_gl, Camera, Shading, CUBE_ROTATION_STEP,
};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use cgmath::{Matrix4, SquareMatrix};
use glpipe::context::GraphicsContext;
use glpipe::shader::StageType;
use glpipe_gl::gl41::{Buffer, BufferKind, PolygonMode, Primitive, Uniform, VertexArray};
use glpipe_gl::GL41;
use structopt::StructOpt;

const PATCH_VERTICES: usize = 3;
const TESS_LEVEL: [f32; 2] = [8., 4.];

#[derive(Debug, StructOpt)]
pub struct Opts {
  /// Enable separate shader objects.
  #[structopt(short, long)]
  sep: bool,

  /// Enable wireframe mode.
  #[structopt(long)]
  lines: bool,

  /// Use uniform blocks in the vertex, tessellation and geometry stages.
  #[structopt(short, long)]
  ubo: bool,

  /// Enable the geometry stage.
  #[structopt(short, long)]
  gs: bool,

  /// Enable tessellation.
  #[structopt(short, long)]
  tess: bool,

  /// Enable uniform blocks, geometry and tessellation.
  #[structopt(short, long)]
  all: bool,
}

/// Stages enabled for a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Features {
  ubo: bool,
  gs: bool,
  tess: bool,
}

impl Features {
  fn from_opts(opts: &Opts) -> Self {
    Features {
      ubo: opts.ubo || opts.all,
      gs: opts.gs || opts.all,
      tess: opts.tess || opts.all,
    }
  }

  /// Shader file of every enabled stage, in pipeline order.
  fn stage_files(self) -> Vec<(StageType, String)> {
    let variant = |name: &str| {
      if self.ubo {
        format!("ubo_{}", name)
      } else {
        name.to_owned()
      }
    };

    let mut files = Vec::new();

    if self.gs || self.tess {
      files.push((StageType::VertexShader, variant("cube.vert")));
    } else {
      files.push((StageType::VertexShader, variant("simple.vert")));
    }

    if self.tess {
      files.push((StageType::TessellationControlShader, variant("cube.tesc")));

      let tese = if self.gs { "cube_gs.tese" } else { "cube.tese" };
      files.push((StageType::TessellationEvaluationShader, variant(tese)));
    }

    if self.gs {
      files.push((StageType::GeometryShader, variant("cube.geom")));
    }

    files.push((StageType::FragmentShader, "simple.frag".to_owned()));
    files
  }

  fn norm_scale(self) -> f32 {
    if self.tess {
      0.2
    } else {
      0.5
    }
  }
}

// Uniform blocks, with the stage declaring them, their binding point and their content.
const UNIFORM_BLOCKS: [(&str, StageType, u32, [f32; 4]); 4] = [
  ("CB0", StageType::VertexShader, 1, [0.2, 0.4, 0.6, 0.]),
  ("CB1", StageType::GeometryShader, 2, [0.6, 0.01, 0.1, 0.]),
  ("CB2", StageType::TessellationControlShader, 3, [0.1, 0.2, 0.5, 0.]),
  ("CB3", StageType::TessellationEvaluationShader, 4, [0.7, 0., 0., 0.]),
];

#[derive(Debug, Default)]
struct Uniforms {
  mvp: Option<Uniform>,
  mv: Option<Uniform>,
  p: Option<Uniform>,
  tess_level: Option<Uniform>,
  norm_scale: Option<Uniform>,
}

impl Uniforms {
  fn lookup(gl: &mut GL41, shading: &Shading) -> Self {
    let mut find = |name: &str, stages: &[StageType]| {
      let found = stages
        .iter()
        .filter_map(|&ty| shading.program(ty))
        .find_map(|program| gl.uniform(program, name));

      if found.is_none() {
        log::debug!("uniform {} is not active", name);
      }

      found
    };

    Uniforms {
      mvp: find("MVP", &[StageType::VertexShader]),
      mv: find("MV", &[StageType::VertexShader]),
      p: find(
        "P",
        &[
          StageType::GeometryShader,
          StageType::TessellationEvaluationShader,
        ],
      ),
      tess_level: find("tessLevel", &[StageType::TessellationControlShader]),
      norm_scale: find("normScale", &[StageType::GeometryShader]),
    }
  }
}

pub struct LocalDemo {
  features: Features,
  shading: Shading,
  uniforms: Uniforms,
  _uniform_buffers: Vec<Buffer<f32>>,
  _vertices: Buffer<f32>,
  _indices: Buffer<u32>,
  cube: VertexArray,
  camera: Camera,
  rotation: Matrix4<f32>,
  paused: bool,
}

impl LocalDemo {
  fn bind_uniform_blocks(gl: &mut GL41, shading: &Shading) -> Vec<Buffer<f32>> {
    UNIFORM_BLOCKS
      .iter()
      .filter_map(|&(name, ty, binding, content)| {
        let block = shading
          .program(ty)
          .and_then(|program| gl.uniform_block(program, name));

        match block {
          Some(block) => {
            gl.bind_uniform_block(block, binding);

            let buffer = gl.new_buffer(BufferKind::Uniform, &content);
            buffer.bind_base(binding);

            Some(buffer)
          }

          None => {
            log::info!("uniform block {} not found, skipping it", name);
            None
          }
        }
      })
      .collect()
  }
}

impl Demo for LocalDemo {
  type Opts = Opts;

  fn bootstrap(
    opts: Self::Opts,
    platform: &mut impl PlatformServices,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> Result<Self, DemoError> {
    init_gl(context.backend());

    let features = Features::from_opts(&opts);
    log::info!("cube features: {:?}", features);

    let files = features.stage_files();
    let stages = files
      .iter()
      .map(|(ty, name)| (*ty, name.as_str()))
      .collect::<Vec<_>>();
    let shading = Shading::from_files(context, &*platform, &stages, opts.sep)?;

    let gl = context.backend();
    let uniforms = Uniforms::lookup(gl, &shading);

    let uniform_buffers = if features.ubo {
      Self::bind_uniform_blocks(gl, &shading)
    } else {
      Vec::new()
    };

    let (vertices, indices, cube) = cube(gl);

    gl.set_depth_test(true);

    if opts.lines {
      gl.set_polygon_mode(PolygonMode::Line);
    }

    gl.check_error("cube bootstrap")?;

    Ok(Self {
      features,
      shading,
      uniforms,
      _uniform_buffers: uniform_buffers,
      _vertices: vertices,
      _indices: indices,
      cube,
      camera: Camera::new(),
      rotation: Matrix4::identity(),
      paused: false,
    })
  }

  fn render_frame(
    mut self,
    _time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> LoopFeedback<Self> {
    let gl = context.backend();

    let mut paused = self.paused;
    let running = handle_common_actions(actions, gl, |action| {
      if action == InputAction::MainToggle {
        paused = !paused;
        log::info!("rotation {}", if paused { "paused" } else { "resumed" });
      }
    });

    if !running {
      return LoopFeedback::Exit;
    }

    self.paused = paused;

    if !self.paused {
      self.rotation = self.rotation * Matrix4::from_angle_z(CUBE_ROTATION_STEP);
    }

    gl.clear(true);
    self.shading.bind(gl);

    if let Some(u) = self.uniforms.mvp {
      gl.set_uniform(u, &self.camera.mvp(self.rotation));
    }

    if let Some(u) = self.uniforms.mv {
      gl.set_uniform(u, &self.camera.mv(self.rotation));
    }

    if let Some(u) = self.uniforms.p {
      gl.set_uniform(u, &self.camera.p());
    }

    if let Some(u) = self.uniforms.tess_level {
      gl.set_uniform(u, &TESS_LEVEL);
    }

    if let Some(u) = self.uniforms.norm_scale {
      gl.set_uniform(u, &self.features.norm_scale());
    }

    let primitive = if self.features.tess {
      Primitive::Patches(PATCH_VERTICES)
    } else {
      Primitive::Triangles
    };
    gl.draw(&self.cube, primitive);

    LoopFeedback::Continue(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn names(features: Features) -> Vec<String> {
    features
      .stage_files()
      .into_iter()
      .map(|(_, name)| name)
      .collect()
  }

  #[test]
  fn base_pipeline() {
    let features = Features {
      ubo: false,
      gs: false,
      tess: false,
    };

    assert_eq!(names(features), ["simple.vert", "simple.frag"]);
    assert_eq!(features.norm_scale(), 0.5);
  }

  #[test]
  fn tessellation_with_geometry() {
    let features = Features {
      ubo: false,
      gs: true,
      tess: true,
    };

    assert_eq!(
      names(features),
      [
        "cube.vert",
        "cube.tesc",
        "cube_gs.tese",
        "cube.geom",
        "simple.frag"
      ]
    );
    assert_eq!(features.norm_scale(), 0.2);
  }

  #[test]
  fn ubo_variants_keep_the_fragment_stage() {
    let features = Features {
      ubo: true,
      gs: false,
      tess: true,
    };

    assert_eq!(
      names(features),
      [
        "ubo_cube.vert",
        "ubo_cube.tesc",
        "ubo_cube.tese",
        "simple.frag"
      ]
    );

    let features = Features {
      ubo: true,
      gs: false,
      tess: false,
    };
    assert_eq!(names(features), ["ubo_simple.vert", "simple.frag"]);
  }

  #[test]
  fn all_enables_everything_but_separable() {
    let opts = Opts::from_iter(vec!["cube-full", "--all"]);

    assert!(!opts.sep);
    assert_eq!(
      Features::from_opts(&opts),
      Features {
        ubo: true,
        gs: true,
        tess: true,
      }
    );
  }

  #[test]
  fn stages_are_in_pipeline_order() {
    let features = Features {
      ubo: true,
      gs: true,
      tess: true,
    };
    let types = features
      .stage_files()
      .into_iter()
      .map(|(ty, _)| ty)
      .collect::<Vec<_>>();

    assert_eq!(types, StageType::ALL);
  }
}
