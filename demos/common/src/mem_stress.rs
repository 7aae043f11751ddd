//! Video memory stress test.
//!
//! Renders the rotating cube while allocating one 16 MiB uniform buffer per frame, until the
//! requested amount of memory (`--size`, in MiB) is exceeded. Each new buffer replaces the
//! previous one on the `CB0` binding and carries the current angle as its first float, the rest of
//! its content being left unspecified. All the buffers stay alive until the demo exits.

use crate::shared::{cube, handle_common_actions, init_gl, Camera, CUBE_ROTATION_STEP};
use crate::{Demo, DemoError, InputAction, LoopFeedback, PlatformServices};
use cgmath::{Matrix4, SquareMatrix};
use glpipe::context::GraphicsContext;
use glpipe::shader::{Program, ProgramSources};
use glpipe_gl::gl41::{
  Buffer, BufferError, BufferKind, PolygonMode, Primitive, Uniform, UniformBlock, VertexArray,
};
use glpipe_gl::GL41;
use std::mem;
use structopt::StructOpt;

const UBO_SIZE_MB: usize = 16;
const UBO_LEN: usize = UBO_SIZE_MB * 1024 * 1024 / mem::size_of::<f32>();
const UBO_BINDING: u32 = 1;
const ANGLE_STEP: f32 = 0.2;

#[derive(Debug, StructOpt)]
pub struct Opts {
  /// Amount of video memory to allocate, in MiB (16 MiB, two buffers, by default).
  #[structopt(short, long, default_value = "16")]
  size: usize,

  /// Enable wireframe mode.
  #[structopt(long)]
  lines: bool,
}

/// Number of uniform buffers to allocate to go past `size_mb` MiB.
fn buffer_count(size_mb: usize) -> usize {
  size_mb / UBO_SIZE_MB + 1
}

pub struct LocalDemo {
  program: Program<GL41>,
  mvp: Option<Uniform>,
  mv: Option<Uniform>,
  p: Option<Uniform>,
  block: Option<UniformBlock>,
  _vertices: Buffer<f32>,
  _indices: Buffer<u32>,
  cube: VertexArray,
  camera: Camera,
  rotation: Matrix4<f32>,
  angle: f32,
  buffers: Vec<Buffer<f32>>,
  target: usize,
}

impl LocalDemo {
  // Allocate the next uniform buffer, if any is left to allocate.
  fn allocate(&mut self, gl: &mut GL41) -> Result<(), BufferError> {
    if self.buffers.len() >= self.target || self.block.is_none() {
      return Ok(());
    }

    let mut buffer = gl.new_buffer_uninit(BufferKind::Uniform, UBO_LEN);
    buffer.write(0, &[self.angle])?;
    buffer.bind_base(UBO_BINDING);
    self.angle += ANGLE_STEP;

    self.buffers.push(buffer);

    log::info!(
      "allocated uniform buffer {}/{} ({} MiB)",
      self.buffers.len(),
      self.target,
      self.buffers.len() * UBO_SIZE_MB
    );

    if gl.check_error("uniform buffer allocation").is_err() {
      log::warn!("stopping allocations");
      self.target = self.buffers.len();
    }

    Ok(())
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

    let sources = ProgramSources::from_files(
      platform.shader_path("mem_stress.vert"),
      platform.shader_path("mem_stress.frag"),
    );
    let program = Program::build(context, &sources)?;

    let gl = context.backend();
    let mvp = gl.uniform(&program, "MVP");
    let mv = gl.uniform(&program, "MV");
    let p = gl.uniform(&program, "P");

    let block = gl.uniform_block(&program, "CB0");
    match block {
      Some(block) => gl.bind_uniform_block(block, UBO_BINDING),
      None => log::warn!("uniform block CB0 not found, no buffer will be allocated"),
    }

    let (vertices, indices, cube) = cube(gl);

    gl.set_depth_test(true);

    if opts.lines {
      gl.set_polygon_mode(PolygonMode::Line);
    }

    gl.check_error("memory stress bootstrap")?;

    let target = buffer_count(opts.size);
    log::info!(
      "will allocate {} uniform buffers of {} MiB",
      target,
      UBO_SIZE_MB
    );

    Ok(Self {
      program,
      mvp,
      mv,
      p,
      block,
      _vertices: vertices,
      _indices: indices,
      cube,
      camera: Camera::new(),
      rotation: Matrix4::identity(),
      angle: 0.3,
      buffers: Vec::with_capacity(target),
      target,
    })
  }

  fn render_frame(
    mut self,
    _time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL41>,
  ) -> LoopFeedback<Self> {
    let gl = context.backend();

    if !handle_common_actions(actions, gl, |_| ()) {
      log::info!("releasing {} uniform buffers", self.buffers.len());
      return LoopFeedback::Exit;
    }

    self.rotation = self.rotation * Matrix4::from_angle_z(CUBE_ROTATION_STEP);

    gl.clear(true);
    gl.use_program(&self.program);

    if let Err(e) = self.allocate(gl) {
      log::error!("{}", e);
      return LoopFeedback::Exit;
    }

    if let Some(u) = self.mvp {
      gl.set_uniform(u, &self.camera.mvp(self.rotation));
    }

    if let Some(u) = self.mv {
      gl.set_uniform(u, &self.camera.mv(self.rotation));
    }

    if let Some(u) = self.p {
      gl.set_uniform(u, &self.camera.p());
    }

    gl.draw(&self.cube, Primitive::Triangles);

    LoopFeedback::Continue(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn allocates_past_the_requested_size() {
    assert_eq!(buffer_count(0), 1);
    assert_eq!(buffer_count(16), 2);
    assert_eq!(buffer_count(20), 2);
    assert_eq!(buffer_count(1024), 65);
  }

  #[test]
  fn default_size() {
    let opts = Opts::from_iter(vec!["mem-stress"]);

    assert_eq!(opts.size, 16);
    assert_eq!(buffer_count(opts.size), 2);
    assert!(!opts.lines);

    let opts = Opts::from_iter(vec!["mem-stress", "-s", "64", "--lines"]);
    assert_eq!(opts.size, 64);
    assert!(opts.lines);
  }

  #[test]
  fn buffers_are_16_mib() {
    assert_eq!(UBO_LEN * mem::size_of::<f32>(), 16 * 1024 * 1024);
  }
}
