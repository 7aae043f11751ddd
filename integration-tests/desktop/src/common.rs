//! Surface and shader sources shared by the fixtures.

use glpipe_glfw::GlfwSurface;
use glpipe_windowing::{Surface as _, WindowOpt};

pub const VS: &str = "#version 410 core
layout(location = 0) in vec3 position;

out gl_PerVertex {
  vec4 gl_Position;
};

layout(location = 0) out vec3 v_color;

void main() {
  gl_Position = vec4(position, 1.);
  v_color = vec3(1., 0., 0.);
}
";

pub const FS: &str = "#version 410 core
layout(location = 0) in vec3 v_color;
out vec4 frag_color;

void main() {
  frag_color = vec4(v_color, 1.);
}
";

// reads a vec4 where the vertex stage writes a vec3
pub const MISMATCHED_FS: &str = "#version 410 core
layout(location = 0) in vec4 v_color;
out vec4 frag_color;

void main() {
  frag_color = v_color;
}
";

// missing semicolon
pub const BROKEN_VS: &str = "#version 410 core
layout(location = 0) in vec3 position;

void main() {
  gl_Position = vec4(position, 1.)
}
";

pub fn surface(title: &str) -> GlfwSurface {
  GlfwSurface::new(title, WindowOpt::default()).expect("GLFW surface")
}
