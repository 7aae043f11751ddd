mod platform;

use glpipe::context::GraphicsContext;
use glpipe_demos::{Demo, DemoError, InputAction, LoopFeedback, WINDOW_SIZE, WINDOW_TITLE};
use glpipe_gl::GL41;
use glpipe_glfw::{GlfwSurface, GlfwSurfaceError};
use glpipe_glutin::{GlutinError, GlutinSurface};
use glpipe_windowing::{Key, Surface, SurfaceEvent, WindowDim, WindowOpt};
use platform::DesktopPlatformServices;
use std::{error::Error, fmt, iter, path::PathBuf, process, str::FromStr, time::Instant};
use structopt::StructOpt;

const DEFAULT_SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../common/shaders");

#[derive(Debug, StructOpt)]
pub struct CLIOpts {
  /// Window system to open the window with (glfw or glutin).
  #[structopt(short, long, default_value = "glfw")]
  platform: Platform,

  /// Directory where to pick shader files from. Defaults to the shaders shipped with the demos.
  #[structopt(long, parse(from_os_str))]
  shaders: Option<PathBuf>,

  /// Open the window in fullscreen mode, at the monitor resolution.
  #[structopt(short, long)]
  fullscreen: bool,

  /// With --fullscreen, keep the demo window size instead of the monitor resolution.
  #[structopt(long, requires = "fullscreen")]
  restricted: bool,

  /// Log at debug level.
  #[structopt(short, long)]
  verbose: bool,

  /// List available demos.
  #[structopt(short, long)]
  list_demos: bool,

  /// Demo to run.
  #[structopt(subcommand)]
  demo: Option<DemoCommand>,
}

/// Window system backing the surface.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
  Glfw,
  Glutin,
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      Platform::Glfw => f.write_str("glfw"),
      Platform::Glutin => f.write_str("glutin"),
    }
  }
}

impl FromStr for Platform {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "glfw" => Ok(Platform::Glfw),
      "glutin" => Ok(Platform::Glutin),
      _ => Err(format!("unknown platform {} (expected glfw or glutin)", s)),
    }
  }
}

/// Errors that end a run.
#[derive(Debug)]
pub enum DesktopError {
  Glfw(GlfwSurfaceError),
  Glutin(GlutinError),
  Demo(DemoError),
}

impl fmt::Display for DesktopError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DesktopError::Glfw(ref e) => write!(f, "cannot create GLFW surface: {}", e),
      DesktopError::Glutin(ref e) => write!(f, "cannot create glutin surface: {}", e),
      DesktopError::Demo(ref e) => write!(f, "demo failed: {}", e),
    }
  }
}

impl Error for DesktopError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      DesktopError::Glfw(e) => Some(e),
      DesktopError::Glutin(e) => Some(e),
      DesktopError::Demo(e) => Some(e),
    }
  }
}

impl From<GlfwSurfaceError> for DesktopError {
  fn from(e: GlfwSurfaceError) -> Self {
    DesktopError::Glfw(e)
  }
}

impl From<GlutinError> for DesktopError {
  fn from(e: GlutinError) -> Self {
    DesktopError::Glutin(e)
  }
}

impl From<DemoError> for DesktopError {
  fn from(e: DemoError) -> Self {
    DesktopError::Demo(e)
  }
}

/// Macro to declaratively add demos.
macro_rules! demos {
  ($($name:literal, $variant:ident, $module:ident, $about:literal),* $(,)?) => {
    #[derive(Debug, StructOpt)]
    pub enum DemoCommand {
      $(
        #[structopt(name = $name, about = $about)]
        $variant(glpipe_demos::$module::Opts),
      )*
    }

    fn show_available_demos() {
      println!("available demos:");
      $( println!("  - {}: {}", $name, $about); )*
    }

    // run a demo based on the picked subcommand
    fn pick_and_run_demo<S>(
      services: &mut DesktopPlatformServices,
      dim: WindowDim,
      command: DemoCommand,
    ) -> Result<(), DesktopError>
    where
      S: Surface + GraphicsContext<Backend = GL41>,
      DesktopError: From<S::Error>,
    {
      match command {
        $(
          DemoCommand::$variant(opts) => {
            log::info!("running demo {}", $name);
            run_demo::<S, glpipe_demos::$module::LocalDemo>(services, dim, opts)
          }
        ),*
      }
    }
  }
}

demos! {
  "red-triangle", RedTriangle, red_triangle, "Red triangle from a linked program",
  "separate-program", SeparateProgram, separate_program, "Red triangle, optionally from separable programs",
  "tess", Tess, tess, "Tessellated triangle",
  "cube-full", CubeFull, cube_full, "Rotating cube using every pipeline stage",
  "mem-stress", MemStress, mem_stress, "Rotating cube allocating uniform buffers every frame",
  "compat-triangle", CompatTriangle, compat_triangle, "Compatibility profile triangle",
}

/// Window mode picked on the command line.
fn window_dim(fullscreen: bool, restricted: bool) -> WindowDim {
  let [width, height] = WINDOW_SIZE;

  match (fullscreen, restricted) {
    (false, _) => WindowDim::Windowed { width, height },
    (true, false) => WindowDim::Fullscreen,
    (true, true) => WindowDim::FullscreenRestricted { width, height },
  }
}

// Run a demo on a freshly created surface.
fn run_demo<S, D>(
  services: &mut DesktopPlatformServices,
  dim: WindowDim,
  opts: D::Opts,
) -> Result<(), DesktopError>
where
  S: Surface + GraphicsContext<Backend = GL41>,
  D: Demo,
  DesktopError: From<S::Error>,
{
  log::debug!("demo options: {:?}", opts);

  let win_opt = WindowOpt::default()
    .set_dim(dim)
    .set_profile(D::profile(&opts));

  let mut surface = S::new(WINDOW_TITLE, win_opt)?;

  let demo = D::bootstrap(opts, services, &mut surface)?;
  let start_t = Instant::now();

  // render a first frame with the initial framebuffer size so that the viewport matches the
  // window even if no resize event is ever received
  let (width, height) = (surface.width(), surface.height());
  log::debug!("initial framebuffer size: {}x{}", width, height);

  let feedback = demo.render_frame(
    0.,
    iter::once(InputAction::Resized { width, height }),
    &mut surface,
  );

  let mut demo = match feedback {
    LoopFeedback::Exit => return Ok(()),
    LoopFeedback::Continue(demo) => demo,
  };
  surface.swap_buffers();

  'app: loop {
    let actions = surface
      .poll_events()
      .filter_map(adapt_event)
      .collect::<Vec<_>>();

    let t = start_t.elapsed().as_secs_f32();
    let feedback = demo.render_frame(t, actions.into_iter(), &mut surface);

    if let LoopFeedback::Continue(stepped) = feedback {
      demo = stepped;
      surface.swap_buffers();
    } else {
      // the demo was consumed by the exiting frame, so its GL objects are gone before the surface
      break 'app;
    }
  }

  Ok(())
}

fn adapt_event(event: SurfaceEvent) -> Option<InputAction> {
  match event {
    SurfaceEvent::Close | SurfaceEvent::KeyReleased(Key::Escape) => Some(InputAction::Quit),

    SurfaceEvent::KeyReleased(Key::Space) => Some(InputAction::MainToggle),

    SurfaceEvent::FramebufferResized { width, height } => {
      Some(InputAction::Resized { width, height })
    }

    SurfaceEvent::KeyPressed(key) => {
      log::debug!("key press: {:?}", key);
      None
    }

    _ => None,
  }
}

fn main() {
  let cli_opts = CLIOpts::from_args();

  let level = if cli_opts.verbose {
    log::LevelFilter::Debug
  } else {
    log::LevelFilter::Info
  };

  env_logger::builder()
    .filter_level(level)
    .parse_default_env()
    .init();

  if cli_opts.list_demos {
    show_available_demos();
    return;
  }

  let command = match cli_opts.demo {
    Some(command) => command,
    None => {
      log::error!("no demo selected");
      show_available_demos();
      process::exit(1);
    }
  };

  log::info!("platform: {}", cli_opts.platform);
  let shaders = cli_opts.shaders.unwrap_or_else(|| PathBuf::from(DEFAULT_SHADER_DIR));
  let mut services = DesktopPlatformServices::new(shaders);

  let dim = window_dim(cli_opts.fullscreen, cli_opts.restricted);

  let result = match cli_opts.platform {
    Platform::Glfw => pick_and_run_demo::<GlfwSurface>(&mut services, dim, command),
    Platform::Glutin => pick_and_run_demo::<GlutinSurface>(&mut services, dim, command),
  };

  if let Err(e) = result {
    log::error!("{}", e);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn platform_from_str() {
    assert_eq!("glfw".parse::<Platform>(), Ok(Platform::Glfw));
    assert_eq!("glutin".parse::<Platform>(), Ok(Platform::Glutin));
    assert!("sdl2".parse::<Platform>().is_err());
  }

  #[test]
  fn escape_and_close_quit() {
    assert_eq!(adapt_event(SurfaceEvent::Close), Some(InputAction::Quit));
    assert_eq!(
      adapt_event(SurfaceEvent::KeyReleased(Key::Escape)),
      Some(InputAction::Quit)
    );
    assert_eq!(adapt_event(SurfaceEvent::KeyPressed(Key::Escape)), None);
  }

  #[test]
  fn space_toggles() {
    assert_eq!(
      adapt_event(SurfaceEvent::KeyReleased(Key::Space)),
      Some(InputAction::MainToggle)
    );
  }

  #[test]
  fn resize_is_forwarded() {
    assert_eq!(
      adapt_event(SurfaceEvent::FramebufferResized {
        width: 640,
        height: 480
      }),
      Some(InputAction::Resized {
        width: 640,
        height: 480
      })
    );
  }

  #[test]
  fn subcommand_carries_demo_flags() {
    let opts = CLIOpts::from_iter(vec![
      "glpipe-desktop",
      "--platform",
      "glutin",
      "cube-full",
      "--sep",
      "--all",
    ]);

    assert_eq!(opts.platform, Platform::Glutin);
    assert!(matches!(opts.demo, Some(DemoCommand::CubeFull(_))));
  }

  #[test]
  fn window_modes() {
    assert_eq!(
      window_dim(false, false),
      WindowDim::Windowed {
        width: 800,
        height: 600
      }
    );
    assert_eq!(window_dim(true, false), WindowDim::Fullscreen);
    assert_eq!(
      window_dim(true, true),
      WindowDim::FullscreenRestricted {
        width: 800,
        height: 600
      }
    );

    let opts = CLIOpts::from_iter(vec!["glpipe-desktop", "-f", "--restricted", "tess"]);
    assert!(opts.fullscreen);
    assert!(opts.restricted);
    assert!(CLIOpts::from_iter_safe(vec!["glpipe-desktop", "--restricted", "tess"]).is_err());
  }

  #[test]
  fn list_demos_needs_no_subcommand() {
    let opts = CLIOpts::from_iter(vec!["glpipe-desktop", "--list-demos"]);

    assert!(opts.list_demos);
    assert!(opts.demo.is_none());
  }
}
