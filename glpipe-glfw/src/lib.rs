//! [GLFW](https://crates.io/crates/glfw) surface for glpipe.

#![deny(missing_docs)]

use glfw::{self, Action, Context as _, Glfw, InitError, Window, WindowEvent, WindowMode};
use glpipe::context::GraphicsContext;
pub use glpipe_gl::gl41::StateQueryError;
use glpipe_gl::GL41;
use glpipe_windowing::{ContextProfile, Key, Surface, SurfaceEvent, WindowDim, WindowOpt};
use std::{error, fmt, os::raw::c_void, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// The window or its context could not be created.
  WindowCreationFailed,

  /// Fullscreen was requested but no primary monitor was found.
  NoPrimaryMonitor,

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlfwSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create GLFW window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor for fullscreen mode"),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl From<InitError> for GlfwSurfaceError {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl From<StateQueryError> for GlfwSurfaceError {
  fn from(e: StateQueryError) -> Self {
    GlfwSurfaceError::GraphicsStateError(e)
  }
}

impl error::Error for GlfwSurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// Holds the GLFW window, its event receiver and the OpenGL 4.1 backend running on the window’s
/// context.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW window.
  pub window: Window,

  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// OpenGL 4.1 state.
  gl: GL41,
}

impl GlfwSurface {
  /// Initialize GLFW and open a window whose context matches `win_opt`.
  pub fn new_gl41(title: &str, win_opt: WindowOpt) -> Result<Self, GlfwSurfaceError> {
    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    // OpenGL hints
    let (major, minor) = win_opt.gl_version();
    glfw.window_hint(glfw::WindowHint::ContextVersion(
      major as u32,
      minor as u32,
    ));

    match win_opt.profile() {
      ContextProfile::Core => {
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
          glfw::OpenGlProfileHint::Core,
        ));
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
      }

      ContextProfile::Compatibility => {
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
          glfw::OpenGlProfileHint::Compat,
        ));
      }
    }

    glfw.window_hint(glfw::WindowHint::Samples(win_opt.num_samples()));

    let (mut window, events_rx) = create_window(&mut glfw, title, win_opt.dim())?;

    window.make_current();
    window.set_close_polling(true);
    window.set_key_polling(true);
    window.set_framebuffer_size_polling(true);

    // init OpenGL
    let gl = GL41::load_with(|s| window.get_proc_address(s) as *const c_void)?;

    log::info!(
      "GLFW surface created: {:?}, {} profile, OpenGL {}.{}",
      win_opt.dim(),
      win_opt.profile(),
      major,
      minor
    );

    Ok(GlfwSurface {
      window,
      events_rx,
      gl,
    })
  }
}

fn create_window(
  glfw: &mut Glfw,
  title: &str,
  dim: &WindowDim,
) -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError> {
  match *dim {
    WindowDim::Windowed { width, height } => glfw
      .create_window(width, height, title, WindowMode::Windowed)
      .ok_or(GlfwSurfaceError::WindowCreationFailed),

    WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
      let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;
      let vmode = monitor
        .get_video_mode()
        .ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

      glfw
        .create_window(
          vmode.width,
          vmode.height,
          title,
          WindowMode::FullScreen(monitor),
        )
        .ok_or(GlfwSurfaceError::WindowCreationFailed)
    }),

    WindowDim::FullscreenRestricted { width, height } => {
      glfw.with_primary_monitor(|glfw, monitor| {
        let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

        glfw
          .create_window(width, height, title, WindowMode::FullScreen(monitor))
          .ok_or(GlfwSurfaceError::WindowCreationFailed)
      })
    }
  }
}

unsafe impl GraphicsContext for GlfwSurface {
  type Backend = GL41;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}

impl Surface for GlfwSurface {
  type Error = GlfwSurfaceError;

  fn new(title: &str, win_opt: WindowOpt) -> Result<Self, Self::Error> {
    Self::new_gl41(title, win_opt)
  }

  fn size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  fn poll_events<'a>(&'a mut self) -> Box<dyn Iterator<Item = SurfaceEvent> + 'a> {
    self.window.glfw.poll_events();
    Box::new(glfw::flush_messages(&self.events_rx).filter_map(|(_, event)| adapt_event(event)))
  }

  fn swap_buffers(&mut self) {
    self.window.swap_buffers();
  }
}

fn adapt_event(event: WindowEvent) -> Option<SurfaceEvent> {
  match event {
    WindowEvent::Close => Some(SurfaceEvent::Close),

    WindowEvent::Key(key, _, Action::Press, _) => Some(SurfaceEvent::KeyPressed(adapt_key(key))),

    WindowEvent::Key(key, _, Action::Release, _) => {
      Some(SurfaceEvent::KeyReleased(adapt_key(key)))
    }

    WindowEvent::FramebufferSize(width, height) => Some(SurfaceEvent::FramebufferResized {
      width: width.max(0) as u32,
      height: height.max(0) as u32,
    }),

    _ => None,
  }
}

fn adapt_key(key: glfw::Key) -> Key {
  match key {
    glfw::Key::Escape => Key::Escape,
    glfw::Key::Space => Key::Space,
    glfw::Key::Up => Key::Up,
    glfw::Key::Down => Key::Down,
    glfw::Key::Left => Key::Left,
    glfw::Key::Right => Key::Right,
    _ => Key::Other,
  }
}
