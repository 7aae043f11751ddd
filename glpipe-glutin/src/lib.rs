//! The [glutin] windowing implementation for [glpipe-windowing].
//!
//! [glutin]: https://crates.io/crates/glutin
//! [glpipe-windowing]: ../glpipe_windowing/index.html

#![deny(missing_docs)]

pub use glutin;
use glutin::{
  dpi::PhysicalSize,
  event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
  event_loop::{ControlFlow, EventLoop},
  platform::run_return::EventLoopExtRunReturn,
  window::{Fullscreen, WindowBuilder},
  Api, ContextBuilder, ContextError, CreationError, GlProfile, GlRequest, NotCurrent,
  PossiblyCurrent, WindowedContext,
};

use glpipe::context::GraphicsContext;
pub use glpipe_gl::gl41::StateQueryError;
use glpipe_gl::GL41;
use glpipe_windowing::{ContextProfile, Key, Surface, SurfaceEvent, WindowDim, WindowOpt};

use std::error;
use std::fmt;
use std::os::raw::c_void;

/// Error that might occur when creating a Glutin surface.
#[derive(Debug)]
pub enum GlutinError {
  /// Something went wrong when creating the Glutin surface. The carried [`CreationError`] provides
  /// more information.
  CreationError(CreationError),
  /// OpenGL context error.
  ContextError(ContextError),
  /// Graphics state error that might occur when querying the initial state.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlutinError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlutinError::CreationError(ref e) => write!(f, "Glutin surface creation error: {}", e),
      GlutinError::ContextError(ref e) => write!(f, "Glutin OpenGL context creation error: {}", e),
      GlutinError::GraphicsStateError(ref e) => {
        write!(f, "OpenGL graphics state initialization error: {}", e)
      }
    }
  }
}

impl error::Error for GlutinError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlutinError::CreationError(e) => Some(e),
      GlutinError::ContextError(e) => Some(e),
      GlutinError::GraphicsStateError(e) => Some(e),
    }
  }
}

impl From<CreationError> for GlutinError {
  fn from(e: CreationError) -> Self {
    GlutinError::CreationError(e)
  }
}

impl From<ContextError> for GlutinError {
  fn from(e: ContextError) -> Self {
    GlutinError::ContextError(e)
  }
}

impl From<StateQueryError> for GlutinError {
  fn from(e: StateQueryError) -> Self {
    GlutinError::GraphicsStateError(e)
  }
}

/// The Glutin surface.
///
/// Owns the event loop of its window, which is pumped by [`Surface::poll_events`].
pub struct GlutinSurface {
  /// The windowed context.
  pub ctx: WindowedContext<PossiblyCurrent>,
  event_loop: EventLoop<()>,
  /// OpenGL 4.1 state.
  gl: GL41,
}

unsafe impl GraphicsContext for GlutinSurface {
  type Backend = GL41;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}

impl GlutinSurface {
  /// Create a new [`GlutinSurface`] by consuming a [`WindowBuilder`] and a [`ContextBuilder`].
  ///
  /// This is an alternative method to [`Surface::new`] that is more flexible as you have access to
  /// the whole `glutin` types. `ctx_builder` receives a builder already set up for an OpenGL 4.1
  /// core context.
  pub fn from_builders<WB, CB>(window_builder: WB, ctx_builder: CB) -> Result<Self, GlutinError>
  where
    WB: FnOnce(WindowBuilder) -> WindowBuilder,
    CB: FnOnce(ContextBuilder<NotCurrent>) -> ContextBuilder<NotCurrent>,
  {
    let event_loop = EventLoop::new();

    let window_builder = window_builder(WindowBuilder::new());

    let windowed_ctx = ctx_builder(
      ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (4, 1)))
        .with_gl_profile(GlProfile::Core),
    )
    .build_windowed(window_builder, &event_loop)?;

    let ctx = unsafe { windowed_ctx.make_current().map_err(|(_, e)| e)? };

    // init OpenGL
    let gl = GL41::load_with(|s| ctx.get_proc_address(s) as *const c_void)?;

    ctx.window().set_visible(true);

    Ok(GlutinSurface {
      ctx,
      event_loop,
      gl,
    })
  }
}

impl Surface for GlutinSurface {
  type Error = GlutinError;

  fn new(title: &str, win_opt: WindowOpt) -> Result<Self, Self::Error> {
    let (major, minor) = win_opt.gl_version();
    let profile = match win_opt.profile() {
      ContextProfile::Core => GlProfile::Core,
      ContextProfile::Compatibility => GlProfile::Compatibility,
    };

    let surface = Self::from_builders(
      |wb| {
        let wb = wb.with_title(title);

        match *win_opt.dim() {
          WindowDim::Windowed { width, height } => {
            wb.with_inner_size(PhysicalSize::new(width, height))
          }
          WindowDim::Fullscreen => wb.with_fullscreen(Some(Fullscreen::Borderless(None))),
          WindowDim::FullscreenRestricted { width, height } => wb
            .with_inner_size(PhysicalSize::new(width, height))
            .with_fullscreen(Some(Fullscreen::Borderless(None))),
        }
      },
      |cb| {
        cb.with_gl(GlRequest::Specific(Api::OpenGl, (major, minor)))
          .with_gl_profile(profile)
          .with_multisampling(win_opt.num_samples().unwrap_or(0) as u16)
          .with_double_buffer(Some(true))
      },
    )?;

    log::info!(
      "glutin surface created: {:?}, {} profile, OpenGL {}.{}",
      win_opt.dim(),
      win_opt.profile(),
      major,
      minor
    );

    Ok(surface)
  }

  fn size(&self) -> [u32; 2] {
    let size = self.ctx.window().inner_size();
    [size.width, size.height]
  }

  fn poll_events<'a>(&'a mut self) -> Box<dyn Iterator<Item = SurfaceEvent> + 'a> {
    let mut events = Vec::new();

    self.event_loop.run_return(|event, _, control_flow| {
      *control_flow = ControlFlow::Poll;

      match event {
        Event::WindowEvent { event, .. } => events.extend(adapt_event(event)),
        Event::MainEventsCleared => *control_flow = ControlFlow::Exit,
        _ => (),
      }
    });

    for event in &events {
      if let SurfaceEvent::FramebufferResized { width, height } = *event {
        self.ctx.resize(PhysicalSize::new(width, height));
      }
    }

    Box::new(events.into_iter())
  }

  fn swap_buffers(&mut self) {
    if let Err(e) = self.ctx.swap_buffers() {
      log::warn!("cannot swap buffers: {}", e);
    }
  }
}

fn adapt_event(event: WindowEvent<'_>) -> Option<SurfaceEvent> {
  match event {
    WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(SurfaceEvent::Close),

    WindowEvent::KeyboardInput {
      input:
        KeyboardInput {
          state,
          virtual_keycode,
          ..
        },
      ..
    } => {
      let key = virtual_keycode.map_or(Key::Other, adapt_key);

      match state {
        ElementState::Pressed => Some(SurfaceEvent::KeyPressed(key)),
        ElementState::Released => Some(SurfaceEvent::KeyReleased(key)),
      }
    }

    WindowEvent::Resized(size) => Some(SurfaceEvent::FramebufferResized {
      width: size.width,
      height: size.height,
    }),

    _ => None,
  }
}

fn adapt_key(key: VirtualKeyCode) -> Key {
  match key {
    VirtualKeyCode::Escape => Key::Escape,
    VirtualKeyCode::Space => Key::Space,
    VirtualKeyCode::Up => Key::Up,
    VirtualKeyCode::Down => Key::Down,
    VirtualKeyCode::Left => Key::Left,
    VirtualKeyCode::Right => Key::Right,
    _ => Key::Other,
  }
}
