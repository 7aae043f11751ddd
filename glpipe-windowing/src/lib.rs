//! # glpipe windowing
//!
//! Base, abstract crate for the windowing types shared by glpipe surfaces. `glpipe` builds shader
//! programs and pipelines over a [`GraphicsContext`], but it does not create that context: this is
//! tied to the window system the application targets. The `glpipe-*` surface crates each provide
//! one way to open a window with a current OpenGL context, and they all speak the types from this
//! crate so that the code running on top of them does not care which one is in use.
//!
//! # What’s included
//!
//! - [`WindowDim`]: dimension of a window and its mode (windowed, fullscreen, fullscreen
//!   restricted).
//! - [`WindowOpt`]: hints to customize the window and its context, such as multisampling, the
//!   context profile or the requested OpenGL version.
//! - [`SurfaceEvent`] and [`Key`]: the window-system events, stripped down to what the platform
//!   code reacts to.
//! - [`Surface`]: the trait every surface implements.

#![deny(missing_docs)]

use glpipe::context::GraphicsContext;
use std::error::Error;
use std::fmt;

/// Dimension metrics.
///
///   - `Windowed { width, height }` opens in windowed mode with the wished resolution.
///   - `Fullscreen` opens in fullscreen mode by using the primary monitor resolution.
///   - `FullscreenRestricted { width, height }` is a mix between `Windowed` and `Fullscreen`. It
///     opens in fullscreen mode by using the wished resolution.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
  /// Fullscreen mode (adapt to your screen).
  Fullscreen,
  /// Fullscreen mode with restricted viewport dimension.
  FullscreenRestricted {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
}

/// OpenGL context profile.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContextProfile {
  /// Forward-compatible core profile.
  Core,
  /// Compatibility profile, exposing the fixed-function and immediate-mode API.
  Compatibility,
}

impl fmt::Display for ContextProfile {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ContextProfile::Core => f.write_str("core"),
      ContextProfile::Compatibility => f.write_str("compatibility"),
    }
  }
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  num_samples: Option<u32>,
  profile: ContextProfile,
  gl_version: (u8, u8),
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to `WindowDim::Windowed { width: 960, height: 540 }`.
  /// - `num_samples` set to `None`.
  /// - `profile` set to `ContextProfile::Core`.
  /// - `gl_version` set to `(4, 1)`.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 960,
        height: 540,
      },
      num_samples: None,
      profile: ContextProfile::Core,
      gl_version: (4, 1),
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> &WindowDim {
    &self.dim
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Set the context profile.
  #[inline]
  pub fn set_profile(self, profile: ContextProfile) -> Self {
    WindowOpt { profile, ..self }
  }

  /// Get the context profile.
  #[inline]
  pub fn profile(&self) -> ContextProfile {
    self.profile
  }

  /// Set the requested OpenGL version, as `(major, minor)`.
  #[inline]
  pub fn set_gl_version(self, major: u8, minor: u8) -> Self {
    WindowOpt {
      gl_version: (major, minor),
      ..self
    }
  }

  /// Get the requested OpenGL version, as `(major, minor)`.
  #[inline]
  pub fn gl_version(&self) -> (u8, u8) {
    self.gl_version
  }
}

/// Keys the platform code reacts to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
  /// Escape.
  Escape,
  /// Space bar.
  Space,
  /// Up arrow.
  Up,
  /// Down arrow.
  Down,
  /// Left arrow.
  Left,
  /// Right arrow.
  Right,
  /// Any other key.
  Other,
}

/// Window-system event, independent of the surface that produced it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SurfaceEvent {
  /// The window was asked to close.
  Close,
  /// A key was pressed.
  KeyPressed(Key),
  /// A key was released.
  KeyReleased(Key),
  /// The framebuffer was resized.
  FramebufferResized {
    /// New width, in pixels.
    width: u32,
    /// New height, in pixels.
    height: u32,
  },
}

/// Rendering surface.
///
/// A window together with its current OpenGL context. The backend it gives access to through
/// [`GraphicsContext`] lives as long as the surface.
pub trait Surface: GraphicsContext + Sized {
  /// Type of surface errors.
  type Error: Error + 'static;

  /// Open a window titled `title`, make its context current and bootstrap the backend.
  fn new(title: &str, win_opt: WindowOpt) -> Result<Self, Self::Error>;

  /// Size of the surface’s framebuffer.
  fn size(&self) -> [u32; 2];

  /// Width of the surface’s framebuffer.
  ///
  /// # Defaults
  ///
  /// Defaults to `.size()[0]`.
  fn width(&self) -> u32 {
    self.size()[0]
  }

  /// Height of the surface’s framebuffer.
  ///
  /// # Defaults
  ///
  /// Defaults to `.size()[1]`.
  fn height(&self) -> u32 {
    self.size()[1]
  }

  /// Get an iterator over events without blocking if no event is there.
  fn poll_events<'a>(&'a mut self) -> Box<dyn Iterator<Item = SurfaceEvent> + 'a>;

  /// Swap the back and front buffers.
  fn swap_buffers(&mut self);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_window_opt() {
    let opt = WindowOpt::default();

    assert_eq!(
      opt.dim(),
      &WindowDim::Windowed {
        width: 960,
        height: 540
      }
    );
    assert_eq!(opt.num_samples(), None);
    assert_eq!(opt.profile(), ContextProfile::Core);
    assert_eq!(opt.gl_version(), (4, 1));
  }

  #[test]
  fn setters_keep_other_options() {
    let opt = WindowOpt::default()
      .set_num_samples(4)
      .set_profile(ContextProfile::Compatibility)
      .set_dim(WindowDim::Windowed {
        width: 800,
        height: 600,
      });

    assert_eq!(opt.num_samples(), Some(4));
    assert_eq!(opt.profile(), ContextProfile::Compatibility);
    assert_eq!(opt.gl_version(), (4, 1));

    let opt = opt.set_num_samples(None).set_gl_version(3, 3);
    assert_eq!(opt.num_samples(), None);
    assert_eq!(opt.gl_version(), (3, 3));
    assert_eq!(opt.profile(), ContextProfile::Compatibility);
  }

  struct FixedSurface {
    backend: (),
  }

  unsafe impl GraphicsContext for FixedSurface {
    type Backend = ();

    fn backend(&mut self) -> &mut Self::Backend {
      &mut self.backend
    }
  }

  impl Surface for FixedSurface {
    type Error = fmt::Error;

    fn new(_: &str, _: WindowOpt) -> Result<Self, Self::Error> {
      Ok(FixedSurface { backend: () })
    }

    fn size(&self) -> [u32; 2] {
      [1920, 1080]
    }

    fn poll_events<'a>(&'a mut self) -> Box<dyn Iterator<Item = SurfaceEvent> + 'a> {
      Box::new(std::iter::empty())
    }

    fn swap_buffers(&mut self) {}
  }

  #[test]
  fn width_and_height_come_from_size() {
    let surface = FixedSurface::new("fixed", WindowOpt::default()).unwrap();

    assert_eq!(surface.width(), 1920);
    assert_eq!(surface.height(), 1080);
  }

  #[test]
  fn profile_display() {
    assert_eq!(ContextProfile::Core.to_string(), "core");
    assert_eq!(ContextProfile::Compatibility.to_string(), "compatibility");
  }
}
