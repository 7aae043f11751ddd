//! OpenGL error reporting.

use gl::types::*;
use std::error;
use std::fmt;

// glGetError keeps returning errors when no context is current; stop draining after that many.
const MAX_DRAINED_ERRORS: usize = 32;

/// Error flag reported by `glGetError`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GlErrorKind {
  /// `GL_INVALID_ENUM`.
  InvalidEnum,
  /// `GL_INVALID_VALUE`.
  InvalidValue,
  /// `GL_INVALID_OPERATION`.
  InvalidOperation,
  /// `GL_INVALID_FRAMEBUFFER_OPERATION`.
  InvalidFramebufferOperation,
  /// `GL_OUT_OF_MEMORY`.
  OutOfMemory,
  /// `GL_STACK_UNDERFLOW`.
  StackUnderflow,
  /// `GL_STACK_OVERFLOW`.
  StackOverflow,
  /// Any other code.
  Unknown(GLenum),
}

impl GlErrorKind {
  pub(crate) fn from_glenum(code: GLenum) -> Self {
    match code {
      gl::INVALID_ENUM => GlErrorKind::InvalidEnum,
      gl::INVALID_VALUE => GlErrorKind::InvalidValue,
      gl::INVALID_OPERATION => GlErrorKind::InvalidOperation,
      gl::INVALID_FRAMEBUFFER_OPERATION => GlErrorKind::InvalidFramebufferOperation,
      gl::OUT_OF_MEMORY => GlErrorKind::OutOfMemory,
      gl::STACK_UNDERFLOW => GlErrorKind::StackUnderflow,
      gl::STACK_OVERFLOW => GlErrorKind::StackOverflow,
      _ => GlErrorKind::Unknown(code),
    }
  }
}

impl fmt::Display for GlErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlErrorKind::InvalidEnum => f.write_str("GL_INVALID_ENUM"),
      GlErrorKind::InvalidValue => f.write_str("GL_INVALID_VALUE"),
      GlErrorKind::InvalidOperation => f.write_str("GL_INVALID_OPERATION"),
      GlErrorKind::InvalidFramebufferOperation => f.write_str("GL_INVALID_FRAMEBUFFER_OPERATION"),
      GlErrorKind::OutOfMemory => f.write_str("GL_OUT_OF_MEMORY"),
      GlErrorKind::StackUnderflow => f.write_str("GL_STACK_UNDERFLOW"),
      GlErrorKind::StackOverflow => f.write_str("GL_STACK_OVERFLOW"),
      GlErrorKind::Unknown(code) => write!(f, "unknown OpenGL error 0x{:04X}", code),
    }
  }
}

/// An OpenGL error, with the context it was checked in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GlError {
  /// First error flag that was raised.
  pub kind: GlErrorKind,
  /// What was being done when the error was checked.
  pub context: String,
}

impl fmt::Display for GlError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "OpenGL error {} ({})", self.kind, self.context)
  }
}

impl error::Error for GlError {}

/// Drain the error flags, logging every one of them, and report the first.
pub(crate) unsafe fn check_error(context: &str) -> Result<(), GlError> {
  let mut first = None;

  for _ in 0..MAX_DRAINED_ERRORS {
    let code = gl::GetError();

    if code == gl::NO_ERROR {
      break;
    }

    let kind = GlErrorKind::from_glenum(code);
    log::warn!("OpenGL error {}: {}", kind, context);

    if first.is_none() {
      first = Some(kind);
    }
  }

  match first {
    Some(kind) => Err(GlError {
      kind,
      context: context.to_owned(),
    }),
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_codes() {
    assert_eq!(
      GlErrorKind::from_glenum(gl::INVALID_ENUM),
      GlErrorKind::InvalidEnum
    );
    assert_eq!(
      GlErrorKind::from_glenum(gl::OUT_OF_MEMORY),
      GlErrorKind::OutOfMemory
    );
    assert_eq!(
      GlErrorKind::from_glenum(0x1234),
      GlErrorKind::Unknown(0x1234)
    );
  }

  #[test]
  fn display() {
    let e = GlError {
      kind: GlErrorKind::InvalidOperation,
      context: "draw cube".to_owned(),
    };

    assert_eq!(e.to_string(), "OpenGL error GL_INVALID_OPERATION (draw cube)");
    assert_eq!(
      GlErrorKind::Unknown(0xBEEF).to_string(),
      "unknown OpenGL error 0xBEEF"
    );
  }
}
