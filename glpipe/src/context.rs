//! Graphics context.
//!
//! A graphics context is an object that gives access to a graphics device through a backend. This
//! crate doesn’t create contexts: windowing crates do.
//!
//! # On context and threads
//!
//!   - An object which type implements `GraphicsContext` must be `!Send` and `!Sync`. It cannot be
//!     moved nor shared between threads.
//!   - Only a single context can exist per thread.
//!   - Builder functions must run on the thread owning the context.

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext {
  /// Backend type of the context.
  type Backend: ?Sized;

  /// Access the underlying backend.
  fn backend(&mut self) -> &mut Self::Backend;
}
