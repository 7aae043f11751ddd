//! OpenGL backends for [glpipe].
//!
//! The only backend so far is [`GL41`], targeting OpenGL 4.1 core and compatibility contexts.
//!
//! [glpipe]: https://crates.io/crates/glpipe

pub mod gl41;

pub use gl41::GL41;
