//! # Shader programs, from source to pipeline
//!
//! glpipe turns GLSL source into programs a graphics backend can execute. It covers the two
//! linking models exposed by modern OpenGL:
//!
//! - **Linked programs**: every stage is compiled into its own shader object, then all of them are
//!   linked together into a single [`Program`](crate::shader::Program).
//! - **Separable programs**: each stage is compiled and linked on its own, and the resulting
//!   single-stage programs are mixed and matched in a
//!   [`ProgramPipeline`](crate::pipeline::ProgramPipeline).
//!
//! Five kinds of shader stages are supported:
//!
//! - Vertex shaders.
//! - Tessellation control shaders.
//! - Tessellation evaluation shaders.
//! - Geometry shaders.
//! - Fragment shaders.
//!
//! # Diagnostics
//!
//! Every compile, link and validation step fetches the driver log, whatever the outcome. Failures
//! are logged at warning level and successes that still produced messages at info level, through
//! the [log] facade. Logging never aborts anything: errors are returned as
//! [`BuildError`](crate::shader::BuildError) values and the caller decides what to do with them.
//!
//! # Resource ownership
//!
//! Every driver object lives in an owning value ([`Stage`](crate::shader::Stage),
//! [`Program`](crate::shader::Program), [`ProgramPipeline`](crate::pipeline::ProgramPipeline))
//! that releases it when dropped. Intermediate shader stages are thus released on every exit path
//! of the builder functions.
//!
//! # Backends
//!
//! This crate doesn’t talk to any graphics API itself. The [`backend`] module defines the traits a
//! backend implements, and a [`GraphicsContext`](crate::context::GraphicsContext) gives access to
//! such a backend.
//!
//! [log]: https://crates.io/crates/log

#![deny(missing_docs)]

pub mod backend;
pub mod context;
pub mod pipeline;
pub mod shader;
