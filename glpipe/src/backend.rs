//! Backend interfacing.
//!
//! Backends implement the traits of this module. Each trait is `unsafe` to implement: the owning
//! types of this crate rely on the backend releasing exactly the objects it is asked to release.

pub mod program_pipeline;
pub mod shader;
