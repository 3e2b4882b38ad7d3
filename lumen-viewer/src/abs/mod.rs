//! This module contains the OpenGL side of the viewer: application setup,
//! shader management and the GPU backend models are uploaded through.

pub mod app;
pub mod backend;
pub mod shader;

pub use app::*;
pub use backend::*;
pub use shader::*;
