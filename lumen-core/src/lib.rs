//! The core of the Lumen model viewer. This crate contains the camera, the
//! scene import pipeline and the GPU-side meshes and models built from it.
//!
//! Nothing in here talks to OpenGL directly: rendering goes through the
//! [`GpuBackend`] and [`Shader`] traits, which the viewer implements on top
//! of `glow`.

pub mod backend;
pub mod camera;
pub mod error;
pub mod mesh;
pub mod model;
pub mod obj;
pub mod scene;
pub mod shader;
pub mod texture;

#[cfg(test)]
mod mock_backend;

pub use backend::{BufferId, GpuBackend, MeshBuffers, TextureId, VertexAttribute, VertexLayout};
pub use camera::{Camera, CameraConfig, Movement};
pub use error::{GpuError, ImportError, ModelError, TextureError};
pub use mesh::{Mesh, Vertex};
pub use model::{Model, ModelLoader, ModelOptions};
pub use obj::ObjImporter;
pub use scene::{PostProcess, Scene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
pub use shader::{Shader, UniformValue};
pub use texture::{
    FileImageDecoder, ImageDecoder, PixelFormat, SlotMapping, Texture, TextureCache, TextureImage,
    TextureKind, TextureSlot, TextureSlotMap,
};
