//! GPU backend abstraction.
//!
//! Meshes and models never talk to a graphics API directly. They hand vertex data, images and
//! draw requests to a [`GpuBackend`] and keep the opaque handles it returns. The viewer
//! implements the trait on top of OpenGL; tests use a recording mock.

use std::num::NonZeroU32;

use crate::error::GpuError;
use crate::texture::TextureImage;

/// Handle to a texture object living on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub NonZeroU32);

/// Handle to a buffer or vertex array object living on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub NonZeroU32);

/// The GPU objects backing one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshBuffers {
    pub vertex_array: BufferId,
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
}

/// One float vertex attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: i32,
    pub offset: i32,
}

/// Layout of an interleaved vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: i32,
    pub attributes: &'static [VertexAttribute],
}

/// Everything the model pipeline needs from a graphics API.
///
/// All methods are called from the thread that owns the graphics context.
pub trait GpuBackend {
    /// Allocates a vertex array with a vertex and an index buffer, uploads the data and declares
    /// the attribute layout.
    fn create_mesh_buffers(
        &self,
        vertex_data: &[u8],
        index_data: &[u8],
        layout: &VertexLayout,
    ) -> Result<MeshBuffers, GpuError>;

    fn delete_mesh_buffers(&self, buffers: MeshBuffers);

    /// Uploads a 2D texture with repeat wrapping, trilinear minification, linear magnification
    /// and a full mipmap chain. `srgb` selects an sRGB internal format for colour data.
    fn upload_texture(&self, image: &TextureImage, srgb: bool) -> Result<TextureId, GpuError>;

    fn delete_texture(&self, texture: TextureId);

    /// Activates texture unit `unit` and binds `texture` to it.
    fn bind_texture(&self, unit: u32, texture: TextureId);

    /// Makes texture unit 0 active again.
    fn reset_texture_unit(&self);

    /// Draws `index_count` indices of `buffers` as a triangle list.
    fn draw_indexed(&self, buffers: &MeshBuffers, index_count: u32);
}
