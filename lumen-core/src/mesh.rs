//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct, one drawable unit owning its vertex and index
//! buffers on the GPU side, and the interleaved [`Vertex`] it is built from.

use std::mem::{offset_of, size_of};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::backend::{GpuBackend, MeshBuffers, VertexAttribute, VertexLayout};
use crate::error::GpuError;
use crate::shader::{Shader, UniformValue};
use crate::texture::{Texture, TextureKind};

/// Interleaved vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl Vertex {
    const ATTRIBUTES: [VertexAttribute; 5] = [
        VertexAttribute {
            location: 0,
            components: 3,
            offset: offset_of!(Vertex, position) as i32,
        },
        VertexAttribute {
            location: 1,
            components: 3,
            offset: offset_of!(Vertex, normal) as i32,
        },
        VertexAttribute {
            location: 2,
            components: 2,
            offset: offset_of!(Vertex, tex_coords) as i32,
        },
        VertexAttribute {
            location: 3,
            components: 3,
            offset: offset_of!(Vertex, tangent) as i32,
        },
        VertexAttribute {
            location: 4,
            components: 3,
            offset: offset_of!(Vertex, bitangent) as i32,
        },
    ];

    /// Attribute layout: position, normal, tex coords, tangent, bitangent at locations 0..=4.
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: size_of::<Vertex>() as i32,
        attributes: &Self::ATTRIBUTES,
    };
}

/// Represents a mesh stored on the GPU side.
pub struct Mesh {
    backend: Arc<dyn GpuBackend>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    textures: Vec<Texture>,
    buffers: MeshBuffers,
}

impl Mesh {
    /// Creates a new mesh and uploads its vertex and index data.
    ///
    /// `indices` is a triangle list. The textures share their GPU handles with whoever
    /// loaded them; the mesh never deletes them.
    pub fn new(
        backend: &Arc<dyn GpuBackend>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<Texture>,
    ) -> Result<Self, GpuError> {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));

        let buffers = backend.create_mesh_buffers(
            bytemuck::cast_slice(vertices.as_slice()),
            bytemuck::cast_slice(indices.as_slice()),
            &Vertex::LAYOUT,
        )?;

        Ok(Self {
            backend: Arc::clone(backend),
            vertices,
            indices,
            textures,
            buffers,
        })
    }

    /// Sampler uniform names and the texture unit each one is bound to.
    ///
    /// Texture `i` goes to unit `i`; names count up per kind starting at 1, e.g.
    /// `texture_diffuse1`, `texture_diffuse2`, `texture_specular1`.
    pub fn sampler_bindings(&self) -> Vec<(String, u32)> {
        let mut counters = [0u32; TextureKind::ALL.len()];
        self.textures
            .iter()
            .enumerate()
            .map(|(unit, texture)| {
                let counter = &mut counters[texture.kind.index()];
                *counter += 1;
                (
                    format!("{}{}", texture.kind.uniform_prefix(), counter),
                    unit as u32,
                )
            })
            .collect()
    }

    /// Binds the textures, points the sampler uniforms at them and draws the mesh.
    pub fn draw(&self, shader: &dyn Shader) {
        for ((name, unit), texture) in self.sampler_bindings().into_iter().zip(&self.textures) {
            self.backend.bind_texture(unit, texture.id);
            shader.set(&name, UniformValue::Int(unit as i32));
        }

        self.backend.draw_indexed(&self.buffers, self.indices.len() as u32);

        self.backend.reset_texture_unit();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    // Returns the amount of indices used in the mesh
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn buffers(&self) -> MeshBuffers {
        self.buffers
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("textures", &self.textures)
            .field("buffers", &self.buffers)
            .finish()
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        self.backend.delete_mesh_buffers(self.buffers);
    }
}
