//! OpenGL implementation of the model pipeline's GPU backend.
//!
//! [`GlBackend`] wraps the shared `glow` context and turns the opaque handles used by
//! `lumen_core` back into native GL object names.

use std::sync::Arc;

use glow::HasContext;
use lumen_core::{
    BufferId, GpuBackend, GpuError, MeshBuffers, PixelFormat, TextureId, TextureImage,
    VertexLayout,
};

/// A [`GpuBackend`] drawing through OpenGL 3.3.
pub struct GlBackend {
    gl: Arc<glow::Context>,
}

impl GlBackend {
    pub fn new(gl: &Arc<glow::Context>) -> Self {
        Self { gl: Arc::clone(gl) }
    }
}

fn buffer(id: BufferId) -> glow::Buffer {
    glow::NativeBuffer(id.0)
}

fn vertex_array(id: BufferId) -> glow::VertexArray {
    glow::NativeVertexArray(id.0)
}

fn texture(id: TextureId) -> glow::Texture {
    glow::NativeTexture(id.0)
}

/// `(internal format, pixel format)` for an upload.
fn gl_formats(format: PixelFormat, srgb: bool) -> (u32, u32) {
    match (format, srgb) {
        (PixelFormat::Red, _) => (glow::RED, glow::RED),
        (PixelFormat::Rgb, false) => (glow::RGB, glow::RGB),
        (PixelFormat::Rgb, true) => (glow::SRGB8, glow::RGB),
        (PixelFormat::Rgba, false) => (glow::RGBA, glow::RGBA),
        (PixelFormat::Rgba, true) => (glow::SRGB8_ALPHA8, glow::RGBA),
    }
}

/// Runs `release` when `result` is an error, so objects created earlier do not leak.
fn release_on_err<T, E>(result: Result<T, E>, release: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        release();
    }
    result
}

impl GpuBackend for GlBackend {
    fn create_mesh_buffers(
        &self,
        vertex_data: &[u8],
        index_data: &[u8],
        layout: &VertexLayout,
    ) -> Result<MeshBuffers, GpuError> {
        let gl = &self.gl;
        unsafe {
            let vao = gl.create_vertex_array()?;
            let vbo = release_on_err(gl.create_buffer(), || gl.delete_vertex_array(vao))?;
            let ebo = release_on_err(gl.create_buffer(), || {
                gl.delete_buffer(vbo);
                gl.delete_vertex_array(vao);
            })?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, vertex_data, glow::STATIC_DRAW);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, index_data, glow::STATIC_DRAW);

            for attribute in layout.attributes {
                gl.enable_vertex_attrib_array(attribute.location);
                gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.components,
                    glow::FLOAT,
                    false,
                    layout.stride,
                    attribute.offset,
                );
            }

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(MeshBuffers {
                vertex_array: BufferId(vao.0),
                vertex_buffer: BufferId(vbo.0),
                index_buffer: BufferId(ebo.0),
            })
        }
    }

    fn delete_mesh_buffers(&self, buffers: MeshBuffers) {
        unsafe {
            self.gl.delete_buffer(buffer(buffers.vertex_buffer));
            self.gl.delete_buffer(buffer(buffers.index_buffer));
            self.gl.delete_vertex_array(vertex_array(buffers.vertex_array));
        }
    }

    fn upload_texture(&self, image: &TextureImage, srgb: bool) -> Result<TextureId, GpuError> {
        let expected = image.width as usize * image.height as usize * image.format.channel_count();
        if image.pixels.len() != expected {
            return Err(GpuError(format!(
                "texture data has {} bytes, expected {}",
                image.pixels.len(),
                expected
            )));
        }

        let (internal_format, format) = gl_formats(image.format, srgb);
        let gl = &self.gl;
        unsafe {
            let id = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(id));
            // Rows of 1- and 3-channel images are not 4-byte aligned.
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format as i32,
                image.width as i32,
                image.height as i32,
                0,
                format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(image.pixels.as_slice())),
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(TextureId(id.0))
        }
    }

    fn delete_texture(&self, id: TextureId) {
        unsafe {
            self.gl.delete_texture(texture(id));
        }
    }

    fn bind_texture(&self, unit: u32, id: TextureId) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture(id)));
        }
    }

    fn reset_texture_unit(&self) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
        }
    }

    fn draw_indexed(&self, buffers: &MeshBuffers, index_count: u32) {
        unsafe {
            self.gl.bind_vertex_array(Some(vertex_array(buffers.vertex_array)));
            self.gl
                .draw_elements(glow::TRIANGLES, index_count as i32, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }
}
