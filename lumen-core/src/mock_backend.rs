//! Mock GPU backend and shader for unit tests (no GPU required).
//!
//! [`MockBackend`] hands out increasing fake handles and records every call, so tests can
//! check what meshes and models asked the GPU to do.

use std::cell::RefCell;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::backend::{BufferId, GpuBackend, MeshBuffers, TextureId, VertexLayout};
use crate::error::{GpuError, ImportError};
use crate::scene::{PostProcess, Scene, SceneImporter};
use crate::shader::{Shader, UniformValue};
use crate::texture::{PixelFormat, Texture, TextureImage, TextureKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateMeshBuffers {
        vertex_bytes: usize,
        index_bytes: usize,
        attributes: usize,
    },
    DeleteMeshBuffers(MeshBuffers),
    UploadTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        format: PixelFormat,
        srgb: bool,
    },
    DeleteTexture(TextureId),
    BindTexture {
        unit: u32,
        texture: TextureId,
    },
    ResetTextureUnit,
    DrawIndexed {
        buffers: MeshBuffers,
        index_count: u32,
    },
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<BackendCall>,
    next_id: u32,
    live_mesh_buffers: Vec<MeshBuffers>,
    live_textures: Vec<TextureId>,
    fail_mesh_buffers: bool,
    fail_uploads: bool,
}

impl MockState {
    fn next_id(&mut self) -> NonZeroU32 {
        self.next_id += 1;
        NonZeroU32::new(self.next_id).unwrap()
    }
}

#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mock together with the same backend as a trait object.
    pub fn shared() -> (Arc<MockBackend>, Arc<dyn GpuBackend>) {
        let mock = Arc::new(MockBackend::new());
        let backend: Arc<dyn GpuBackend> = mock.clone();
        (mock, backend)
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn upload_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::UploadTexture { .. }))
            .count()
    }

    /// Index counts of every draw call, in order.
    pub fn draw_calls(&self) -> Vec<u32> {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                BackendCall::DrawIndexed { index_count, .. } => Some(*index_count),
                _ => None,
            })
            .collect()
    }

    pub fn live_mesh_buffers(&self) -> Vec<MeshBuffers> {
        self.state.lock().unwrap().live_mesh_buffers.clone()
    }

    pub fn live_textures(&self) -> Vec<TextureId> {
        self.state.lock().unwrap().live_textures.clone()
    }

    pub fn fail_mesh_buffers(&self, fail: bool) {
        self.state.lock().unwrap().fail_mesh_buffers = fail;
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.state.lock().unwrap().fail_uploads = fail;
    }

    /// Makes a texture value with a fresh handle without recording an upload.
    pub fn texture(&self, kind: TextureKind, path: &str) -> Texture {
        Texture {
            id: TextureId(self.state.lock().unwrap().next_id()),
            kind,
            path: path.to_string(),
        }
    }
}

impl GpuBackend for MockBackend {
    fn create_mesh_buffers(
        &self,
        vertex_data: &[u8],
        index_data: &[u8],
        layout: &VertexLayout,
    ) -> Result<MeshBuffers, GpuError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_mesh_buffers {
            return Err(GpuError("mesh buffers unavailable".to_string()));
        }
        let buffers = MeshBuffers {
            vertex_array: BufferId(state.next_id()),
            vertex_buffer: BufferId(state.next_id()),
            index_buffer: BufferId(state.next_id()),
        };
        state.calls.push(BackendCall::CreateMeshBuffers {
            vertex_bytes: vertex_data.len(),
            index_bytes: index_data.len(),
            attributes: layout.attributes.len(),
        });
        state.live_mesh_buffers.push(buffers);
        Ok(buffers)
    }

    fn delete_mesh_buffers(&self, buffers: MeshBuffers) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BackendCall::DeleteMeshBuffers(buffers));
        state.live_mesh_buffers.retain(|b| *b != buffers);
    }

    fn upload_texture(&self, image: &TextureImage, srgb: bool) -> Result<TextureId, GpuError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_uploads {
            return Err(GpuError("texture upload failed".to_string()));
        }
        let texture = TextureId(state.next_id());
        state.calls.push(BackendCall::UploadTexture {
            texture,
            width: image.width,
            height: image.height,
            format: image.format,
            srgb,
        });
        state.live_textures.push(texture);
        Ok(texture)
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BackendCall::DeleteTexture(texture));
        state.live_textures.retain(|t| *t != texture);
    }

    fn bind_texture(&self, unit: u32, texture: TextureId) {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(BackendCall::BindTexture { unit, texture });
    }

    fn reset_texture_unit(&self) {
        self.state.lock().unwrap().calls.push(BackendCall::ResetTextureUnit);
    }

    fn draw_indexed(&self, buffers: &MeshBuffers, index_count: u32) {
        self.state.lock().unwrap().calls.push(BackendCall::DrawIndexed {
            buffers: *buffers,
            index_count,
        });
    }
}

/// Shader that remembers the uniforms set on it.
#[derive(Debug, Default)]
pub struct MockShader {
    uniforms: RefCell<Vec<(String, UniformValue)>>,
}

impl MockShader {
    pub fn uniforms(&self) -> Vec<(String, UniformValue)> {
        self.uniforms.borrow().clone()
    }
}

impl Shader for MockShader {
    fn use_program(&self) {}

    fn set(&self, name: &str, value: UniformValue) {
        self.uniforms.borrow_mut().push((name.to_string(), value));
    }
}

/// Importer returning a prepared scene, or an error for every path.
pub struct MockImporter {
    result: Result<Scene, ImportError>,
    requested: Mutex<Vec<PostProcess>>,
}

impl MockImporter {
    pub fn new(scene: Scene) -> Self {
        Self {
            result: Ok(scene),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: ImportError) -> Self {
        Self {
            result: Err(err),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Post-processing flags of every import call.
    pub fn requested(&self) -> Vec<PostProcess> {
        self.requested.lock().unwrap().clone()
    }
}

impl SceneImporter for MockImporter {
    fn import(&self, _path: &Path, flags: PostProcess) -> Result<Scene, ImportError> {
        self.requested.lock().unwrap().push(flags);
        self.result.clone()
    }
}
