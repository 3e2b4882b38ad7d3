//! Model loading.
//!
//! A [`ModelLoader`] imports a scene file, walks its node tree depth-first and turns every
//! referenced scene mesh into a GPU [`Mesh`]. Material textures go through the model's
//! [`TextureCache`], so an image referenced by many materials is decoded and uploaded once.
//!
//! Loading is all-or-nothing: if anything fails, the resources created so far are released
//! and [`ModelLoader::load`] returns the error. [`ModelLoader::load_or_empty`] and
//! [`Model::new`] log the error instead and hand back a model with no meshes, which is safe to
//! draw.
//!
//! Missing or broken texture images do not fail the load. They are logged and left out of the
//! mesh's texture list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::backend::GpuBackend;
use crate::error::ModelError;
use crate::mesh::{Mesh, Vertex};
use crate::obj::ObjImporter;
use crate::scene::{PostProcess, Scene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
use crate::shader::Shader;
use crate::texture::{
    FileImageDecoder, ImageDecoder, Texture, TextureCache, TextureKind, TextureSlot, TextureSlotMap,
};

/// How a model is imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    /// Upload diffuse textures with an sRGB internal format.
    pub gamma_correction: bool,
    pub post_process: PostProcess,
    pub texture_slots: TextureSlotMap,
}

/// A loaded model: a flat list of meshes plus the textures they share.
pub struct Model {
    backend: Arc<dyn GpuBackend>,
    meshes: Vec<Mesh>,
    textures_loaded: TextureCache,
    directory: PathBuf,
    gamma_correction: bool,
}

impl Model {
    /// Loads an OBJ model with default options.
    ///
    /// Never fails: on error the problem is logged and the model has no meshes.
    pub fn new(backend: &Arc<dyn GpuBackend>, path: impl AsRef<Path>, gamma_correction: bool) -> Self {
        ModelLoader::new(backend)
            .with_options(ModelOptions {
                gamma_correction,
                ..ModelOptions::default()
            })
            .load_or_empty(path)
    }

    /// A model without meshes.
    pub fn empty(backend: &Arc<dyn GpuBackend>, gamma_correction: bool) -> Self {
        Self {
            backend: Arc::clone(backend),
            meshes: Vec::new(),
            textures_loaded: TextureCache::new(),
            directory: PathBuf::new(),
            gamma_correction,
        }
    }

    /// Draws every mesh, in load order.
    pub fn draw(&self, shader: &dyn Shader) {
        for mesh in &self.meshes {
            mesh.draw(shader);
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Every texture uploaded for this model.
    pub fn textures_loaded(&self) -> &TextureCache {
        &self.textures_loaded
    }

    /// Directory texture paths are resolved against.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn gamma_correction(&self) -> bool {
        self.gamma_correction
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("directory", &self.directory)
            .field("meshes", &self.meshes)
            .field("textures_loaded", &self.textures_loaded)
            .field("gamma_correction", &self.gamma_correction)
            .finish()
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        self.meshes.clear();
        for texture in self.textures_loaded.drain() {
            self.backend.delete_texture(texture.id);
        }
    }
}

/// Builds [`Model`]s from scene files.
pub struct ModelLoader {
    backend: Arc<dyn GpuBackend>,
    importer: Box<dyn SceneImporter>,
    decoder: Box<dyn ImageDecoder>,
    options: ModelOptions,
}

impl ModelLoader {
    /// A loader reading OBJ files and decoding images from disk.
    pub fn new(backend: &Arc<dyn GpuBackend>) -> Self {
        Self {
            backend: Arc::clone(backend),
            importer: Box::new(ObjImporter),
            decoder: Box::new(FileImageDecoder),
            options: ModelOptions::default(),
        }
    }

    pub fn with_importer(mut self, importer: impl SceneImporter + 'static) -> Self {
        self.importer = Box::new(importer);
        self
    }

    pub fn with_decoder(mut self, decoder: impl ImageDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Imports `path` and uploads all of its meshes and textures.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Model, ModelError> {
        let path = path.as_ref();
        let scene = self.importer.import(path, self.options.post_process)?;
        if scene.incomplete {
            return Err(ModelError::IncompleteScene);
        }
        let root = scene.root.as_ref().ok_or(ModelError::MissingRootNode)?;

        let mut model = Model::empty(&self.backend, self.options.gamma_correction);
        model.directory = path.parent().map(Path::to_path_buf).unwrap_or_default();

        self.process_node(&mut model, root, &scene)?;

        log::info!(
            "Loaded model {}: {} meshes, {} textures",
            path.display(),
            model.meshes.len(),
            model.textures_loaded.len()
        );
        Ok(model)
    }

    /// Like [`ModelLoader::load`], but logs failures and returns an empty model.
    pub fn load_or_empty(&self, path: impl AsRef<Path>) -> Model {
        let path = path.as_ref();
        self.load(path).unwrap_or_else(|err| {
            log::error!("Failed to load model {}: {}", path.display(), err);
            Model::empty(&self.backend, self.options.gamma_correction)
        })
    }

    fn process_node(&self, model: &mut Model, node: &SceneNode, scene: &Scene) -> Result<(), ModelError> {
        for &index in &node.meshes {
            let scene_mesh = scene.meshes.get(index).ok_or(ModelError::MissingMesh(index))?;
            let mesh = self.process_mesh(model, index, scene_mesh, scene)?;
            model.meshes.push(mesh);
        }
        for child in &node.children {
            self.process_node(model, child, scene)?;
        }
        Ok(())
    }

    fn process_mesh(
        &self,
        model: &mut Model,
        index: usize,
        mesh: &SceneMesh,
        scene: &Scene,
    ) -> Result<Mesh, ModelError> {
        let vec3_at = |data: &Option<Vec<Vec3>>, i: usize| {
            data.as_ref().and_then(|d| d.get(i)).copied().unwrap_or(Vec3::ZERO)
        };

        let vertices: Vec<Vertex> = (0..mesh.positions.len())
            .map(|i| Vertex {
                position: mesh.positions[i],
                normal: vec3_at(&mesh.normals, i),
                tex_coords: mesh
                    .tex_coords
                    .as_ref()
                    .and_then(|uvs| uvs.get(i))
                    .copied()
                    .unwrap_or(Vec2::ZERO),
                tangent: vec3_at(&mesh.tangents, i),
                bitangent: vec3_at(&mesh.bitangents, i),
            })
            .collect();

        let indices: Vec<u32> = mesh.faces.iter().flatten().copied().collect();
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(ModelError::InvalidIndex {
                mesh: index,
                index: bad,
                vertex_count: vertices.len(),
            });
        }

        let mut textures = Vec::new();
        match scene.materials.get(mesh.material_index) {
            Some(material) => {
                for mapping in self.options.texture_slots.iter() {
                    textures.extend(self.load_material_textures(model, material, mapping.slot, mapping.kind));
                }
            }
            None => log::warn!(
                "Mesh {} ({}) references missing material {}",
                index,
                mesh.name,
                mesh.material_index
            ),
        }

        Ok(Mesh::new(&self.backend, vertices, indices, textures)?)
    }

    /// Loads the textures `material` declares in `slot`, reusing cached ones by path.
    fn load_material_textures(
        &self,
        model: &mut Model,
        material: &SceneMaterial,
        slot: TextureSlot,
        kind: TextureKind,
    ) -> Vec<Texture> {
        let mut textures = Vec::new();
        for path in material.textures(slot) {
            if let Some(texture) = model.textures_loaded.find(path) {
                textures.push(texture.clone());
                continue;
            }

            let file = model.directory.join(path);
            let image = match self.decoder.decode(&file) {
                Ok(image) => image,
                Err(err) => {
                    log::warn!("{}", err);
                    continue;
                }
            };
            let srgb = model.gamma_correction && kind.is_color();
            match self.backend.upload_texture(&image, srgb) {
                Ok(id) => {
                    log::debug!("Uploaded {:?} texture {}", kind, file.display());
                    let texture = Texture {
                        id,
                        kind,
                        path: path.clone(),
                    };
                    textures.push(texture.clone());
                    model.textures_loaded.insert(texture);
                }
                Err(err) => log::warn!("Failed to upload texture {}: {}", file.display(), err),
            }
        }
        textures
    }
}
