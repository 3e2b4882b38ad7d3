//! Imported scene graph and the post-processing steps importers can apply to it.
//!
//! A [`Scene`] is what a [`SceneImporter`] hands to the model loader: a tree of
//! [`SceneNode`]s referencing meshes by index, plus flat mesh and material tables. Importers
//! usually build the raw data and then call [`Scene::apply`] with the requested
//! [`PostProcess`] flags.

use std::collections::HashMap;
use std::path::Path;

use bitflags::bitflags;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::texture::TextureSlot;

bitflags! {
    /// Post-processing requested from an importer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PostProcess: u32 {
        /// Split polygons into triangles.
        const TRIANGULATE = 1 << 0;
        /// Flip the V texture coordinate (v -> 1 - v).
        const FLIP_UVS = 1 << 1;
        /// Compute per-vertex tangents and bitangents.
        const CALC_TANGENT_SPACE = 1 << 2;
        /// Compute smooth normals for meshes that have none.
        const GEN_NORMALS = 1 << 3;
    }
}

impl Default for PostProcess {
    fn default() -> Self {
        PostProcess::TRIANGULATE | PostProcess::FLIP_UVS | PostProcess::CALC_TANGENT_SPACE
    }
}

/// A node of the scene hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`Scene::meshes`].
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_meshes(mut self, meshes: impl IntoIterator<Item = usize>) -> Self {
        self.meshes.extend(meshes);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Geometry of one imported mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    /// First texture coordinate channel.
    pub tex_coords: Option<Vec<Vec2>>,
    pub tangents: Option<Vec<Vec3>>,
    pub bitangents: Option<Vec<Vec3>>,
    /// Vertex indices of each face.
    pub faces: Vec<Vec<u32>>,
    /// Index into [`Scene::materials`].
    pub material_index: usize,
}

/// Material as far as texture lookup is concerned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    /// Texture paths per slot, in declaration order.
    pub textures: HashMap<TextureSlot, Vec<String>>,
}

impl SceneMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            textures: HashMap::new(),
        }
    }

    pub fn with_texture(mut self, slot: TextureSlot, path: impl Into<String>) -> Self {
        self.add_texture(slot, path);
        self
    }

    pub fn add_texture(&mut self, slot: TextureSlot, path: impl Into<String>) {
        self.textures.entry(slot).or_default().push(path.into());
    }

    pub fn texture_count(&self, slot: TextureSlot) -> usize {
        self.textures.get(&slot).map_or(0, Vec::len)
    }

    /// Paths declared for `slot`.
    pub fn textures(&self, slot: TextureSlot) -> &[String] {
        self.textures.get(&slot).map_or(&[], Vec::as_slice)
    }
}

/// An imported scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub root: Option<SceneNode>,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    /// Set by importers when the file was read but the result is not usable as a whole.
    pub incomplete: bool,
}

impl Scene {
    /// Runs the post-processing steps selected by `flags` on every mesh.
    pub fn apply(&mut self, flags: PostProcess) {
        for mesh in &mut self.meshes {
            if flags.contains(PostProcess::TRIANGULATE) {
                mesh.triangulate();
            }
            if flags.contains(PostProcess::GEN_NORMALS) && mesh.normals.is_none() {
                mesh.generate_normals();
            }
            if flags.contains(PostProcess::FLIP_UVS) {
                mesh.flip_uvs();
            }
            if flags.contains(PostProcess::CALC_TANGENT_SPACE) {
                mesh.calc_tangent_space();
            }
        }
    }
}

/// Reads scene files.
pub trait SceneImporter {
    fn import(&self, path: &Path, flags: PostProcess) -> Result<Scene, ImportError>;
}

impl SceneMesh {
    fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.faces
            .iter()
            .filter(|face| face.len() == 3)
            .map(|face| [face[0] as usize, face[1] as usize, face[2] as usize])
    }

    fn in_bounds(&self, [a, b, c]: [usize; 3]) -> bool {
        let count = self.positions.len();
        a < count && b < count && c < count
    }

    /// Fans polygons into triangles and drops points and lines.
    pub fn triangulate(&mut self) {
        let mut faces = Vec::with_capacity(self.faces.len());
        for face in self.faces.drain(..) {
            match face.len() {
                0..=2 => {}
                3 => faces.push(face),
                _ => {
                    for i in 1..face.len() - 1 {
                        faces.push(vec![face[0], face[i], face[i + 1]]);
                    }
                }
            }
        }
        self.faces = faces;
    }

    pub fn flip_uvs(&mut self) {
        if let Some(tex_coords) = &mut self.tex_coords {
            for uv in tex_coords {
                uv.y = 1.0 - uv.y;
            }
        }
    }

    /// Area-weighted smooth normals.
    pub fn generate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.triangles() {
            if !self.in_bounds(tri) {
                continue;
            }
            let [a, b, c] = tri;
            let (p0, p1, p2) = (self.positions[a], self.positions[b], self.positions[c]);
            let face_normal = (p1 - p0).cross(p2 - p0);
            for i in tri {
                normals[i] += face_normal;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = Some(normals);
    }

    /// Per-vertex tangent frame from texture coordinate derivatives.
    ///
    /// Needs normals and texture coordinates; without them the mesh is left untouched.
    /// Triangles with degenerate UVs contribute nothing.
    pub fn calc_tangent_space(&mut self) {
        let (Some(normals), Some(uvs)) = (&self.normals, &self.tex_coords) else {
            return;
        };
        let count = self.positions.len();
        if normals.len() != count || uvs.len() != count {
            return;
        }

        let mut tangents = vec![Vec3::ZERO; count];
        let mut bitangents = vec![Vec3::ZERO; count];

        for tri in self.triangles() {
            if !self.in_bounds(tri) {
                continue;
            }
            let [a, b, c] = tri;
            let edge1 = self.positions[b] - self.positions[a];
            let edge2 = self.positions[c] - self.positions[a];
            let duv1 = uvs[b] - uvs[a];
            let duv2 = uvs[c] - uvs[a];

            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) * r;
            let bitangent = (edge2 * duv1.x - edge1 * duv2.x) * r;

            for i in tri {
                tangents[i] += tangent;
                bitangents[i] += bitangent;
            }
        }

        for i in 0..count {
            let n = normals[i];
            let t = (tangents[i] - n * n.dot(tangents[i])).normalize_or_zero();
            let handedness = if n.cross(t).dot(bitangents[i]) < 0.0 { -1.0 } else { 1.0 };
            tangents[i] = t;
            bitangents[i] = n.cross(t) * handedness;
        }

        self.tangents = Some(tangents);
        self.bitangents = Some(bitangents);
    }
}
