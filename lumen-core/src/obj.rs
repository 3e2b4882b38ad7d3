//! Wavefront OBJ/MTL scene importer.
//!
//! Files are parsed with `tobj` and converted into a [`Scene`] with a root node and one child
//! node per OBJ object. MTL texture statements are sorted into importer slots:
//!
//! | MTL statement            | slot                     |
//! |--------------------------|--------------------------|
//! | `map_Kd`                 | [`TextureSlot::Diffuse`] |
//! | `map_Ks`                 | [`TextureSlot::Specular`]|
//! | `map_Ka`                 | [`TextureSlot::Ambient`] |
//! | `map_Bump`, `bump`       | [`TextureSlot::Height`]  |
//! | `norm`                   | [`TextureSlot::Normals`] |
//! | `map_Ke`                 | [`TextureSlot::Emissive`]|
//! | `map_Ns`                 | [`TextureSlot::Shininess`]|
//! | `map_d`                  | [`TextureSlot::Opacity`] |

use std::path::Path;

use glam::{Vec2, Vec3};

use crate::error::ImportError;
use crate::scene::{PostProcess, Scene, SceneImporter, SceneMaterial, SceneMesh, SceneNode};
use crate::texture::TextureSlot;

/// [`SceneImporter`] for `.obj` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl SceneImporter for ObjImporter {
    fn import(&self, path: &Path, flags: PostProcess) -> Result<Scene, ImportError> {
        if !path.is_file() {
            return Err(ImportError::NotFound(path.to_path_buf()));
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("obj") => {}
            _ => return Err(ImportError::Unsupported(path.display().to_string())),
        }

        let options = tobj::LoadOptions {
            single_index: true,
            triangulate: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, materials) = tobj::load_obj(path, &options).map_err(|e| match e {
            tobj::LoadError::OpenFileFailed => ImportError::NotFound(path.to_path_buf()),
            other => ImportError::Parse(format!("{}: {}", path.display(), other)),
        })?;

        let materials = materials.unwrap_or_else(|e| {
            log::warn!("Failed to load materials for {}: {}", path.display(), e);
            Vec::new()
        });

        let mut scene = convert(models, materials);
        scene.apply(flags);

        log::debug!(
            "Imported {}: {} meshes, {} materials",
            path.display(),
            scene.meshes.len(),
            scene.materials.len()
        );
        Ok(scene)
    }
}

fn convert(models: Vec<tobj::Model>, materials: Vec<tobj::Material>) -> Scene {
    let mut scene_materials: Vec<SceneMaterial> = materials.into_iter().map(convert_material).collect();
    // Meshes without `usemtl` share a trailing default material.
    let default_material = scene_materials.len();
    scene_materials.push(SceneMaterial::new("DefaultMaterial"));

    let mut root = SceneNode::new("root");
    let mut meshes = Vec::with_capacity(models.len());
    // tobj reports a file without geometry as one empty unnamed object.
    for model in models
        .into_iter()
        .filter(|m| !m.mesh.positions.is_empty() && !m.mesh.indices.is_empty())
    {
        let index = meshes.len();
        meshes.push(convert_mesh(&model.name, model.mesh, default_material));
        root.children.push(SceneNode::new(model.name).with_meshes([index]));
    }

    Scene {
        incomplete: meshes.is_empty(),
        root: Some(root),
        meshes,
        materials: scene_materials,
    }
}

fn convert_mesh(name: &str, mesh: tobj::Mesh, default_material: usize) -> SceneMesh {
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();
    let normals = (!mesh.normals.is_empty()).then(|| {
        mesh.normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect()
    });
    let tex_coords = (!mesh.texcoords.is_empty()).then(|| {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect()
    });

    let faces = if mesh.face_arities.is_empty() {
        mesh.indices.chunks_exact(3).map(<[u32]>::to_vec).collect()
    } else {
        let mut faces = Vec::with_capacity(mesh.face_arities.len());
        let mut start = 0;
        for &arity in &mesh.face_arities {
            let end = start + arity as usize;
            faces.push(mesh.indices[start..end].to_vec());
            start = end;
        }
        faces
    };

    SceneMesh {
        name: name.to_string(),
        positions,
        normals,
        tex_coords,
        tangents: None,
        bitangents: None,
        faces,
        material_index: mesh.material_id.unwrap_or(default_material),
    }
}

fn convert_material(material: tobj::Material) -> SceneMaterial {
    let mut converted = SceneMaterial::new(material.name);
    let slots = [
        (TextureSlot::Diffuse, material.diffuse_texture),
        (TextureSlot::Specular, material.specular_texture),
        (TextureSlot::Ambient, material.ambient_texture),
        (TextureSlot::Height, material.normal_texture),
        (TextureSlot::Shininess, material.shininess_texture),
        (TextureSlot::Opacity, material.dissolve_texture),
        (TextureSlot::Normals, material.unknown_param.get("norm").cloned()),
        (TextureSlot::Emissive, material.unknown_param.get("map_Ke").cloned()),
    ];
    for (slot, path) in slots {
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            converted.add_texture(slot, path);
        }
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_dir;

    const CUBE_OBJ: &str = "\
mtllib scene.mtl
o Floor
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
usemtl wood
f 1/1/1 4/4/1 3/3/1 2/2/1
o Crate
v 0 1 0
v 1 1 0
v 1 2 0
usemtl metal
f 5 6 7
";

    const SCENE_MTL: &str = "\
newmtl wood
map_Kd textures/wood.png
map_Ks textures/wood_spec.png
map_Bump textures/wood_normal.png
newmtl metal
map_Kd textures/wood.png
map_Ka textures/metal_height.png
norm textures/metal_norm.png
newmtl glass
bump textures/glass_bump.png
map_Ns textures/glass_ns.png
map_d textures/glass_alpha.png
map_Ke textures/glass_glow.png
";

    fn write_scene(name: &str) -> std::path::PathBuf {
        let dir = temp_dir(name);
        std::fs::write(dir.join("scene.obj"), CUBE_OBJ).unwrap();
        std::fs::write(dir.join("scene.mtl"), SCENE_MTL).unwrap();
        dir.join("scene.obj")
    }

    #[test]
    fn test_import_builds_root_with_object_children() {
        let path = write_scene("obj_structure");
        let scene = ObjImporter.import(&path, PostProcess::default()).unwrap();

        assert!(!scene.incomplete);
        let root = scene.root.as_ref().unwrap();
        assert!(root.meshes.is_empty());
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Floor", "Crate"]);
        assert_eq!(root.children[0].meshes, [0]);
        assert_eq!(root.children[1].meshes, [1]);
        assert_eq!(scene.meshes.len(), 2);
    }

    #[test]
    fn test_import_triangulates_and_generates_tangents() {
        let path = write_scene("obj_geometry");
        let scene = ObjImporter.import(&path, PostProcess::default()).unwrap();

        let floor = &scene.meshes[0];
        assert_eq!(floor.positions.len(), 4);
        assert_eq!(floor.faces.len(), 2);
        assert!(floor.faces.iter().all(|f| f.len() == 3));
        assert!(floor.tangents.as_ref().is_some_and(|t| t.len() == 4));
        assert!(floor.bitangents.as_ref().is_some_and(|b| b.len() == 4));
        for n in floor.normals.as_ref().unwrap() {
            assert_eq!(*n, Vec3::Y);
        }

        // The crate triangle has no normals or UVs in the file.
        let crate_mesh = &scene.meshes[1];
        assert!(crate_mesh.normals.is_none());
        assert!(crate_mesh.tex_coords.is_none());
        assert!(crate_mesh.tangents.is_none());
    }

    #[test]
    fn test_import_flips_uvs_only_when_requested() {
        let path = write_scene("obj_uvs");

        let flipped = ObjImporter.import(&path, PostProcess::FLIP_UVS).unwrap();
        let raw = ObjImporter.import(&path, PostProcess::empty()).unwrap();

        let flipped_uvs = flipped.meshes[0].tex_coords.as_ref().unwrap();
        let raw_uvs = raw.meshes[0].tex_coords.as_ref().unwrap();
        for (f, r) in flipped_uvs.iter().zip(raw_uvs) {
            assert_eq!(f.x, r.x);
            assert_eq!(f.y, 1.0 - r.y);
        }
        // Without TRIANGULATE the quad stays a single face.
        assert_eq!(raw.meshes[0].faces.len(), 1);
        assert_eq!(raw.meshes[0].faces[0].len(), 4);
    }

    #[test]
    fn test_import_maps_material_textures_to_slots() {
        let path = write_scene("obj_materials");
        let scene = ObjImporter.import(&path, PostProcess::default()).unwrap();

        let wood = &scene.materials[scene.meshes[0].material_index];
        assert_eq!(wood.name, "wood");
        assert_eq!(wood.textures(TextureSlot::Diffuse), ["textures/wood.png"]);
        assert_eq!(wood.textures(TextureSlot::Specular), ["textures/wood_spec.png"]);
        assert_eq!(wood.textures(TextureSlot::Height), ["textures/wood_normal.png"]);

        let metal = &scene.materials[scene.meshes[1].material_index];
        assert_eq!(metal.name, "metal");
        assert_eq!(metal.textures(TextureSlot::Diffuse), ["textures/wood.png"]);
        assert_eq!(metal.textures(TextureSlot::Ambient), ["textures/metal_height.png"]);
        assert_eq!(metal.textures(TextureSlot::Normals), ["textures/metal_norm.png"]);

        let glass = scene.materials.iter().find(|m| m.name == "glass").unwrap();
        assert_eq!(glass.textures(TextureSlot::Height), ["textures/glass_bump.png"]);
        assert_eq!(glass.textures(TextureSlot::Shininess), ["textures/glass_ns.png"]);
        assert_eq!(glass.textures(TextureSlot::Opacity), ["textures/glass_alpha.png"]);
        assert_eq!(glass.textures(TextureSlot::Emissive), ["textures/glass_glow.png"]);
        assert!(glass.textures(TextureSlot::Diffuse).is_empty());
    }

    #[test]
    fn test_missing_material_library_still_imports() {
        let dir = temp_dir("obj_no_mtl");
        let path = dir.join("lonely.obj");
        std::fs::write(&path, "mtllib gone.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let scene = ObjImporter.import(&path, PostProcess::default()).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.materials.len(), 1);
        assert_eq!(scene.materials[scene.meshes[0].material_index].name, "DefaultMaterial");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let path = temp_dir("obj_missing").join("nothing.obj");
        assert_eq!(
            ObjImporter.import(&path, PostProcess::default()),
            Err(ImportError::NotFound(path.clone()))
        );
    }

    #[test]
    fn test_other_extensions_are_unsupported() {
        let dir = temp_dir("obj_unsupported");
        let path = dir.join("model.fbx");
        std::fs::write(&path, "binary").unwrap();
        assert!(matches!(
            ObjImporter.import(&path, PostProcess::default()),
            Err(ImportError::Unsupported(_))
        ));
    }

    #[test]
    fn test_empty_file_is_incomplete() {
        let dir = temp_dir("obj_empty");
        let path = dir.join("empty.obj");
        std::fs::write(&path, "# nothing here\n").unwrap();
        let scene = ObjImporter.import(&path, PostProcess::default()).unwrap();
        assert!(scene.incomplete);
        assert!(scene.meshes.is_empty());
        assert!(scene.root.as_ref().unwrap().children.is_empty());
    }

    #[test]
    fn test_objects_without_faces_are_skipped() {
        let dir = temp_dir("obj_faceless");
        let path = dir.join("mixed.obj");
        std::fs::write(
            &path,
            "o Points\nv 5 5 5\nv 6 6 6\no Tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 3 4 5\n",
        )
        .unwrap();

        let scene = ObjImporter.import(&path, PostProcess::default()).unwrap();
        assert!(!scene.incomplete);
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.meshes[0].name, "Tri");
        let root = scene.root.as_ref().unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].meshes, [0]);
    }
}
