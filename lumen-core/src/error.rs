//! Error types for scene import, texture loading and GPU resource creation.
//!
//! Every failure that can happen while building a [`crate::Model`] ends up in a
//! [`ModelError`], so callers can use `?` all the way up.

use std::fmt;
use std::path::PathBuf;

/// Errors reported by a [`crate::SceneImporter`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The scene file does not exist or cannot be opened.
    NotFound(PathBuf),

    /// The file exists but could not be parsed.
    Parse(String),

    /// The file format is not handled by this importer.
    Unsupported(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::NotFound(path) => write!(f, "Scene file not found: {}", path.display()),
            ImportError::Parse(msg) => write!(f, "Failed to parse scene: {}", msg),
            ImportError::Unsupported(msg) => write!(f, "Unsupported scene format: {}", msg),
        }
    }
}

impl std::error::Error for ImportError {}

/// Errors reported by an [`crate::ImageDecoder`].
#[derive(Debug, Clone, PartialEq)]
pub enum TextureError {
    /// The image could not be read or decoded.
    Decode { path: PathBuf, message: String },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Decode { path, message } => {
                write!(f, "Failed to load the texture at path {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for TextureError {}

/// A GPU backend failed to allocate or upload a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuError(pub String);

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPU backend error: {}", self.0)
    }
}

impl std::error::Error for GpuError {}

impl From<String> for GpuError {
    fn from(msg: String) -> Self {
        GpuError(msg)
    }
}

/// Errors that abort loading a whole model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The importer rejected the file.
    Import(ImportError),

    /// The importer produced a scene flagged as incomplete.
    IncompleteScene,

    /// The imported scene has no root node.
    MissingRootNode,

    /// A node references a mesh the scene does not contain.
    MissingMesh(usize),

    /// A face references a vertex that does not exist.
    InvalidIndex {
        mesh: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Mesh buffers could not be created.
    Gpu(GpuError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Import(err) => write!(f, "{}", err),
            ModelError::IncompleteScene => write!(f, "Imported scene is incomplete"),
            ModelError::MissingRootNode => write!(f, "Imported scene has no root node"),
            ModelError::MissingMesh(index) => write!(f, "Scene node references missing mesh {}", index),
            ModelError::InvalidIndex {
                mesh,
                index,
                vertex_count,
            } => write!(
                f,
                "Mesh {} references vertex {} but only has {} vertices",
                mesh, index, vertex_count
            ),
            ModelError::Gpu(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Import(err) => Some(err),
            ModelError::Gpu(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImportError> for ModelError {
    fn from(err: ImportError) -> Self {
        ModelError::Import(err)
    }
}

impl From<GpuError> for ModelError {
    fn from(err: GpuError) -> Self {
        ModelError::Gpu(err)
    }
}
