//! Viewer configuration.
//!
//! The configuration is a JSON file in which every field is optional. It is read from the path
//! given on the command line, else from `<config dir>/lumen/viewer.json`, else the defaults are
//! used.

use std::path::{Path, PathBuf};

use lumen_core::{CameraConfig, ModelOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Lumen".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// A point light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [1.2, 1.0, 2.0],
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [1.0, 1.0, 1.0],
            shininess: 32.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub model_path: PathBuf,
    pub model: ModelOptions,
    pub light: LightConfig,
    pub clear_color: [f32; 4],
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig {
                position: [0.0, 0.0, 3.0],
                ..CameraConfig::default()
            },
            model_path: PathBuf::from("resources/objects/backpack/backpack.obj"),
            model: ModelOptions::default(),
            light: LightConfig::default(),
            clear_color: [0.05, 0.05, 0.05, 1.0],
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Reads a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Self::from_json(&json).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// The per-user configuration file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lumen").join("viewer.json"))
    }

    /// Loads `explicit` if given, else the per-user file if it exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The configured log level, falling back to `info` for unknown names.
    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
