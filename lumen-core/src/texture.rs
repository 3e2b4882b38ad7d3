//! Texture values, the importer slot mapping and the per-model texture cache.
//!
//! A [`Texture`] is a cheap value: the GPU handle, the semantic [`TextureKind`] and the path it
//! was loaded from. The path is the identity key of the [`TextureCache`], which keeps a model
//! from uploading the same image twice.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::TextureId;
use crate::error::TextureError;

/// What a texture is used for by the shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    pub const ALL: [TextureKind; 4] = [
        TextureKind::Diffuse,
        TextureKind::Specular,
        TextureKind::Normal,
        TextureKind::Height,
    ];

    /// Sampler uniform prefix. The shader declares `<prefix>1`, `<prefix>2`, ...
    pub fn uniform_prefix(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
            TextureKind::Normal => "texture_normal",
            TextureKind::Height => "texture_height",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Colour textures are the ones stored in sRGB when gamma correction is on.
    pub fn is_color(self) -> bool {
        matches!(self, TextureKind::Diffuse)
    }
}

/// A texture loaded by a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub kind: TextureKind,
    /// Path exactly as the material stores it, relative to the model directory.
    pub path: String,
}

/// Texture slots a scene importer can fill on a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSlot {
    Diffuse,
    Specular,
    Ambient,
    Emissive,
    Height,
    Normals,
    Shininess,
    Opacity,
}

/// One entry of a [`TextureSlotMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMapping {
    pub slot: TextureSlot,
    pub kind: TextureKind,
}

/// Ordered mapping from importer slots to shader texture kinds.
///
/// OBJ exporters write normal maps as `bump` (the importer's height slot) and height maps as
/// `map_Ka` (the ambient slot), so the default table routes those slots accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureSlotMap {
    mappings: Vec<SlotMapping>,
}

impl Default for TextureSlotMap {
    fn default() -> Self {
        Self::from_pairs(&[
            (TextureSlot::Diffuse, TextureKind::Diffuse),
            (TextureSlot::Specular, TextureKind::Specular),
            (TextureSlot::Height, TextureKind::Normal),
            (TextureSlot::Ambient, TextureKind::Height),
        ])
    }
}

impl TextureSlotMap {
    pub fn new(mappings: Vec<SlotMapping>) -> Self {
        Self { mappings }
    }

    pub fn from_pairs(pairs: &[(TextureSlot, TextureKind)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|&(slot, kind)| SlotMapping { slot, kind })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotMapping> {
        self.mappings.iter()
    }

    /// Returns the kind the first mapping of `slot` assigns, if any.
    pub fn kind_for(&self, slot: TextureSlot) -> Option<TextureKind> {
        self.mappings.iter().find(|m| m.slot == slot).map(|m| m.kind)
    }
}

/// Pixel layout of decoded image data, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn from_channel_count(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::Red),
            3 => Some(PixelFormat::Rgb),
            4 => Some(PixelFormat::Rgba),
            _ => None,
        }
    }

    pub fn channel_count(self) -> usize {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Decoded image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// Turns an image file into raw pixels.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<TextureImage, TextureError>;
}

/// [`ImageDecoder`] backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, path: &Path) -> Result<TextureImage, TextureError> {
        let image = image::open(path).map_err(|e| TextureError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = (image.width(), image.height());
        let (format, pixels) = match PixelFormat::from_channel_count(image.color().channel_count()) {
            Some(PixelFormat::Red) => (PixelFormat::Red, image.to_luma8().into_raw()),
            Some(PixelFormat::Rgb) => (PixelFormat::Rgb, image.to_rgb8().into_raw()),
            // Luma+alpha and anything else is widened to RGBA.
            _ => (PixelFormat::Rgba, image.to_rgba8().into_raw()),
        };

        Ok(TextureImage {
            width,
            height,
            format,
            pixels,
        })
    }
}

/// Textures already uploaded by a model, in load order.
#[derive(Debug, Default, Clone)]
pub struct TextureCache {
    textures: Vec<Texture>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a texture whose stored path is exactly `path`.
    pub fn find(&self, path: &str) -> Option<&Texture> {
        self.textures.iter().find(|t| t.path == path)
    }

    pub fn insert(&mut self, texture: Texture) {
        debug_assert!(self.find(&texture.path).is_none());
        self.textures.push(texture);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.textures.iter()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Texture> + '_ {
        self.textures.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::test_util::temp_dir;

    fn texture(id: u32, path: &str) -> Texture {
        Texture {
            id: TextureId(NonZeroU32::new(id).unwrap()),
            kind: TextureKind::Diffuse,
            path: path.to_string(),
        }
    }

    #[test]
    fn test_cache_matches_exact_path_only() {
        let mut cache = TextureCache::new();
        cache.insert(texture(1, "wood.png"));
        cache.insert(texture(2, "textures/wood.png"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.find("wood.png").unwrap().id, texture(1, "").id);
        assert_eq!(cache.find("textures/wood.png").unwrap().id, texture(2, "").id);
        assert!(cache.find("Wood.png").is_none());
        assert!(cache.find("./wood.png").is_none());
    }

    #[test]
    fn test_default_slot_map() {
        let map = TextureSlotMap::default();
        assert_eq!(map.kind_for(TextureSlot::Diffuse), Some(TextureKind::Diffuse));
        assert_eq!(map.kind_for(TextureSlot::Specular), Some(TextureKind::Specular));
        assert_eq!(map.kind_for(TextureSlot::Height), Some(TextureKind::Normal));
        assert_eq!(map.kind_for(TextureSlot::Ambient), Some(TextureKind::Height));
        assert_eq!(map.kind_for(TextureSlot::Normals), None);
        let order: Vec<_> = map.iter().map(|m| m.kind).collect();
        assert_eq!(order, TextureKind::ALL);
    }

    #[test]
    fn test_slot_map_from_json() {
        let map: TextureSlotMap = serde_json::from_str(
            r#"[
                { "slot": "diffuse", "kind": "diffuse" },
                { "slot": "normals", "kind": "normal" }
            ]"#,
        )
        .unwrap();
        assert_eq!(map.kind_for(TextureSlot::Normals), Some(TextureKind::Normal));
        assert_eq!(map.kind_for(TextureSlot::Height), None);
    }

    #[test]
    fn test_uniform_prefixes() {
        let prefixes: Vec<_> = TextureKind::ALL.iter().map(|k| k.uniform_prefix()).collect();
        assert_eq!(
            prefixes,
            ["texture_diffuse", "texture_specular", "texture_normal", "texture_height"]
        );
    }

    #[test]
    fn test_pixel_format_from_channels() {
        assert_eq!(PixelFormat::from_channel_count(1), Some(PixelFormat::Red));
        assert_eq!(PixelFormat::from_channel_count(3), Some(PixelFormat::Rgb));
        assert_eq!(PixelFormat::from_channel_count(4), Some(PixelFormat::Rgba));
        assert_eq!(PixelFormat::from_channel_count(2), None);
    }

    #[test]
    fn test_file_decoder_picks_format_by_channels() {
        let dir = temp_dir("decoder_formats");

        let gray = dir.join("gray.png");
        image::GrayImage::from_pixel(2, 3, image::Luma([7])).save(&gray).unwrap();
        let rgb = dir.join("rgb.png");
        image::RgbImage::from_pixel(4, 1, image::Rgb([1, 2, 3])).save(&rgb).unwrap();
        let rgba = dir.join("rgba.png");
        image::RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 4])).save(&rgba).unwrap();

        let decoded = FileImageDecoder.decode(&gray).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(decoded.format, PixelFormat::Red);
        assert_eq!(decoded.pixels, vec![7; 6]);

        let decoded = FileImageDecoder.decode(&rgb).unwrap();
        assert_eq!(decoded.format, PixelFormat::Rgb);
        assert_eq!(decoded.pixels.len(), 12);

        let decoded = FileImageDecoder.decode(&rgba).unwrap();
        assert_eq!(decoded.format, PixelFormat::Rgba);
        assert_eq!(decoded.pixels, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_file_decoder_reports_missing_file() {
        let path = temp_dir("decoder_missing").join("nope.png");
        let err = FileImageDecoder.decode(&path).unwrap_err();
        match err {
            TextureError::Decode { path: p, .. } => assert_eq!(p, path),
        }
    }
}
