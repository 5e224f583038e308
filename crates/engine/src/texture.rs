//! Decoded RGBA textures and the per-pixel collision masks derived from them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("invalid texture key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error("failed to open texture '{key}' at {path}: {source}")]
    Open {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture '{key}' at {path}: {source}")]
    Decode {
        key: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture '{key}' has zero width or height")]
    Empty { key: String },
    #[error("texture '{key}' rgba buffer has {actual} bytes, expected {expected}")]
    BufferSize {
        key: String,
        expected: usize,
        actual: usize,
    },
}

/// Row-major opacity grid: `is_opaque(x, y)` is true iff the source pixel had
/// a non-zero alpha channel. Built once per texture and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    opaque: Vec<bool>,
}

impl CollisionMask {
    /// `rgba` must hold at least `width * height * 4` bytes; missing pixels are
    /// treated as transparent.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        let pixel_count = width as usize * height as usize;
        let opaque = (0..pixel_count)
            .map(|index| rgba.get(index * 4 + 3).is_some_and(|alpha| *alpha != 0))
            .collect();
        Self {
            width,
            height,
            opaque,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Offsets outside the mask report transparent.
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.opaque.get(index).copied().unwrap_or(false)
    }

    pub fn opaque_count(&self) -> usize {
        self.opaque.iter().filter(|opaque| **opaque).count()
    }
}

#[derive(Debug, Clone)]
pub struct Texture {
    key: String,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    mask: CollisionMask,
}

impl Texture {
    pub fn from_rgba(
        key: impl Into<String>,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> Result<Self, TextureError> {
        let key = key.into();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { key });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(TextureError::BufferSize {
                key,
                expected,
                actual: rgba.len(),
            });
        }
        let mask = CollisionMask::from_rgba(width, height, &rgba);
        Ok(Self {
            key,
            width,
            height,
            rgba,
            mask,
        })
    }

    /// Fully opaque single-colour texture. Zero dimensions are bumped to 1.
    pub fn solid(key: impl Into<String>, width: u32, height: u32, color: [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let color = [color[0], color[1], color[2], 255];
        let rgba = color.repeat(width as usize * height as usize);
        let mask = CollisionMask::from_rgba(width, height, &rgba);
        Self {
            key: key.into(),
            width,
            height,
            rgba,
            mask,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn mask(&self) -> &CollisionMask {
        &self.mask
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Loads `<root>/<key>.png` once per key and hands out shared references.
#[derive(Debug)]
pub struct TextureRegistry {
    root: PathBuf,
    textures: HashMap<String, Arc<Texture>>,
}

impl TextureRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: HashMap::new(),
        }
    }

    pub fn load(&mut self, key: &str) -> Result<Arc<Texture>, TextureError> {
        if let Some(texture) = self.textures.get(key) {
            return Ok(Arc::clone(texture));
        }
        validate_texture_key(key)?;
        let path = self.root.join(format!("{key}.png"));
        let texture = Arc::new(load_png(key, &path)?);
        info!(
            key,
            width = texture.width(),
            height = texture.height(),
            opaque_pixels = texture.mask().opaque_count(),
            "texture_loaded"
        );
        self.textures.insert(key.to_string(), Arc::clone(&texture));
        Ok(texture)
    }

    pub fn get(&self, key: &str) -> Option<Arc<Texture>> {
        self.textures.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn validate_texture_key(key: &str) -> Result<(), TextureError> {
    let reason = if key.is_empty() {
        Some("must not be empty")
    } else if !key
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-'))
    {
        Some("only lowercase ascii letters, digits, '_' and '-' are allowed")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(TextureError::InvalidKey {
            key: key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn load_png(key: &str, path: &Path) -> Result<Texture, TextureError> {
    let reader = ImageReader::open(path).map_err(|source| TextureError::Open {
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| TextureError::Decode {
        key: key.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = image.dimensions();
    Texture::from_rgba(key, width, height, image.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, key: &str, image: &RgbaImage) {
        image
            .save(dir.join(format!("{key}.png")))
            .expect("write png");
    }

    #[test]
    fn mask_tracks_nonzero_alpha_only() {
        let rgba = vec![
            255, 0, 0, 0, // transparent red
            0, 0, 0, 1, // barely visible
            9, 9, 9, 255, // opaque
            0, 0, 0, 0,
        ];
        let mask = CollisionMask::from_rgba(2, 2, &rgba);

        assert!(!mask.is_opaque(0, 0));
        assert!(mask.is_opaque(1, 0));
        assert!(mask.is_opaque(0, 1));
        assert!(!mask.is_opaque(1, 1));
        assert_eq!(mask.opaque_count(), 2);
    }

    #[test]
    fn mask_reports_out_of_range_as_transparent() {
        let texture = Texture::solid("block", 3, 2, [1, 2, 3, 255]);
        let mask = texture.mask();

        assert!(mask.is_opaque(2, 1));
        assert!(!mask.is_opaque(3, 0));
        assert!(!mask.is_opaque(0, 2));
        assert!(!mask.is_opaque(-1, 0));
        assert!(!mask.is_opaque(0, -1));
    }

    #[test]
    fn from_rgba_rejects_mismatched_buffer() {
        let result = Texture::from_rgba("short", 2, 2, vec![0; 12]);
        assert!(matches!(
            result,
            Err(TextureError::BufferSize {
                expected: 16,
                actual: 12,
                ..
            })
        ));
        assert!(matches!(
            Texture::from_rgba("empty", 0, 4, Vec::new()),
            Err(TextureError::Empty { .. })
        ));
    }

    #[test]
    fn registry_loads_png_and_builds_mask() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut image = RgbaImage::new(4, 3);
        image.put_pixel(1, 2, Rgba([10, 20, 30, 255]));
        image.put_pixel(3, 0, Rgba([0, 0, 0, 128]));
        write_png(dir.path(), "hazard", &image);

        let mut registry = TextureRegistry::new(dir.path());
        let texture = registry.load("hazard").expect("load");

        assert_eq!((texture.width(), texture.height()), (4, 3));
        assert_eq!(texture.pixel(1, 2), Some([10, 20, 30, 255]));
        assert!(texture.mask().is_opaque(1, 2));
        assert!(texture.mask().is_opaque(3, 0));
        assert!(!texture.mask().is_opaque(0, 0));
        assert_eq!(texture.mask().opaque_count(), 2);
    }

    #[test]
    fn registry_memoizes_by_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_png(dir.path(), "goal", &RgbaImage::new(2, 2));

        let mut registry = TextureRegistry::new(dir.path());
        let first = registry.load("goal").expect("first");
        let second = registry.load("goal").expect("second");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_rejects_invalid_keys_before_touching_disk() {
        let mut registry = TextureRegistry::new("/nonexistent");
        for key in ["", "Player", "../secret", "a/b", "a.png"] {
            assert!(
                matches!(registry.load(key), Err(TextureError::InvalidKey { .. })),
                "key={key}"
            );
        }
    }

    #[test]
    fn registry_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut registry = TextureRegistry::new(dir.path());
        assert!(matches!(
            registry.load("missing"),
            Err(TextureError::Open { .. })
        ));
        assert!(registry.is_empty());
    }
}
