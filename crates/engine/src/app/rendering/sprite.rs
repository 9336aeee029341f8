use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::sprite_keys::{sprite_path, SpriteKeyError};

use super::Rgba;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid sprite key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("rgba buffer for {width}x{height} sprite must be {expected} bytes, got {actual}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("sprite scale must be at least 1")]
    ZeroScale,
}

/// Decoded RGBA8 image, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Sprite {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::BufferSize {
                width,
                height,
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(color)
    }

    /// Nearest-neighbour integer upscale.
    pub fn scaled(&self, factor: u32) -> Result<Self, AssetError> {
        if factor == 0 {
            return Err(AssetError::ZeroScale);
        }
        if factor == 1 {
            return Ok(self.clone());
        }
        let width = self.width * factor;
        let height = self.height * factor;
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            let src_row = (y / factor) as usize * self.width as usize;
            for x in 0..width {
                let offset = (src_row + (x / factor) as usize) * 4;
                rgba.extend_from_slice(&self.rgba[offset..offset + 4]);
            }
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Makes every pixel matching `key` fully transparent.
    pub fn with_color_key(mut self, key: [u8; 3]) -> Self {
        for pixel in self.rgba.chunks_exact_mut(4) {
            if pixel[..3] == key {
                pixel[3] = 0;
            }
        }
        self
    }

    pub(crate) fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteLoad {
    pub scale: u32,
    pub color_key: Option<[u8; 3]>,
}

impl Default for SpriteLoad {
    fn default() -> Self {
        Self {
            scale: 1,
            color_key: None,
        }
    }
}

/// Load-once image cache. Textures never change after decoding, so entries
/// live for as long as the cache does and are shared by reference count.
#[derive(Debug)]
pub struct SpriteCache {
    textures_dir: PathBuf,
    entries: HashMap<(String, SpriteLoad), Arc<Sprite>>,
}

impl SpriteCache {
    pub fn new(textures_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures_dir: textures_dir.into(),
            entries: HashMap::new(),
        }
    }

    pub fn textures_dir(&self) -> &Path {
        &self.textures_dir
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load(&mut self, key: &str, options: SpriteLoad) -> Result<Arc<Sprite>, AssetError> {
        let cache_key = (key.to_string(), options);
        if let Some(sprite) = self.entries.get(&cache_key) {
            return Ok(Arc::clone(sprite));
        }

        let path = sprite_path(&self.textures_dir, key).map_err(|source| AssetError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        let mut sprite = decode_png(&path)?.scaled(options.scale)?;
        if let Some(color_key) = options.color_key {
            sprite = sprite.with_color_key(color_key);
        }
        debug!(
            sprite_key = key,
            path = %path.display(),
            width = sprite.width,
            height = sprite.height,
            "sprite_loaded"
        );

        let sprite = Arc::new(sprite);
        self.entries.insert(cache_key, Arc::clone(&sprite));
        Ok(sprite)
    }
}

fn decode_png(path: &Path) -> Result<Sprite, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(Sprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba as ImageRgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &Path, key: &str, width: u32, height: u32, color: Rgba) {
        let image = RgbaImage::from_pixel(width, height, ImageRgba(color));
        image
            .save(dir.join(format!("{key}.png")))
            .expect("write test png");
    }

    #[test]
    fn from_rgba_rejects_short_buffer() {
        let error = Sprite::from_rgba(2, 2, vec![0; 12]).expect_err("short buffer");
        assert!(matches!(
            error,
            AssetError::BufferSize {
                expected: 16,
                actual: 12,
                ..
            }
        ));
    }

    #[test]
    fn scaled_repeats_each_pixel() {
        let sprite = Sprite::from_rgba(2, 1, vec![1, 2, 3, 255, 9, 9, 9, 255]).expect("sprite");
        let scaled = sprite.scaled(4).expect("scaled");

        assert_eq!((scaled.width(), scaled.height()), (8, 4));
        assert_eq!(scaled.pixel(3, 3), Some([1, 2, 3, 255]));
        assert_eq!(scaled.pixel(4, 0), Some([9, 9, 9, 255]));
        assert_eq!(scaled.pixel(8, 0), None);
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(matches!(
            Sprite::filled(1, 1, [0, 0, 0, 255]).scaled(0),
            Err(AssetError::ZeroScale)
        ));
    }

    #[test]
    fn color_key_clears_alpha_of_matching_pixels_only() {
        let sprite = Sprite::from_rgba(2, 1, vec![0, 0, 0, 255, 255, 175, 0, 255])
            .expect("sprite")
            .with_color_key([0, 0, 0]);
        assert_eq!(sprite.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(sprite.pixel(1, 0), Some([255, 175, 0, 255]));
    }

    #[test]
    fn cache_loads_once_and_shares_the_sprite() {
        let dir = TempDir::new().expect("tempdir");
        write_png(dir.path(), "dirt", 16, 16, [120, 80, 40, 255]);
        let mut cache = SpriteCache::new(dir.path());
        let options = SpriteLoad {
            scale: 4,
            color_key: None,
        };

        let first = cache.load("dirt", options).expect("first load");
        std::fs::remove_file(dir.path().join("dirt.png")).expect("remove png");
        let second = cache.load("dirt", options).expect("cached load");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((first.width(), first.height()), (64, 64));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = TempDir::new().expect("tempdir");
        let mut cache = SpriteCache::new(dir.path());
        let error = cache
            .load("bricks", SpriteLoad::default())
            .expect_err("missing file");
        assert!(matches!(error, AssetError::Open { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("coins.png"), b"not a png").expect("write");
        let mut cache = SpriteCache::new(dir.path());
        let error = cache
            .load("coins", SpriteLoad::default())
            .expect_err("corrupt file");
        assert!(matches!(error, AssetError::Decode { .. }));
    }

    #[test]
    fn invalid_key_never_touches_the_filesystem() {
        let mut cache = SpriteCache::new("does/not/matter");
        let error = cache
            .load("../secrets", SpriteLoad::default())
            .expect_err("invalid key");
        assert!(matches!(error, AssetError::InvalidKey { .. }));
    }
}
