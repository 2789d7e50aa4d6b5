//! Raster images embedded into the SVG as data URIs: full-level
//! backgrounds and per-cell tile images.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::level::Level;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Image bytes ready to be referenced from an `<image>` element
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub mime: &'static str,
    pub base64: String,
}

impl EmbeddedImage {
    /// Wrap raw PNG or JPEG bytes; the format is sniffed from the content
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, String> {
        let mime = match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => "image/png",
            Ok(ImageFormat::Jpeg) => "image/jpeg",
            Ok(other) => return Err(format!("unsupported image format {:?}", other)),
            Err(e) => return Err(e.to_string()),
        };
        Ok(Self {
            mime,
            base64: STANDARD.encode(bytes),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes).map_err(|message| Error::Background {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// Tile images for the grid characters a level actually uses
#[derive(Debug, Clone, Default)]
pub struct TileImages {
    images: BTreeMap<char, EmbeddedImage>,
}

impl TileImages {
    pub fn load(config: &Config, level: &Level) -> Result<Self> {
        let mut images = BTreeMap::new();
        for ch in level.rows.iter().flat_map(|row| row.chars()) {
            if images.contains_key(&ch) {
                continue;
            }
            if let Some(path) = config.tile_for(ch) {
                images.insert(ch, EmbeddedImage::load(&path)?);
            }
        }
        Ok(Self { images })
    }

    pub fn get(&self, ch: char) -> Option<&EmbeddedImage> {
        self.images.get(&ch)
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn insert(&mut self, ch: char, image: EmbeddedImage) {
        self.images.insert(ch, image);
    }
}

/// What is drawn underneath the level geometry
#[derive(Debug, Clone)]
pub enum Backdrop {
    /// One image covering the whole grid
    Image(EmbeddedImage),
    /// Colored character grid, with optional per-cell tile images
    Grid(TileImages),
}

/// Background image implied by a level file: `<level>.png` next to it
pub fn inferred_background(level_path: &Path) -> Option<PathBuf> {
    let candidate = level_path.with_extension("png");
    (candidate != level_path && candidate.is_file()).then_some(candidate)
}
