//! Decoded images, shared by the simulation (sizes) and the renderer (pixels).
//!
//! Each path is decoded once; later loads of the same path return the same
//! handle. Handles are dense indices, so the renderer can keep its textures
//! in a `Vec` in handle order.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use hop_core::animation::{FrameImage, ImageHandle};
use hop_core::ResourceError;

use crate::config::asset_path;

pub struct LoadedImage {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Default)]
pub struct ImageRegistry {
    images: Vec<LoadedImage>,
    by_path: HashMap<String, ImageHandle>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `relative` under `root`, or return the handle already loaded for it.
    pub fn load(&mut self, root: &Path, relative: &str) -> Result<FrameImage, ResourceError> {
        if let Some(image) = self.frame_image(relative) {
            return Ok(image);
        }

        let path = asset_path(root, relative);
        let bytes = std::fs::read(&path).map_err(|e| ResourceError::read(&path, e))?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| ResourceError::parse(&path, e))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            return Err(ResourceError::invalid(&path, "image has zero size"));
        }
        log::debug!("Loaded image {} ({}x{})", path.display(), width, height);
        Ok(self.insert_rgba(relative, width, height, decoded.into_raw()))
    }

    /// Register already-decoded pixels under `path`.
    pub fn insert_rgba(&mut self, path: &str, width: u32, height: u32, rgba: Vec<u8>) -> FrameImage {
        if let Some(image) = self.frame_image(path) {
            return image;
        }
        let handle = ImageHandle(self.images.len() as u32);
        self.images.push(LoadedImage {
            path: path.to_string(),
            width,
            height,
            rgba,
        });
        self.by_path.insert(path.to_string(), handle);
        FrameImage {
            handle,
            width,
            height,
        }
    }

    pub fn frame_image(&self, path: &str) -> Option<FrameImage> {
        let handle = *self.by_path.get(path)?;
        let image = self.get(handle)?;
        Some(FrameImage {
            handle,
            width: image.width,
            height: image.height,
        })
    }

    pub fn get(&self, handle: ImageHandle) -> Option<&LoadedImage> {
        self.images.get(handle.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (ImageHandle, &LoadedImage)> {
        self.images
            .iter()
            .enumerate()
            .map(|(i, image)| (ImageHandle(i as u32), image))
    }
}

/// Tile symbol to image, for drawing the map.
#[derive(Debug, Clone, Default)]
pub struct TileImages {
    images: HashMap<char, FrameImage>,
}

impl TileImages {
    pub fn load(
        tiles: &BTreeMap<char, String>,
        root: &Path,
        registry: &mut ImageRegistry,
    ) -> Result<Self, ResourceError> {
        let mut images = HashMap::new();
        for (&symbol, relative) in tiles {
            images.insert(symbol, registry.load(root, relative)?);
        }
        Ok(Self { images })
    }

    pub fn get(&self, symbol: char) -> Option<FrameImage> {
        self.images.get(&symbol).copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.images.contains_key(&symbol)
    }
}
