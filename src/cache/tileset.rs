//! Tileset-level image cache
//!
//! Decodes each tileset's image(s) once and keeps every tile as a view, keyed
//! by tileset name and local tile id. Independent of any [`Renderer`]; useful
//! when a caller needs raw tile images without compositing a map.
//!
//! [`Renderer`]: crate::renderer::Renderer

use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::{decode_image, AssetSource};
use crate::canvas::ImageView;
use crate::error::{RenderError, Result};
use crate::models::{LayerTile, Tileset};

/// Per-tileset slices of decoded tile images.
///
/// Grows without bound for the lifetime of the cache. Failed decodes are not
/// remembered, so a later call retries.
pub struct TilesetCache<A: AssetSource> {
    assets: A,
    cache: HashMap<String, HashMap<u32, ImageView>>,
}

impl<A: AssetSource> TilesetCache<A> {
    pub fn new(assets: A) -> Self {
        Self { assets, cache: HashMap::new() }
    }

    /// All tile images of `tileset`, decoding on first use.
    pub fn resolve(&mut self, tileset: &Tileset) -> Result<&HashMap<u32, ImageView>> {
        if !self.cache.contains_key(&tileset.name) {
            let slices = self.load(tileset)?;
            log::debug!("cached {} tiles of tileset '{}'", slices.len(), tileset.name);
            self.cache.insert(tileset.name.clone(), slices);
        }
        Ok(&self.cache[&tileset.name])
    }

    /// The untransformed image of `tile`.
    pub fn get_tile_image(&mut self, tile: &LayerTile<'_>) -> Result<ImageView> {
        let slices = self.resolve(tile.tileset)?;
        slices.get(&tile.id).cloned().ok_or_else(|| RenderError::TileNotFound {
            tileset: tile.tileset.name.clone(),
            id: tile.id,
        })
    }

    /// Whether the named tileset has been decoded.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Number of tilesets decoded so far.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    fn load(&self, tileset: &Tileset) -> Result<HashMap<u32, ImageView>> {
        let mut slices = HashMap::new();

        match tileset.shared_image() {
            Some(image) => {
                let path = tileset.file_full_path(&image.source);
                let sheet = Arc::new(decode_image(&self.assets, &path)?);
                for id in 0..tileset.tile_count {
                    // Row-major: once a tile starts below the sheet, so do the rest
                    match tileset.tile_rect(id) {
                        Some(rect) if rect.y < sheet.height() => {
                            slices.insert(id, ImageView::sub(Arc::clone(&sheet), rect));
                        }
                        _ => break,
                    }
                }
            }
            None => {
                // Image collection: one file per tile
                for tile in &tileset.tiles {
                    let Some(image) = &tile.image else {
                        continue;
                    };
                    let path = tileset.file_full_path(&image.source);
                    let decoded = decode_image(&self.assets, &path)?;
                    slices.insert(tile.id, ImageView::full(Arc::new(decoded)));
                }
            }
        }

        Ok(slices)
    }
}
