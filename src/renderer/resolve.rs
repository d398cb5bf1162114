//! Tile image resolution: cache lookup, decode on miss, orientation

use image::RgbaImage;
use std::sync::Arc;

use super::Renderer;
use crate::assets::decode_image;
use crate::canvas::ImageView;
use crate::error::{RenderError, Result};
use crate::models::{LayerTile, TilesetImage};

impl<'m> Renderer<'m> {
    /// The image for `tile`, with its flip flags applied.
    ///
    /// The untransformed image comes from the tile cache when present.
    /// Otherwise the owning tileset is loaded: a shared-image tileset is
    /// decoded once and every one of its tiles cached; a per-tile tileset
    /// decodes and caches only the requested tile. A tile with no pixels in
    /// its tileset fails with [`RenderError::TileNotFound`].
    pub fn get_tile_image(&mut self, tile: &LayerTile<'_>) -> Result<RgbaImage> {
        let gid = tile.global_id();
        let view = match self.tile_cache.get(gid) {
            Some(view) => {
                self.stats.cache_hits += 1;
                view.clone()
            }
            None => match tile.tileset.shared_image() {
                Some(image) => self.load_from_tileset(tile, image)?,
                None => self.load_from_tile(tile)?,
            },
        };

        Ok(self.engine.orient_tile(tile, view.to_image()))
    }

    fn load_from_tileset(&mut self, tile: &LayerTile<'_>, image: &TilesetImage) -> Result<ImageView> {
        let tileset = tile.tileset;
        let path = tileset.file_full_path(&image.source);
        let sheet = Arc::new(decode_image(&*self.assets, &path)?);
        self.stats.images_decoded += 1;

        // Tiles below the bottom edge of the sheet are left uncached
        let mut requested = None;
        let mut cached = 0;
        for id in 0..tileset.tile_count {
            let (Some(rect), Some(gid)) = (tileset.tile_rect(id), tileset.first_gid.checked_add(id)) else {
                break;
            };
            if rect.y >= sheet.height() {
                break;
            }
            let view = ImageView::sub(Arc::clone(&sheet), rect);
            if id == tile.id {
                requested = Some(view.clone());
            }
            self.tile_cache.insert(gid, view);
            cached += 1;
        }
        log::debug!(
            "cached {} tiles of tileset '{}' from {}",
            cached,
            tileset.name,
            path.display()
        );

        requested.ok_or_else(|| RenderError::TileNotFound { tileset: tileset.name.clone(), id: tile.id })
    }

    fn load_from_tile(&mut self, tile: &LayerTile<'_>) -> Result<ImageView> {
        let tileset = tile.tileset;
        let image = tileset
            .tileset_tile(tile.id)?
            .image
            .as_ref()
            .ok_or_else(|| RenderError::TileNotFound { tileset: tileset.name.clone(), id: tile.id })?;

        let path = tileset.file_full_path(&image.source);
        let view = ImageView::full(Arc::new(decode_image(&*self.assets, &path)?));
        self.stats.images_decoded += 1;
        self.tile_cache.insert(tile.global_id(), view.clone());
        log::debug!("cached tile {} of tileset '{}'", tile.id, tileset.name);

        Ok(view)
    }
}
