//! Map compositor
//!
//! A [`Renderer`] owns one canvas sized for its map and draws layers, object
//! groups and groups onto it in the order it is asked to. Drawing is additive:
//! nothing is erased between calls except by [`Renderer::clear`].
//!
//! Tile images are looked up through a per-renderer [`TileImageCache`], so a
//! tileset image is decoded at most once per renderer however many layers use
//! it.

mod objects;
mod resolve;

use image::RgbaImage;
use std::io::Write;
use std::path::Path;
use tiny_skia::{Color, Pixmap, Transform};

use crate::assets::{AssetSource, FsAssets};
use crate::cache::TileImageCache;
use crate::canvas::{draw_image, to_rgba_image};
use crate::engine::{engine_for, RendererEngine};
use crate::error::{IndexKind, RenderError, Result};
use crate::models::{Layer, Map, RenderOrder};
use crate::output::{self, EncodeOptions, GifOptions, JpegOptions, OutputError};

/// Knobs that change how a map is composited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Reproduce the legacy renderer's cell transform (translate, then scale by
    /// the cell's far corner) and its object placement (size and rotation
    /// only, no translation). Off by default: tiles are drawn 1:1 at their
    /// cell and objects at their map position.
    pub legacy_geometry: bool,
}

impl RenderOptions {
    pub fn with_legacy_geometry(mut self, legacy_geometry: bool) -> Self {
        self.legacy_geometry = legacy_geometry;
        self
    }
}

/// Counters for one renderer, mostly useful in tests and debug logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Images drawn onto the canvas (tiles and objects)
    pub draw_calls: usize,
    /// Asset files decoded
    pub images_decoded: usize,
    /// Tile lookups answered from the tile cache
    pub cache_hits: usize,
}

/// Composites one map onto an RGBA canvas.
///
/// The canvas is a premultiplied [`Pixmap`]; [`result`](Renderer::result)
/// hands it out as a straight-alpha [`RgbaImage`].
pub struct Renderer<'m> {
    map: &'m Map,
    canvas: Pixmap,
    tile_cache: TileImageCache,
    engine: Box<dyn RendererEngine>,
    assets: Box<dyn AssetSource + 'm>,
    options: RenderOptions,
    stats: RenderStats,
}

impl<'m> Renderer<'m> {
    /// Renderer reading tileset images from the local filesystem.
    pub fn new(map: &'m Map) -> Result<Self> {
        Self::with_assets(map, FsAssets::new())
    }

    /// Renderer reading tileset images from `assets`.
    pub fn with_assets(map: &'m Map, assets: impl AssetSource + 'm) -> Result<Self> {
        Self::with_options(map, assets, RenderOptions::default())
    }

    /// Fails with [`RenderError::UnsupportedOrientation`] for non-orthogonal
    /// maps and [`RenderError::InvalidCanvasSize`] for maps whose pixel size
    /// is empty or too large, before any asset is opened.
    pub fn with_options(
        map: &'m Map,
        assets: impl AssetSource + 'm,
        options: RenderOptions,
    ) -> Result<Self> {
        let engine = engine_for(map, options.legacy_geometry)?;
        let (width, height) = engine.final_size();
        let canvas = Pixmap::new(width, height).ok_or(RenderError::InvalidCanvasSize {
            width: u64::from(width),
            height: u64::from(height),
        })?;

        Ok(Self {
            map,
            canvas,
            tile_cache: TileImageCache::new(),
            engine,
            assets: Box::new(assets),
            options,
            stats: RenderStats::default(),
        })
    }

    /// Copy of the canvas as drawn so far.
    pub fn result(&self) -> RgbaImage {
        to_rgba_image(&self.canvas)
    }

    pub fn into_result(self) -> RgbaImage {
        to_rgba_image(&self.canvas)
    }

    /// Canvas size in pixels.
    pub fn final_size(&self) -> (u32, u32) {
        self.engine.final_size()
    }

    pub fn tile_cache(&self) -> &TileImageCache {
        &self.tile_cache
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Reset every canvas pixel to transparent. The tile cache is kept.
    pub fn clear(&mut self) {
        self.canvas.fill(Color::TRANSPARENT);
    }

    /// Draw the top-level layer at `index`, whether visible or not.
    pub fn render_layer(&mut self, index: usize) -> Result<()> {
        let map = self.map;
        let layer = lookup(&map.layers, IndexKind::Layer, index)?;
        self.draw_layer(layer)
    }

    /// Draw every visible top-level layer in order.
    pub fn render_visible_layers(&mut self) -> Result<()> {
        let map = self.map;
        for layer in map.layers.iter().filter(|l| l.visible) {
            self.draw_layer(layer)?;
        }
        Ok(())
    }

    /// Draw layer `layer` of group `group`.
    pub fn render_group_layer(&mut self, group: usize, layer: usize) -> Result<()> {
        let map = self.map;
        let group = lookup(&map.groups, IndexKind::Group, group)?;
        let layer = lookup(&group.layers, IndexKind::GroupLayer, layer)?;
        self.draw_layer(layer)
    }

    /// Draw all visible layers, then all visible object groups.
    ///
    /// The map model keeps layers and object groups in separate sequences,
    /// so an object group that sits between two tile layers in the editor is
    /// still drawn above both.
    pub fn render_visible_layers_and_object_groups(&mut self) -> Result<()> {
        self.render_visible_layers()?;
        self.render_visible_object_groups()
    }

    /// Encode the canvas as PNG.
    pub fn save_as_png<W: Write>(&self, writer: W) -> std::result::Result<(), OutputError> {
        output::encode_png(&self.result(), writer)
    }

    /// Encode the canvas as JPEG; alpha is dropped.
    pub fn save_as_jpeg<W: Write>(
        &self,
        writer: W,
        options: &JpegOptions,
    ) -> std::result::Result<(), OutputError> {
        output::encode_jpeg(&self.result(), writer, options)
    }

    /// Encode the canvas as a single-frame GIF.
    pub fn save_as_gif<W: Write>(
        &self,
        writer: W,
        options: &GifOptions,
    ) -> std::result::Result<(), OutputError> {
        output::encode_gif(&self.result(), writer, options)
    }

    /// Write the canvas to `path` in the format chosen by `options`.
    pub fn save(&self, path: &Path, options: &EncodeOptions) -> std::result::Result<(), OutputError> {
        output::save_image(&self.result(), path, options)
    }

    fn draw_layer(&mut self, layer: &'m Layer) -> Result<()> {
        let map = self.map;
        if map.render_order != RenderOrder::RightDown {
            return Err(RenderError::UnsupportedRenderOrder(map.render_order.to_string()));
        }
        let expected = map.cell_count();
        if layer.tiles.len() != expected {
            return Err(RenderError::LayerSizeMismatch {
                layer: layer.name.clone(),
                expected,
                actual: layer.tiles.len(),
            });
        }

        let mut cells = layer.tiles.iter();
        for y in 0..map.height {
            for x in 0..map.width {
                let Some(&raw_gid) = cells.next() else {
                    return Ok(());
                };
                let Some(tile) = map.tile_gid_to_tile(raw_gid)? else {
                    continue;
                };
                let image = self.get_tile_image(&tile)?;
                let transform = self.engine.cell_transform(x, y);
                self.draw(&image, transform, layer.opacity);
            }
        }

        log::debug!("rendered layer '{}'", layer.name);
        Ok(())
    }

    fn draw(&mut self, image: &RgbaImage, transform: Transform, opacity: f32) {
        let submitted = draw_image(&mut self.canvas, image, transform, opacity);
        self.stats.draw_calls += 1;
        log::trace!("draw at ({}, {}), submitted: {}", transform.tx, transform.ty, submitted);
    }
}

/// Index into one of the map's sequences, reporting which one on failure.
fn lookup<T>(items: &[T], kind: IndexKind, index: usize) -> Result<&T> {
    items.get(index).ok_or(RenderError::IndexOutOfBounds { kind, index, len: items.len() })
}
