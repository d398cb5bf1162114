//! Orthogonal (top-down, axis-aligned grid) projection

use image::{imageops, RgbaImage};
use tiny_skia::Transform;

use super::RendererEngine;
use crate::error::{RenderError, Result};
use crate::models::{LayerTile, Map};

/// Engine for orthogonal maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrthogonalEngine {
    pixel_width: u32,
    pixel_height: u32,
    tile_width: u32,
    tile_height: u32,
    legacy_geometry: bool,
}

impl OrthogonalEngine {
    /// Capture the grid geometry of `map`.
    ///
    /// With `legacy_geometry` every cell transform also gets the growing
    /// scale step of the legacy renderer, reproducing its output exactly.
    /// Fails with [`RenderError::InvalidCanvasSize`] when the map's pixel
    /// size overflows `u32`.
    pub fn new(map: &Map, legacy_geometry: bool) -> Result<Self> {
        let width = u64::from(map.width) * u64::from(map.tile_width);
        let height = u64::from(map.height) * u64::from(map.tile_height);
        let (Ok(pixel_width), Ok(pixel_height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(RenderError::InvalidCanvasSize { width, height });
        };

        Ok(Self {
            pixel_width,
            pixel_height,
            tile_width: map.tile_width,
            tile_height: map.tile_height,
            legacy_geometry,
        })
    }
}

impl RendererEngine for OrthogonalEngine {
    fn final_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    fn cell_transform(&self, x: u32, y: u32) -> Transform {
        let tw = self.tile_width as f32;
        let th = self.tile_height as f32;

        let transform = Transform::from_translate(x as f32 * tw, y as f32 * th);
        if self.legacy_geometry {
            transform.post_scale((x as f32 + 1.0) * tw, (y as f32 + 1.0) * th)
        } else {
            transform
        }
    }

    fn orient_tile(&self, tile: &LayerTile<'_>, image: RgbaImage) -> RgbaImage {
        if !tile.is_flipped() {
            return image;
        }
        let mut img = image;
        if tile.diagonal_flip {
            // 270° counter-clockwise turn then mirror: a transpose
            img = imageops::flip_horizontal(&imageops::rotate90(&img));
        }
        if tile.horizontal_flip {
            img = imageops::flip_horizontal(&img);
        }
        if tile.vertical_flip {
            img = imageops::flip_vertical(&img);
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Orientation, RenderOrder, Tileset};
    use image::Rgba;

    fn map(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Map {
        Map {
            orientation: Orientation::Orthogonal,
            render_order: RenderOrder::RightDown,
            width,
            height,
            tile_width,
            tile_height,
            tilesets: vec![],
            layers: vec![],
            object_groups: vec![],
            groups: vec![],
        }
    }

    /// 3x2 image with a distinct value in every pixel: red = x, green = y
    fn asymmetric() -> RgbaImage {
        RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 0, 255]))
    }

    fn tile(ts: &Tileset, d: bool, h: bool, v: bool) -> LayerTile<'_> {
        LayerTile { tileset: ts, id: 0, horizontal_flip: h, vertical_flip: v, diagonal_flip: d }
    }

    fn engine(map: &Map, legacy_geometry: bool) -> OrthogonalEngine {
        OrthogonalEngine::new(map, legacy_geometry).unwrap()
    }

    #[test]
    fn test_final_size() {
        for (w, h, tw, th) in [(1, 1, 1, 1), (10, 4, 16, 16), (3, 7, 32, 8), (0, 5, 16, 16)] {
            assert_eq!(engine(&map(w, h, tw, th), false).final_size(), (w * tw, h * th));
        }
        // Largest grid that still fits
        assert_eq!(engine(&map(65_535, 1, 65_537, 1), false).final_size(), (u32::MAX, 1));
    }

    #[test]
    fn test_final_size_overflow_is_an_error() {
        match OrthogonalEngine::new(&map(70_000, 2, 70_000, 70_000), false) {
            Err(RenderError::InvalidCanvasSize { width, height }) => {
                assert_eq!(width, 4_900_000_000);
                assert_eq!(height, 140_000);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(OrthogonalEngine::new(&map(1, u32::MAX, 1, 2), false).is_err());
    }

    #[test]
    fn test_cell_transform_translates() {
        let t = engine(&map(4, 4, 16, 8), false).cell_transform(2, 3);
        assert_eq!((t.sx, t.ky, t.kx, t.sy), (1.0, 0.0, 0.0, 1.0));
        assert_eq!((t.tx, t.ty), (32.0, 24.0));
    }

    #[test]
    fn test_cell_transform_legacy_scale() {
        let t = engine(&map(4, 4, 16, 8), true).cell_transform(2, 3);
        // translate(32, 24) followed by scale(48, 32)
        assert_eq!((t.sx, t.sy), (48.0, 32.0));
        assert_eq!((t.tx, t.ty), (32.0 * 48.0, 24.0 * 32.0));
    }

    #[test]
    fn test_orient_no_flags_is_identity() {
        let ts = Tileset::default();
        let engine = engine(&map(1, 1, 3, 2), false);
        assert_eq!(engine.orient_tile(&tile(&ts, false, false, false), asymmetric()), asymmetric());
    }

    #[test]
    fn test_orient_diagonal_is_transpose() {
        let ts = Tileset::default();
        let engine = engine(&map(1, 1, 3, 2), false);
        let src = asymmetric();
        let out = engine.orient_tile(&tile(&ts, true, false, false), src.clone());
        assert_eq!(out.dimensions(), (2, 3));
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(y, x));
            }
        }
    }

    #[test]
    fn test_orient_horizontal_and_vertical() {
        let ts = Tileset::default();
        let engine = engine(&map(1, 1, 3, 2), false);
        let src = asymmetric();

        let h = engine.orient_tile(&tile(&ts, false, true, false), src.clone());
        assert_eq!(h.get_pixel(0, 0), src.get_pixel(2, 0));

        let v = engine.orient_tile(&tile(&ts, false, false, true), src.clone());
        assert_eq!(v.get_pixel(0, 0), src.get_pixel(0, 1));
    }

    #[test]
    fn test_orient_order_matters() {
        let ts = Tileset::default();
        let engine = engine(&map(1, 1, 3, 2), false);
        let src = asymmetric();

        let both = engine.orient_tile(&tile(&ts, true, true, false), src.clone());
        let diag = engine.orient_tile(&tile(&ts, true, false, false), src.clone());
        let horiz = engine.orient_tile(&tile(&ts, false, true, false), src.clone());
        assert_ne!(both, diag);
        assert_ne!(both, horiz);

        // Reference: diagonal first, then horizontal
        let reference = imageops::flip_horizontal(&imageops::flip_horizontal(
            &imageops::rotate90(&src),
        ));
        assert_eq!(both, reference);
        // The combination is a clockwise quarter turn
        assert_eq!(both, imageops::rotate90(&src));
    }

    #[test]
    fn test_orient_diagonal_vertical_is_counter_clockwise_turn() {
        let ts = Tileset::default();
        let engine = engine(&map(1, 1, 3, 2), false);
        let src = asymmetric();
        let out = engine.orient_tile(&tile(&ts, true, false, true), src.clone());
        assert_eq!(out, imageops::rotate270(&src));
    }
}
