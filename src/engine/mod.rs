//! Map geometry engines
//!
//! An engine knows how a map projection lays tiles out on the canvas: how big
//! the final image is, where each grid cell goes and how a tile's flip flags
//! turn into pixels. Only the orthogonal projection is implemented; adding
//! another one means adding another [`RendererEngine`] and teaching
//! [`engine_for`] about it.

mod orthogonal;

pub use orthogonal::OrthogonalEngine;

use image::RgbaImage;
use tiny_skia::Transform;

use crate::error::{RenderError, Result};
use crate::models::{LayerTile, Map, Orientation};

/// Geometry facts for one map projection.
pub trait RendererEngine {
    /// Canvas size in pixels.
    fn final_size(&self) -> (u32, u32);

    /// Transform placing a tile image at grid cell `(x, y)`.
    fn cell_transform(&self, x: u32, y: u32) -> Transform;

    /// Apply the tile's flip flags to its image.
    fn orient_tile(&self, tile: &LayerTile<'_>, image: RgbaImage) -> RgbaImage;
}

/// Pick the engine for a map's orientation.
///
/// Fails with [`RenderError::UnsupportedOrientation`] for anything but
/// orthogonal maps and with [`RenderError::InvalidCanvasSize`] when the
/// pixel size does not fit in `u32`. No assets are touched.
pub fn engine_for(map: &Map, legacy_geometry: bool) -> Result<Box<dyn RendererEngine>> {
    match map.orientation {
        Orientation::Orthogonal => Ok(Box::new(OrthogonalEngine::new(map, legacy_geometry)?)),
        other => Err(RenderError::UnsupportedOrientation(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenderOrder;

    fn map(orientation: Orientation) -> Map {
        Map {
            orientation,
            render_order: RenderOrder::RightDown,
            width: 3,
            height: 2,
            tile_width: 16,
            tile_height: 8,
            tilesets: vec![],
            layers: vec![],
            object_groups: vec![],
            groups: vec![],
        }
    }

    #[test]
    fn test_engine_for_orthogonal() {
        let engine = engine_for(&map(Orientation::Orthogonal), false).unwrap();
        assert_eq!(engine.final_size(), (48, 16));
    }

    #[test]
    fn test_engine_for_other_orientations() {
        for orientation in [Orientation::Isometric, Orientation::Staggered, Orientation::Hexagonal] {
            match engine_for(&map(orientation), false) {
                Err(RenderError::UnsupportedOrientation(o)) => assert_eq!(o, orientation),
                Err(e) => panic!("unexpected error {}", e),
                Ok(_) => panic!("{} should be rejected", orientation),
            }
        }
    }

    #[test]
    fn test_engine_for_oversized_map() {
        let mut map = map(Orientation::Orthogonal);
        map.width = 70_000;
        map.tile_width = 70_000;
        assert!(matches!(
            engine_for(&map, false),
            Err(RenderError::InvalidCanvasSize { width: 4_900_000_000, height: 16 })
        ));
    }
}
