//! Tilesets and the tile rectangles they are sliced into.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::RenderError;

/// An image referenced by a tileset or one of its tiles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TilesetImage {
    /// Path relative to the tileset's base directory, `/`-separated
    pub source: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Per-tile data of a tileset. Image-collection tilesets carry one image per tile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TilesetTile {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<TilesetImage>,
}

/// Pixel rectangle of one tile inside a tileset image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A named collection of tiles occupying `first_gid..first_gid + tile_count`
/// of the map's global tile id space.
///
/// Either `image` is set and every tile is a cell of that one image, or it is
/// `None` and each entry of `tiles` points at its own image file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tileset {
    pub name: String,
    pub first_gid: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
    /// Columns in the shared image; 0 derives it from the image width
    #[serde(default)]
    pub columns: u32,
    pub tile_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<TilesetImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TilesetTile>,
    /// Directory image sources are relative to
    #[serde(default)]
    pub base_dir: PathBuf,
}

impl Tileset {
    /// The image all tiles are cut from, or `None` for an image collection.
    pub fn shared_image(&self) -> Option<&TilesetImage> {
        self.image.as_ref()
    }

    /// Rectangle of local tile `id` in the shared image, laid out row-major.
    ///
    /// `None` when the rectangle's position does not fit in `u32`.
    pub fn tile_rect(&self, id: u32) -> Option<TileRect> {
        let stride_x = self.tile_width.checked_add(self.spacing)?;
        let stride_y = self.tile_height.checked_add(self.spacing)?;
        let columns = if self.columns > 0 {
            self.columns
        } else {
            let image_width = self.shared_image().map(|img| img.width).unwrap_or(0);
            if stride_x == 0 {
                1
            } else {
                (image_width.saturating_sub(self.margin) / stride_x).max(1)
            }
        };

        let col = id % columns;
        let row = id / columns;
        Some(TileRect {
            x: col.checked_mul(stride_x)?.checked_add(self.margin)?,
            y: row.checked_mul(stride_y)?.checked_add(self.margin)?,
            width: self.tile_width,
            height: self.tile_height,
        })
    }

    /// Look up the per-tile entry for local tile `id`.
    pub fn tileset_tile(&self, id: u32) -> Result<&TilesetTile, RenderError> {
        self.tiles
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| RenderError::TileNotFound { tileset: self.name.clone(), id })
    }

    /// Resolve an image source against the tileset's base directory.
    pub fn file_full_path(&self, source: &str) -> PathBuf {
        if self.base_dir.as_os_str().is_empty() {
            PathBuf::from(source)
        } else {
            Path::new(&self.base_dir).join(source)
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(columns: u32, spacing: u32, margin: u32) -> Tileset {
        Tileset {
            name: "terrain".to_string(),
            first_gid: 1,
            tile_width: 16,
            tile_height: 8,
            spacing,
            margin,
            columns,
            tile_count: 12,
            image: Some(TilesetImage { source: "terrain.png".to_string(), width: 64, height: 24 }),
            ..Default::default()
        }
    }

    #[test]
    fn test_tile_rect_row_major() {
        let ts = sheet(4, 0, 0);
        assert_eq!(ts.tile_rect(0), Some(TileRect { x: 0, y: 0, width: 16, height: 8 }));
        assert_eq!(ts.tile_rect(3), Some(TileRect { x: 48, y: 0, width: 16, height: 8 }));
        assert_eq!(ts.tile_rect(5), Some(TileRect { x: 16, y: 8, width: 16, height: 8 }));
    }

    #[test]
    fn test_tile_rect_spacing_and_margin() {
        let ts = sheet(3, 2, 1);
        // col 1, row 1
        assert_eq!(ts.tile_rect(4), Some(TileRect { x: 1 + 18, y: 1 + 10, width: 16, height: 8 }));
    }

    #[test]
    fn test_tile_rect_derives_columns() {
        let ts = sheet(0, 0, 0);
        // 64px wide image / 16px tiles = 4 columns
        assert_eq!(ts.tile_rect(4), Some(TileRect { x: 0, y: 8, width: 16, height: 8 }));
    }

    #[test]
    fn test_tileset_tile_lookup() {
        let ts = Tileset {
            name: "props".to_string(),
            tiles: vec![
                TilesetTile { id: 0, image: None },
                TilesetTile { id: 7, image: None },
            ],
            ..Default::default()
        };
        assert_eq!(ts.tileset_tile(7).unwrap().id, 7);
        assert!(matches!(
            ts.tileset_tile(3),
            Err(RenderError::TileNotFound { ref tileset, id: 3 }) if tileset == "props"
        ));
    }

    #[test]
    fn test_file_full_path() {
        let mut ts = sheet(4, 0, 0);
        assert_eq!(ts.file_full_path("a.png"), PathBuf::from("a.png"));
        ts.base_dir = PathBuf::from("maps");
        assert_eq!(ts.file_full_path("img/a.png"), PathBuf::from("maps").join("img/a.png"));
    }

    #[test]
    fn test_tile_rect_overflow_is_none() {
        let ts = Tileset { tile_width: 1, tile_height: 70_000, columns: 1, tile_count: 70_000, ..Default::default() };
        assert_eq!(ts.tile_rect(1), Some(TileRect { x: 0, y: 70_000, width: 1, height: 70_000 }));
        assert_eq!(ts.tile_rect(69_999), None);

        let ts = Tileset { tile_width: u32::MAX, spacing: 1, columns: 2, ..Default::default() };
        assert_eq!(ts.tile_rect(0), None);
    }

    #[test]
    fn test_shared_image() {
        assert_eq!(sheet(4, 0, 0).shared_image().map(|img| img.width), Some(64));
        assert!(Tileset::default().shared_image().is_none());
    }
}
