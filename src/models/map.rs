//! The map itself: grid geometry, projection and the layer tree.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::layer::{Group, Layer, LayerTile, FLIP_DIAGONAL, FLIP_HORIZONTAL, FLIP_VERTICAL, GID_MASK};
use super::object::ObjectGroup;
use super::tileset::Tileset;
use crate::error::RenderError;

/// Map projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Orthogonal,
    Isometric,
    Staggered,
    Hexagonal,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Orientation::Orthogonal => "orthogonal",
            Orientation::Isometric => "isometric",
            Orientation::Staggered => "staggered",
            Orientation::Hexagonal => "hexagonal",
        };
        f.write_str(name)
    }
}

/// Order in which the cells of a tile layer are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderOrder {
    /// Left to right, top to bottom
    #[default]
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
}

impl fmt::Display for RenderOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderOrder::RightDown => "right-down",
            RenderOrder::RightUp => "right-up",
            RenderOrder::LeftDown => "left-down",
            RenderOrder::LeftUp => "left-up",
        };
        f.write_str(name)
    }
}

/// Error loading the serialized form of a [`Map`].
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("Failed to read map '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse map '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A tile map ready for rendering.
///
/// Tilesets are shared by every layer and object that references them;
/// a [`LayerTile`] borrows its tileset from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub render_order: RenderOrder,
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub object_groups: Vec<ObjectGroup>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Map {
    /// Parse a map from its JSON form.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a map from a JSON file.
    ///
    /// Tilesets without an explicit `base_dir` resolve their images relative
    /// to the directory containing the map file.
    pub fn load(path: &Path) -> Result<Self, MapLoadError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| MapLoadError::Io { path: path.to_path_buf(), source })?;
        let mut map = Self::from_json_str(&contents)
            .map_err(|source| MapLoadError::Parse { path: path.to_path_buf(), source })?;

        let map_dir = path.parent().unwrap_or(Path::new(""));
        for tileset in &mut map.tilesets {
            if tileset.base_dir.as_os_str().is_empty() {
                tileset.base_dir = map_dir.to_path_buf();
            } else if tileset.base_dir.is_relative() {
                tileset.base_dir = map_dir.join(&tileset.base_dir);
            }
        }

        Ok(map)
    }

    /// Number of cells in the map grid.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Decode a raw GID (flip bits included) into a tile reference.
    ///
    /// Returns `Ok(None)` for GID 0, the empty cell. The owning tileset is the
    /// one with the greatest `first_gid` not above the GID.
    pub fn tile_gid_to_tile(&self, raw_gid: u32) -> Result<Option<LayerTile<'_>>, RenderError> {
        let gid = raw_gid & GID_MASK;
        if gid == 0 {
            return Ok(None);
        }

        let tileset = self
            .tilesets
            .iter()
            .filter(|ts| ts.first_gid <= gid)
            .max_by_key(|ts| ts.first_gid)
            .ok_or(RenderError::InvalidTileGid(gid))?;

        Ok(Some(LayerTile {
            tileset,
            id: gid - tileset.first_gid,
            horizontal_flip: raw_gid & FLIP_HORIZONTAL != 0,
            vertical_flip: raw_gid & FLIP_VERTICAL != 0,
            diagonal_flip: raw_gid & FLIP_DIAGONAL != 0,
        }))
    }
}
