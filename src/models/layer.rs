//! Tile layers, groups and placed tile references.

use serde::{Deserialize, Serialize};

use super::object::ObjectGroup;
use super::tileset::Tileset;

/// Raw GID bit set when the tile is flipped horizontally.
pub const FLIP_HORIZONTAL: u32 = 0x8000_0000;
/// Raw GID bit set when the tile is flipped vertically.
pub const FLIP_VERTICAL: u32 = 0x4000_0000;
/// Raw GID bit set when the tile is flipped anti-diagonally (x/y swapped).
pub const FLIP_DIAGONAL: u32 = 0x2000_0000;
/// Mask keeping the tile id part of a raw GID.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

pub(crate) fn default_visible() -> bool {
    true
}

pub(crate) fn default_opacity() -> f32 {
    1.0
}

/// A grid of placed tiles covering the whole map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Raw GIDs, row-major, flip bits included; 0 is an empty cell
    #[serde(default)]
    pub tiles: Vec<u32>,
}

impl Default for Layer {
    fn default() -> Self {
        Self { name: String::new(), visible: true, opacity: 1.0, tiles: Vec::new() }
    }
}

/// A container ordering tile layers and object groups together.
///
/// Group opacity is carried for completeness but not applied when drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub object_groups: Vec<ObjectGroup>,
}

impl Default for Group {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            opacity: 1.0,
            layers: Vec::new(),
            object_groups: Vec::new(),
        }
    }
}

/// A decoded tile reference: owning tileset, local id and flip flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTile<'a> {
    pub tileset: &'a Tileset,
    /// Local tile index within `tileset`
    pub id: u32,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
    pub diagonal_flip: bool,
}

impl<'a> LayerTile<'a> {
    /// Global id of the tile, flip bits stripped.
    pub fn global_id(&self) -> u32 {
        self.tileset.first_gid + self.id
    }

    /// Clockwise rotation in degrees encoded by the flip flags.
    ///
    /// Returns `None` when the combination includes a mirror and so is not a
    /// pure rotation.
    pub fn rotation(&self) -> Option<u32> {
        match (self.diagonal_flip, self.horizontal_flip, self.vertical_flip) {
            (false, false, false) => Some(0),
            (true, true, false) => Some(90),
            (false, true, true) => Some(180),
            (true, false, true) => Some(270),
            _ => None,
        }
    }

    /// Whether any flip flag is set.
    pub fn is_flipped(&self) -> bool {
        self.horizontal_flip || self.vertical_flip || self.diagonal_flip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(ts: &Tileset, d: bool, h: bool, v: bool) -> LayerTile<'_> {
        LayerTile { tileset: ts, id: 2, horizontal_flip: h, vertical_flip: v, diagonal_flip: d }
    }

    #[test]
    fn test_rotation_from_flags() {
        let ts = Tileset { first_gid: 10, ..Default::default() };
        assert_eq!(tile(&ts, false, false, false).rotation(), Some(0));
        assert_eq!(tile(&ts, true, true, false).rotation(), Some(90));
        assert_eq!(tile(&ts, false, true, true).rotation(), Some(180));
        assert_eq!(tile(&ts, true, false, true).rotation(), Some(270));
        assert_eq!(tile(&ts, false, true, false).rotation(), None);
        assert_eq!(tile(&ts, true, false, false).rotation(), None);
    }

    #[test]
    fn test_global_id() {
        let ts = Tileset { first_gid: 10, ..Default::default() };
        assert_eq!(tile(&ts, false, false, false).global_id(), 12);
        assert!(!tile(&ts, false, false, false).is_flipped());
        assert!(tile(&ts, false, false, true).is_flipped());
    }

    #[test]
    fn test_flip_bits_do_not_overlap_mask() {
        assert_eq!(FLIP_HORIZONTAL & GID_MASK, 0);
        assert_eq!(FLIP_VERTICAL & GID_MASK, 0);
        assert_eq!(FLIP_DIAGONAL & GID_MASK, 0);
    }
}
