//! Object groups and the freely positioned objects they hold.

use serde::{Deserialize, Serialize};

use super::layer::{default_opacity, default_visible};

/// A positioned entity, optionally showing a tile.
///
/// Tile objects are anchored at their bottom-left corner, as in Tiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Raw GID of the displayed tile (flip bits allowed), 0 for none
    #[serde(default)]
    pub gid: u32,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Clockwise rotation in degrees
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            gid: 0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            visible: true,
        }
    }
}

/// A layer of objects not aligned to the tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub objects: Vec<Object>,
}

impl Default for ObjectGroup {
    fn default() -> Self {
        Self { name: String::new(), visible: true, opacity: 1.0, objects: Vec::new() }
    }
}
