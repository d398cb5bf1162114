//! In-memory tile map model consumed by the renderer.
//!
//! The types mirror Tiled's map structure and can be (de)serialized with serde,
//! so a map produced by any loader can be stored and fed back as JSON.

mod layer;
mod map;
mod object;
mod tileset;

// Re-export all public types
pub use layer::{
    Group, Layer, LayerTile, FLIP_DIAGONAL, FLIP_HORIZONTAL, FLIP_VERTICAL, GID_MASK,
};
pub use map::{Map, MapLoadError, Orientation, RenderOrder};
pub use object::{Object, ObjectGroup};
pub use tileset::{TileRect, Tileset, TilesetImage, TilesetTile};
