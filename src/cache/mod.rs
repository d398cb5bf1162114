//! Memoizing caches over image decoding
//!
//! Both caches are compute-if-absent maps scoped to their owner: nothing is
//! evicted and nothing is shared between owners.

mod tiles;
mod tileset;

pub use tiles::TileImageCache;
pub use tileset::TilesetCache;
