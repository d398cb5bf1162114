//! Configuration for the `tiled-raster` command
//!
//! Provides types, discovery and parsing for `tiled-raster.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
