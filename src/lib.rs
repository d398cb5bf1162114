//! tiled-raster - Library for rasterizing Tiled maps
//!
//! This library provides functionality to:
//! - Load orthogonal Tiled maps from their JSON form
//! - Decode and cache tileset images from the filesystem or memory
//! - Composite layers, object groups and groups onto an RGBA canvas
//! - Encode the result as PNG, JPEG or GIF
//!
//! ```ignore
//! use tiled_raster::{Map, Renderer};
//!
//! let map = Map::load(Path::new("maps/town.json"))?;
//! let mut renderer = Renderer::new(&map)?;
//! renderer.render_visible_layers_and_object_groups()?;
//! renderer.save_as_png(std::fs::File::create("town.png")?)?;
//! ```

pub mod assets;
pub mod cache;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod renderer;

pub use assets::{AssetSource, FsAssets, MemoryAssets};
pub use error::{RenderError, Result};
pub use models::Map;
pub use renderer::{RenderOptions, Renderer};
