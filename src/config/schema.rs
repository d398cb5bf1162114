//! Configuration schema types for `tiled-raster.toml`
//!
//! Defines the structure and validation rules for renderer configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::{EncodeOptions, GifOptions, JpegOptions, OutputFormat};
use crate::renderer::RenderOptions;

/// Name of the configuration file looked up next to maps.
pub const CONFIG_FILE_NAME: &str = "tiled-raster.toml";

/// How maps are composited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Reproduce the legacy renderer's cell scaling and object placement
    #[serde(default)]
    pub legacy_geometry: bool,
    /// Directory tileset image paths are resolved against, instead of the
    /// map's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_root: Option<PathBuf>,
    /// Number of maps rendered in parallel (default: one per CPU)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

/// Where and how images are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format; guessed from `-o` or PNG when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// JPEG quality, 1-100
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// GIF quantization speed, 1-30
    #[serde(default = "default_gif_speed")]
    pub gif_speed: i32,
    /// Output file or directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            jpeg_quality: default_jpeg_quality(),
            gif_speed: default_gif_speed(),
            out: None,
        }
    }
}

fn default_jpeg_quality() -> u8 {
    JpegOptions::default().quality
}

fn default_gif_speed() -> i32 {
    GifOptions::default().speed
}

/// Complete `tiled-raster.toml` contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// A single problem found while validating a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "output.jpeg_quality")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: '{}' {}", CONFIG_FILE_NAME, self.field, self.message)
    }
}

impl RasterConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if !(1..=100).contains(&self.output.jpeg_quality) {
            errors.push(ConfigValidationError {
                field: "output.jpeg_quality".to_string(),
                message: "must be between 1 and 100".to_string(),
            });
        }

        if !(1..=30).contains(&self.output.gif_speed) {
            errors.push(ConfigValidationError {
                field: "output.gif_speed".to_string(),
                message: "must be between 1 and 30".to_string(),
            });
        }

        if self.render.jobs == Some(0) {
            errors.push(ConfigValidationError {
                field: "render.jobs".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default().with_legacy_geometry(self.render.legacy_geometry)
    }

    /// Encoder settings, with `fallback` used when no format is configured.
    pub fn encode_options(&self, fallback: OutputFormat) -> EncodeOptions {
        EncodeOptions {
            format: self.output.format.unwrap_or(fallback),
            jpeg: JpegOptions { quality: self.output.jpeg_quality },
            gif: GifOptions { speed: self.output.gif_speed },
        }
    }
}
