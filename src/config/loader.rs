//! Configuration loading and discovery for `tiled-raster.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{RasterConfig, CONFIG_FILE_NAME};
use crate::output::OutputFormat;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse tiled-raster.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub legacy_geometry: Option<bool>,
    pub asset_root: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub format: Option<OutputFormat>,
    pub jpeg_quality: Option<u8>,
    pub gif_speed: Option<i32>,
    pub out: Option<PathBuf>,
}

/// Find the config file by walking up from the current working directory,
/// falling back to `$XDG_CONFIG_HOME/tiled-raster/tiled-raster.toml`.
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find the config file in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("tiled-raster").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find the config file by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate one, and returns the default configuration if
/// there is none. Relative `asset_root` and `out` paths are resolved against
/// the config file's directory.
pub fn load_config(path: Option<&Path>) -> Result<RasterConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(RasterConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<RasterConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: RasterConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    let root = project_root(path).unwrap_or(Path::new(""));
    if let Some(asset_root) = &config.render.asset_root {
        config.render.asset_root = Some(resolve_path(root, asset_root));
    }
    if let Some(out) = &config.output.out {
        config.output.out = Some(resolve_path(root, out));
    }

    log::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut RasterConfig, overrides: &CliOverrides) {
    if let Some(legacy_geometry) = overrides.legacy_geometry {
        config.render.legacy_geometry = legacy_geometry;
    }
    if let Some(ref asset_root) = overrides.asset_root {
        config.render.asset_root = Some(asset_root.clone());
    }
    if let Some(jobs) = overrides.jobs {
        config.render.jobs = Some(jobs);
    }

    if let Some(format) = overrides.format {
        config.output.format = Some(format);
    }
    if let Some(quality) = overrides.jpeg_quality {
        config.output.jpeg_quality = quality;
    }
    if let Some(speed) = overrides.gif_speed {
        config.output.gif_speed = speed;
    }
    if let Some(ref out) = overrides.out {
        config.output.out = Some(out.clone());
    }
}

/// Directory containing the config file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
