//! Render command implementation and helpers

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::assets::FsAssets;
use crate::config::{find_config_from, load_config, merge_cli_overrides, CliOverrides, RasterConfig};
use crate::models::{Layer, Map};
use crate::output::{generate_output_path, EncodeOptions, OutputFormat};
use crate::renderer::{RenderOptions, Renderer};

use super::{find_map_files, is_map_file, RenderArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// What part of each map gets drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    /// Visible layers, visible object groups, then visible groups
    All,
    Layer(usize),
    Group(usize),
    ObjectGroup(usize),
    /// One image per visible top-level layer
    SeparateLayers,
}

/// Settings shared by every map of one invocation
struct RenderJob<'a> {
    selection: Selection,
    options: RenderOptions,
    encode: EncodeOptions,
    asset_root: Option<&'a Path>,
    output: Option<&'a Path>,
    single_image: bool,
}

/// Execute the render command
pub fn run_render(args: &RenderArgs) -> ExitCode {
    let maps = match collect_inputs(&args.inputs) {
        Ok(maps) => maps,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    if maps.is_empty() {
        eprintln!("Error: No map files found in input");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let config_path = args.config.clone().or_else(|| discover_config(&maps[0]));
    let mut config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load tiled-raster.toml: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    merge_cli_overrides(&mut config, &overrides(args));

    let selection = selection(args);
    let job = RenderJob {
        selection,
        options: config.render_options(),
        encode: encode_options(&config),
        asset_root: config.render.asset_root.as_deref(),
        output: config.output.out.as_deref(),
        single_image: maps.len() == 1 && selection != Selection::SeparateLayers,
    };

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(config.render.jobs.unwrap_or(0)).build() {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Error: Failed to start worker threads: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    log::debug!("rendering {} map(s) on {} thread(s)", maps.len(), pool.current_num_threads());

    let results: Vec<Result<Vec<PathBuf>, String>> =
        pool.install(|| maps.par_iter().map(|path| render_map(path, &job)).collect());

    let mut failed = false;
    for (path, result) in maps.iter().zip(results) {
        match result {
            Ok(saved) if saved.is_empty() => {
                eprintln!("Warning: map '{}' has no visible layers", path.display());
            }
            Ok(saved) => {
                for output in saved {
                    println!("Saved: {}", output.display());
                }
            }
            Err(msg) => {
                eprintln!("Error: map '{}': {}", path.display(), msg);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Expand directories into the map files below them.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut maps = Vec::new();
    for input in inputs {
        if input.is_dir() {
            maps.extend(find_map_files(input));
        } else if input.exists() {
            if !is_map_file(input) {
                eprintln!("Warning: '{}' does not have a .json extension", input.display());
            }
            maps.push(input.clone());
        } else {
            return Err(format!("Cannot open input file '{}'", input.display()));
        }
    }
    Ok(maps)
}

/// Look for the config file starting at the map's directory.
fn discover_config(map: &Path) -> Option<PathBuf> {
    let dir = map.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    find_config_from(start)
}

fn overrides(args: &RenderArgs) -> CliOverrides {
    CliOverrides {
        legacy_geometry: args.legacy_geometry.then_some(true),
        asset_root: args.asset_root.clone(),
        jobs: args.jobs,
        format: args.format,
        jpeg_quality: args.quality,
        gif_speed: args.gif_speed,
        out: args.output.clone(),
    }
}

fn selection(args: &RenderArgs) -> Selection {
    if args.separate_layers {
        Selection::SeparateLayers
    } else if let Some(index) = args.layer {
        Selection::Layer(index)
    } else if let Some(index) = args.group {
        Selection::Group(index)
    } else if let Some(index) = args.object_group {
        Selection::ObjectGroup(index)
    } else {
        Selection::All
    }
}

/// Encoder settings; without a configured format, the `-o` extension decides.
fn encode_options(config: &RasterConfig) -> EncodeOptions {
    let fallback = config
        .output
        .out
        .as_deref()
        .filter(|out| !out.to_string_lossy().ends_with('/') && !out.is_dir())
        .and_then(OutputFormat::from_extension)
        .unwrap_or_default();
    config.encode_options(fallback)
}

/// Render one map and write its image(s), returning the written paths.
fn render_map(path: &Path, job: &RenderJob<'_>) -> Result<Vec<PathBuf>, String> {
    let mut map = Map::load(path).map_err(|e| e.to_string())?;
    let assets = match job.asset_root {
        Some(root) => {
            // Sources become relative to the asset root
            for tileset in &mut map.tilesets {
                tileset.base_dir = PathBuf::new();
            }
            FsAssets::with_root(root)
        }
        None => FsAssets::new(),
    };

    let mut renderer = Renderer::with_options(&map, assets, job.options).map_err(|e| e.to_string())?;
    let format = job.encode.format;
    let mut saved = Vec::new();

    if job.selection == Selection::SeparateLayers {
        for (index, layer) in map.layers.iter().enumerate().filter(|(_, l)| l.visible) {
            renderer.clear();
            renderer.render_layer(index).map_err(|e| e.to_string())?;

            let label = layer_label(index, layer);
            let out = generate_output_path(path, Some(&label), job.output, format, false);
            renderer
                .save(&out, &job.encode)
                .map_err(|e| format!("Failed to save '{}': {}", out.display(), e))?;
            saved.push(out);
        }
        return Ok(saved);
    }

    let drawn = match job.selection {
        Selection::Layer(index) => renderer.render_layer(index),
        Selection::Group(index) => renderer.render_group(index),
        Selection::ObjectGroup(index) => renderer.render_object_group(index),
        _ => renderer
            .render_visible_layers_and_object_groups()
            .and_then(|_| renderer.render_visible_groups()),
    };
    drawn.map_err(|e| e.to_string())?;
    log::debug!("{}: {:?}", path.display(), renderer.stats());

    let out = generate_output_path(path, None, job.output, format, job.single_image);
    renderer
        .save(&out, &job.encode)
        .map_err(|e| format!("Failed to save '{}': {}", out.display(), e))?;
    saved.push(out);
    Ok(saved)
}

/// File-name-safe label for a layer: its name, or `layer{index}` if unnamed.
fn layer_label(index: usize, layer: &Layer) -> String {
    let label: String = layer
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if label.is_empty() {
        format!("layer{}", index)
    } else {
        label
    }
}
