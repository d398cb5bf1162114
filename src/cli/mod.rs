//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod render;

use clap::builder::TypedValueParser;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::output::OutputFormat;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Check if a path looks like a Tiled JSON map.
pub fn is_map_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("json"))
}

/// Find all map files in a directory (recursively), sorted.
pub fn find_map_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/**/*.json", glob::Pattern::escape(&dir.display().to_string()));
    let mut files: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

/// tiled-raster - Render Tiled maps to PNG, JPEG or GIF
#[derive(Parser)]
#[command(name = "tiled-raster")]
#[command(about = "tiled-raster - Render Tiled maps to PNG, JPEG or GIF")]
#[command(version)]
pub struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render maps to images
    Render(RenderArgs),
}

/// Arguments of the `render` command
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Map files (.json) or directories searched recursively for them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file or directory.
    /// If omitted: {map_dir}/{map}.{ext}
    /// If directory (ends with /): dir/{map}.{ext}
    /// If file (single image): as given
    /// If file (several images): {file}_{map}.{ext}
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: png, jpeg or gif (default: from -o extension, else png)
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// JPEG quality (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// GIF quantization speed (1-30, lower is better quality)
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=30))]
    pub gif_speed: Option<i32>,

    /// Only render the top-level layer with this index
    #[arg(long, conflicts_with_all = ["group", "object_group", "separate_layers"])]
    pub layer: Option<usize>,

    /// Only render the group with this index
    #[arg(long, conflicts_with_all = ["object_group", "separate_layers"])]
    pub group: Option<usize>,

    /// Only render the top-level object group with this index
    #[arg(long, conflicts_with = "separate_layers")]
    pub object_group: Option<usize>,

    /// Write one image per visible top-level layer
    #[arg(long)]
    pub separate_layers: bool,

    /// Reproduce the legacy renderer's cell scaling and object placement
    #[arg(long)]
    pub legacy_geometry: bool,

    /// Resolve tileset images against this directory instead of the map's
    #[arg(long)]
    pub asset_root: Option<PathBuf>,

    /// Config file (default: tiled-raster.toml found from the first map's directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maps rendered in parallel (default: one per CPU)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    pub jobs: Option<usize>,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render(args) => render::run_render(&args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // A logger may already be installed when run from tests
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}
