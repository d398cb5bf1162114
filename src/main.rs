//! tiled-raster - Command-line tool for rendering Tiled maps to images

use std::process::ExitCode;

use tiled_raster::cli;

fn main() -> ExitCode {
    cli::run()
}
