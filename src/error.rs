//! Error types for map rendering

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Orientation;

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Which sequence an out-of-range index was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Layer,
    ObjectGroup,
    Group,
    GroupLayer,
    GroupObjectGroup,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexKind::Layer => "layer",
            IndexKind::ObjectGroup => "object group",
            IndexKind::Group => "group",
            IndexKind::GroupLayer => "group layer",
            IndexKind::GroupObjectGroup => "group object group",
        };
        f.write_str(name)
    }
}

/// Error returned by the renderer and its tile image path.
///
/// A failed render call may leave the canvas partially drawn; call
/// [`Renderer::clear`](crate::renderer::Renderer::clear) before retrying if a
/// clean canvas is required.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Only orthogonal maps can be rendered
    #[error("unsupported orientation '{0}'")]
    UnsupportedOrientation(Orientation),
    /// The map's pixel size is empty or too large for one canvas
    #[error("cannot allocate a {width}x{height} px canvas")]
    InvalidCanvasSize { width: u64, height: u64 },
    /// Only the right-down render order is supported
    #[error("unsupported render order '{0}'")]
    UnsupportedRenderOrder(String),
    /// A layer, group or object group index is past the end of its sequence
    #[error("{kind} index {index} out of bounds (len {len})")]
    IndexOutOfBounds { kind: IndexKind, index: usize, len: usize },
    /// An asset could not be opened or decoded
    #[error("failed to decode image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// A tileset has no image for the requested local tile id
    #[error("tile {id} not found in tileset '{tileset}'")]
    TileNotFound { tileset: String, id: u32 },
    /// A global tile id does not belong to any tileset of the map
    #[error("invalid tile GID {0}")]
    InvalidTileGid(u32),
    /// A layer's tile data does not cover the map grid
    #[error("layer '{layer}' has {actual} tiles, map grid needs {expected}")]
    LayerSizeMismatch { layer: String, expected: usize, actual: usize },
}

impl RenderError {
    /// Wrap an I/O failure while opening an asset as a decode error.
    pub(crate) fn open_failed(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        RenderError::Decode { path: path.into(), source: image::ImageError::IoError(err) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = RenderError::IndexOutOfBounds { kind: IndexKind::GroupLayer, index: 4, len: 2 };
        assert_eq!(err.to_string(), "group layer index 4 out of bounds (len 2)");
    }

    #[test]
    fn test_canvas_size_message() {
        let err = RenderError::InvalidCanvasSize { width: 4_900_000_000, height: 16 };
        assert_eq!(err.to_string(), "cannot allocate a 4900000000x16 px canvas");
    }

    #[test]
    fn test_open_failed_keeps_io_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = RenderError::open_failed("tiles/grass.png", io);
        match &err {
            RenderError::Decode { path, source: image::ImageError::IoError(inner) } => {
                assert_eq!(path, &PathBuf::from("tiles/grass.png"));
                assert_eq!(inner.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("tiles/grass.png"));
    }
}
