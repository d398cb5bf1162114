//! Shared, copy-free views into decoded images

use image::RgbaImage;
use std::sync::Arc;

use crate::models::TileRect;

/// A rectangular region of a decoded image.
///
/// Slicing a tileset sheet produces one view per tile; all of them share the
/// same decoded pixels until [`to_image`](ImageView::to_image) is called.
#[derive(Debug, Clone)]
pub struct ImageView {
    source: Arc<RgbaImage>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl ImageView {
    /// View covering the whole image.
    pub fn full(source: Arc<RgbaImage>) -> Self {
        let (width, height) = source.dimensions();
        Self { source, x: 0, y: 0, width, height }
    }

    /// View of `rect`, clipped to the image bounds.
    pub fn sub(source: Arc<RgbaImage>, rect: TileRect) -> Self {
        let (w, h) = source.dimensions();
        let x = rect.x.min(w);
        let y = rect.y.min(h);
        let width = rect.width.min(w - x);
        let height = rect.height.min(h - y);
        Self { source, x, y, width, height }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copy the viewed pixels into an owned image.
    pub fn to_image(&self) -> RgbaImage {
        image::imageops::crop_imm(self.source.as_ref(), self.x, self.y, self.width, self.height)
            .to_image()
    }
}
