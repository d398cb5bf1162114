//! Drawing primitives: affine blits of RGBA images onto a pixmap canvas

mod pixmap;
mod view;

// Re-export public API
pub use pixmap::{to_pixmap, to_rgba_image};
pub use view::ImageView;

use image::RgbaImage;
use tiny_skia::{BlendMode, FilterQuality, Paint, Pattern, Pixmap, PixmapRef, Rect, SpreadMode, Transform};

/// Draw `src` onto `canvas` under `transform`, source-over, with the source
/// alpha scaled by `opacity`. Returns whether anything was submitted.
pub fn draw_image(canvas: &mut Pixmap, src: &RgbaImage, transform: Transform, opacity: f32) -> bool {
    match to_pixmap(src) {
        Some(src) => draw_pixmap(canvas, src.as_ref(), transform, opacity),
        None => false,
    }
}

/// Pixmap form of [`draw_image`].
///
/// Sampling is nearest-neighbour and edges are not anti-aliased: a canvas
/// pixel is covered when its center lies inside the transformed image, so
/// tiles placed on whole pixels land exactly.
pub fn draw_pixmap(canvas: &mut Pixmap, src: PixmapRef<'_>, transform: Transform, opacity: f32) -> bool {
    if opacity <= 0.0 {
        return false;
    }
    let Some(rect) = Rect::from_xywh(0.0, 0.0, src.width() as f32, src.height() as f32) else {
        return false;
    };

    let mut paint = Paint::default();
    paint.shader =
        Pattern::new(src, SpreadMode::Pad, FilterQuality::Nearest, opacity.min(1.0), Transform::identity());
    paint.blend_mode = BlendMode::SourceOver;
    paint.anti_alias = false;
    canvas.fill_rect(rect, &paint, transform, None);
    true
}
