//! Image encoding and output path generation

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, Frame, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Encoded image container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Gif,
}

impl OutputFormat {
    /// Guess the format from a file extension (case-insensitive).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(OutputFormat::Png),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "gif" => Some(OutputFormat::Gif),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Gif => "gif",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Gif => "gif",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "gif" => Ok(OutputFormat::Gif),
            other => Err(format!("unknown output format '{}' (expected png, jpeg or gif)", other)),
        }
    }
}

/// JPEG encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegOptions {
    /// 1 (smallest) to 100 (best); out-of-range values are clamped
    pub quality: u8,
}

impl Default for JpegOptions {
    fn default() -> Self {
        Self { quality: 75 }
    }
}

/// GIF encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifOptions {
    /// Palette quantization speed, 1 (slowest, best) to 30 (fastest)
    pub speed: i32,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

/// Everything needed to write one image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub format: OutputFormat,
    pub jpeg: JpegOptions,
    pub gif: GifOptions,
}

/// Encode as PNG, keeping the alpha channel.
pub fn encode_png<W: Write>(image: &RgbaImage, writer: W) -> Result<(), OutputError> {
    let (w, h) = image.dimensions();
    PngEncoder::new(writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?;
    Ok(())
}

/// Encode as JPEG. Alpha is dropped.
pub fn encode_jpeg<W: Write>(
    image: &RgbaImage,
    mut writer: W,
    options: &JpegOptions,
) -> Result<(), OutputError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let (w, h) = rgb.dimensions();
    let quality = options.quality.clamp(1, 100);
    JpegEncoder::new_with_quality(&mut writer, quality).write_image(rgb.as_raw(), w, h, ColorType::Rgb8)?;
    Ok(())
}

/// Encode as a single-frame GIF.
pub fn encode_gif<W: Write>(image: &RgbaImage, writer: W, options: &GifOptions) -> Result<(), OutputError> {
    let mut encoder = GifEncoder::new_with_speed(writer, options.speed.clamp(1, 30));
    encoder.encode_frame(Frame::new(image.clone()))?;
    Ok(())
}

/// Encode in the format selected by `options`.
pub fn encode<W: Write>(image: &RgbaImage, writer: W, options: &EncodeOptions) -> Result<(), OutputError> {
    match options.format {
        OutputFormat::Png => encode_png(image, writer),
        OutputFormat::Jpeg => encode_jpeg(image, writer, &options.jpeg),
        OutputFormat::Gif => encode_gif(image, writer, &options.gif),
    }
}

/// Save an image to `path`, creating parent directories as needed.
pub fn save_image(image: &RgbaImage, path: &Path, options: &EncodeOptions) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    encode(image, &mut writer, options)?;
    writer.flush()?;
    Ok(())
}

/// Generate the output path for one rendered image.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `{map_dir}/{map}[_{suffix}].{ext}` |
/// | `-o dir/` | `dir/{map}[_{suffix}].{ext}` |
/// | `-o out.png`, single image | `out.png` |
/// | `-o out.png`, several images | `out_{map}[_{suffix}].{ext}` |
///
/// `suffix` distinguishes several images rendered from the same map.
pub fn generate_output_path(
    input: &Path,
    suffix: Option<&str>,
    output_arg: Option<&Path>,
    format: OutputFormat,
    is_single_image: bool,
) -> PathBuf {
    let map_stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("map");
    let name = match suffix {
        Some(suffix) => format!("{}_{}", map_stem, suffix),
        None => map_stem.to_string(),
    };
    let file_name = format!("{}.{}", name, format.extension());

    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(file_name)
            } else if is_single_image {
                output.to_path_buf()
            } else {
                let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
                let ext = output.extension().and_then(|s| s.to_str()).unwrap_or(format.extension());
                let parent = output.parent().unwrap_or(Path::new(""));
                parent.join(format!("{}_{}.{}", stem, name, ext))
            }
        }
        None => input.parent().unwrap_or(Path::new("")).join(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 60, y as u8 * 80, 30, 255]))
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("gif".parse::<OutputFormat>(), Ok(OutputFormat::Gif));
        assert!("bmp".parse::<OutputFormat>().is_err());

        assert_eq!(OutputFormat::from_extension(Path::new("a/b.JPEG")), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension(Path::new("a/b")), None);
    }

    #[test]
    fn test_encode_png_roundtrip_pixels() {
        let img = sample();
        let mut buf = Vec::new();
        encode_png(&img, &mut buf).unwrap();

        let decoded = image::load_from_memory(&buf).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_encode_jpeg_drops_alpha() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 128]));
        let mut buf = Vec::new();
        encode_jpeg(&img, &mut buf, &JpegOptions { quality: 90 }).unwrap();

        let decoded = image::load_from_memory(&buf).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_encode_gif() {
        let mut buf = Cursor::new(Vec::new());
        encode_gif(&sample(), &mut buf, &GifOptions::default()).unwrap();

        let bytes = buf.into_inner();
        assert!(bytes.starts_with(b"GIF89a"));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_save_image_creates_parent_dirs() {
        let dir = TempDir::new().expect("should create temp dir");
        let path = dir.path().join("nested/deeper/map.png");

        save_image(&sample(), &path, &EncodeOptions::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_generate_output_path_default() {
        let path = generate_output_path(Path::new("maps/town.json"), None, None, OutputFormat::Png, true);
        assert_eq!(path, PathBuf::from("maps/town.png"));

        let path = generate_output_path(
            Path::new("town.json"),
            Some("ground"),
            None,
            OutputFormat::Jpeg,
            false,
        );
        assert_eq!(path, PathBuf::from("town_ground.jpg"));
    }

    #[test]
    fn test_generate_output_path_directory() {
        let path = generate_output_path(
            Path::new("maps/town.json"),
            None,
            Some(Path::new("out/")),
            OutputFormat::Gif,
            false,
        );
        assert_eq!(path, PathBuf::from("out/town.gif"));
    }

    #[test]
    fn test_generate_output_path_explicit_file() {
        let single = generate_output_path(
            Path::new("town.json"),
            None,
            Some(Path::new("render.png")),
            OutputFormat::Png,
            true,
        );
        assert_eq!(single, PathBuf::from("render.png"));

        let multiple = generate_output_path(
            Path::new("town.json"),
            Some("roofs"),
            Some(Path::new("out/render.png")),
            OutputFormat::Png,
            false,
        );
        assert_eq!(multiple, PathBuf::from("out/render_town_roofs.png"));
    }
}
