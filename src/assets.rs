//! Asset access for tileset images
//!
//! The renderer never touches the filesystem directly. Image sources are
//! opened through an [`AssetSource`], which is either the local filesystem
//! ([`FsAssets`]) or an in-memory/embedded store ([`MemoryAssets`]).

use image::RgbaImage;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{RenderError, Result};

/// Opens image assets by tileset-relative path.
///
/// Paths handed to [`open`](AssetSource::open) are `/`-separated as stored in
/// the map; each source converts them to its own convention.
pub trait AssetSource {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;
}

impl<T: AssetSource + ?Sized> AssetSource for Arc<T> {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }
}

impl<T: AssetSource + ?Sized> AssetSource for &T {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }
}

/// Convert a `/`-separated path to the platform's separator.
fn from_slash(path: &Path) -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(path.to_string_lossy().replace('/', "\\"))
    } else {
        path.to_path_buf()
    }
}

/// Convert a platform path to a `/`-separated key.
fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").map(str::to_string).unwrap_or(s)
}

/// Local filesystem, optionally rooted at a directory.
#[derive(Debug, Clone, Default)]
pub struct FsAssets {
    root: Option<PathBuf>,
}

impl FsAssets {
    /// Open paths as given (relative to the working directory).
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    /// The path that will actually be opened for `path`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let native = from_slash(path);
        match &self.root {
            Some(root) if native.is_relative() => root.join(native),
            _ => native,
        }
    }
}

impl AssetSource for FsAssets {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(self.resolve(path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Embedded or virtual filesystem keyed by `/`-separated paths.
///
/// Counts successful opens, which makes decode caching observable.
#[derive(Debug, Default)]
pub struct MemoryAssets {
    files: RwLock<HashMap<String, Arc<[u8]>>>,
    opens: AtomicUsize,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) {
        let key = to_slash(path.as_ref());
        let bytes: Arc<[u8]> = bytes.into().into();
        self.files_mut().insert(key, bytes);
    }

    /// Builder form of [`insert`](MemoryAssets::insert).
    pub fn with_file(self, path: impl AsRef<Path>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    /// Remove a file, returning whether it existed.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let key = to_slash(path.as_ref());
        self.files_mut().remove(&key).is_some()
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    // Each insert or remove is a single map operation, so a panicking holder
    // cannot leave the store half-written; poisoning is ignored.
    fn files(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<[u8]>>> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<[u8]>>> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AssetSource for MemoryAssets {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let key = to_slash(path);
        let bytes = self.files().get(&key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("asset '{}' not found", key))
        })?;
        self.opens.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(Cursor::new(bytes)))
    }
}

/// Open and decode an image of any format the `image` crate recognizes.
///
/// Open and read failures are reported as [`RenderError::Decode`] wrapping
/// the I/O error.
pub fn decode_image(assets: &dyn AssetSource, path: &Path) -> Result<RgbaImage> {
    let mut reader = assets.open(path).map_err(|e| RenderError::open_failed(path, e))?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| RenderError::open_failed(path, e))?;

    let decoded = image::load_from_memory(&bytes)
        .map_err(|source| RenderError::Decode { path: path.to_path_buf(), source })?;
    log::debug!(
        "decoded '{}' ({}x{})",
        path.display(),
        decoded.width(),
        decoded.height()
    );
    Ok(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba};

    fn png_bytes(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, color);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_memory_assets_normalizes_keys() {
        let assets = MemoryAssets::new().with_file("./tiles\\grass.png", vec![1, 2, 3]);
        let mut buf = Vec::new();
        assets.open(Path::new("tiles/grass.png")).unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 2, 3]);
        assert_eq!(assets.open_count(), 1);
    }

    #[test]
    fn test_memory_assets_missing() {
        let assets = MemoryAssets::new();
        let err = assets.open(Path::new("nope.png")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(assets.open_count(), 0);
    }

    #[test]
    fn test_memory_assets_remove() {
        let assets = MemoryAssets::new().with_file("a.png", vec![0]);
        assert!(assets.remove("a.png"));
        assert!(!assets.remove("a.png"));
    }

    #[test]
    fn test_memory_assets_survive_poisoned_lock() {
        let assets = Arc::new(MemoryAssets::new().with_file("a.png", vec![1]));
        let holder = Arc::clone(&assets);
        let result = std::thread::spawn(move || {
            let _guard = holder.files.write();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(assets.files.is_poisoned());

        assets.insert("b.png", vec![2]);
        assert!(assets.open(Path::new("b.png")).is_ok());
        assert!(assets.remove("a.png"));
        assert!(!assets.remove("a.png"));
        assert_eq!(assets.open_count(), 1);
    }

    #[test]
    fn test_decode_image_png() {
        let assets = MemoryAssets::new().with_file("red.png", png_bytes(3, 2, Rgba([255, 0, 0, 255])));
        let img = decode_image(&assets, Path::new("red.png")).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(*img.get_pixel(2, 1), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_decode_image_missing_is_decode_error() {
        let assets = MemoryAssets::new();
        let err = decode_image(&assets, Path::new("missing.png")).unwrap_err();
        assert!(matches!(err, RenderError::Decode { source: image::ImageError::IoError(_), .. }));
    }

    #[test]
    fn test_decode_image_garbage() {
        let assets = MemoryAssets::new().with_file("bad.png", b"not an image".to_vec());
        let err = decode_image(&assets, Path::new("bad.png")).unwrap_err();
        assert!(matches!(err, RenderError::Decode { .. }));
    }

    #[test]
    fn test_fs_assets_root() {
        let temp = tempfile::TempDir::new().expect("should create temp dir");
        std::fs::create_dir_all(temp.path().join("img")).unwrap();
        std::fs::write(temp.path().join("img").join("a.png"), png_bytes(1, 1, Rgba([0, 0, 0, 255])))
            .unwrap();

        let assets = FsAssets::with_root(temp.path());
        let img = decode_image(&assets, Path::new("img/a.png")).unwrap();
        assert_eq!(img.dimensions(), (1, 1));
        assert!(FsAssets::new().open(Path::new("definitely/missing.png")).is_err());
    }
}
