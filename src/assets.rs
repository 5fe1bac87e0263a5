//! Image sources referenced by the preview (`<img src>`).
//!
//! A source is either a `data:` URL (the avatar) or a path on disk (the
//! organization logo). PNG, JPEG, GIF, WebP and BMP decode; anything else
//! settles as a load error and shows as an empty box in the export.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::settle::{Settle, SettleSignal};
use crate::{Error, Result};

/// MIME types [`DecodedImage::decode`] understands.
const DECODABLE_MIME: [&str; 5] = ["image/png", "image/jpeg", "image/gif", "image/webp", "image/bmp"];

/// Whether images of this MIME type can be rasterized.
pub fn can_decode(mime: &str) -> bool {
    DECODABLE_MIME.contains(&mime)
}

/// A decoded RGBA8 bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Decode any supported format; the format is sniffed from the bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| Error::AssetError(format!("cannot decode image: {}", e)))?
            .to_rgba8();
        Ok(Self {
            width: img.width(),
            height: img.height(),
            rgba: img.into_raw(),
        })
    }

    /// Pixel at `(x, y)`; callers stay in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

/// Read the raw bytes behind an `<img src>`.
pub fn read_source(src: &str, base_dir: Option<&Path>) -> Result<Vec<u8>> {
    if let Some(rest) = src.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::AssetError("malformed data URL".into()))?;
        if !meta.ends_with(";base64") {
            return Err(Error::AssetError("only base64 data URLs are supported".into()));
        }
        return STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::AssetError(format!("bad base64 payload: {}", e)));
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(Error::AssetError(format!("remote images are not fetched: {}", src)));
    }
    let path = match base_dir {
        Some(dir) if Path::new(src).is_relative() => dir.join(src),
        _ => PathBuf::from(src),
    };
    std::fs::read(&path).map_err(|e| Error::AssetError(format!("{}: {}", path.display(), e)))
}

/// Resolve and decode one source.
pub fn load_image(src: &str, base_dir: Option<&Path>) -> Result<DecodedImage> {
    let bytes = read_source(src, base_dir)?;
    DecodedImage::decode(&bytes)
}

/// Starts loading an image and hands back a signal that settles on load or
/// error.
pub trait ImageLoader: Send + Sync {
    fn load(&self, src: &str) -> SettleSignal<Arc<DecodedImage>>;
}

/// Loads from data URLs and the filesystem, decoding on the blocking pool
/// when a tokio runtime is available.
#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    base_dir: Option<PathBuf>,
}

impl AssetLoader {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }
}

impl ImageLoader for AssetLoader {
    fn load(&self, src: &str) -> SettleSignal<Arc<DecodedImage>> {
        let (handle, signal) = SettleSignal::channel();
        let src = src.to_string();
        let base_dir = self.base_dir.clone();
        let work = move || match load_image(&src, base_dir.as_deref()) {
            Ok(img) => handle.load(Arc::new(img)),
            Err(e) => {
                log::warn!("image failed to load: {}", e);
                handle.error(e.to_string());
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn_blocking(work);
            }
            Err(_) => work(),
        }
        signal
    }
}

/// Settles every load immediately from a fixed table; unknown sources error.
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    images: std::collections::HashMap<String, Arc<DecodedImage>>,
}

impl StaticLoader {
    pub fn with_image(mut self, src: &str, img: DecodedImage) -> Self {
        self.images.insert(src.to_string(), Arc::new(img));
        self
    }
}

impl ImageLoader for StaticLoader {
    fn load(&self, src: &str) -> SettleSignal<Arc<DecodedImage>> {
        SettleSignal::ready(match self.images.get(src) {
            Some(img) => Settle::Loaded(img.clone()),
            None => Settle::Errored(format!("no such image: {}", src)),
        })
    }
}

/// Encode an RGBA8 buffer as PNG.
pub fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::RenderError(format!("png header: {}", e)))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| Error::RenderError(format!("png data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| Error::RenderError(format!("png finish: {}", e)))?;
    }
    Ok(out)
}
